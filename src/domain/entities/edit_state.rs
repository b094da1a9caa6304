//! Restorable crop/edit state for photo items.

use serde::{Deserialize, Serialize};

/// Quarter-turn rotation applied in the crop editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationDegree {
    /// No rotation.
    #[default]
    Zero,
    /// Rotated 90 degrees counterclockwise.
    CounterClockwise90,
    /// Rotated 180 degrees counterclockwise.
    CounterClockwise180,
    /// Rotated 270 degrees counterclockwise.
    CounterClockwise270,
}

impl RotationDegree {
    /// Returns the rotation in radians (counterclockwise is negative).
    #[must_use]
    pub fn radians(self) -> f64 {
        match self {
            Self::Zero => 0.0,
            Self::CounterClockwise90 => -std::f64::consts::FRAC_PI_2,
            Self::CounterClockwise180 => -std::f64::consts::PI,
            Self::CounterClockwise270 => -std::f64::consts::PI * 1.5,
        }
    }

    /// Advances by one more quarter turn counterclockwise.
    #[must_use]
    pub const fn rotated_counterclockwise(self) -> Self {
        match self {
            Self::Zero => Self::CounterClockwise90,
            Self::CounterClockwise90 => Self::CounterClockwise180,
            Self::CounterClockwise180 => Self::CounterClockwise270,
            Self::CounterClockwise270 => Self::Zero,
        }
    }

    /// Returns true when the rotation swaps the image axes.
    #[must_use]
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::CounterClockwise90 | Self::CounterClockwise270)
    }
}

/// Crop rectangle normalized to the source image (all fields in `0.0..=1.0`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl CropRect {
    /// The whole image.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }

    /// Returns true when no cropping is applied.
    #[must_use]
    pub fn is_full(&self) -> bool {
        *self == Self::full()
    }

    /// Clamps all edges into the unit square.
    #[must_use]
    pub fn clamped(self) -> Self {
        let x = self.x.clamp(0.0, 1.0);
        let y = self.y.clamp(0.0, 1.0);
        Self {
            x,
            y,
            width: self.width.clamp(0.0, 1.0 - x),
            height: self.height.clamp(0.0, 1.0 - y),
        }
    }
}

impl Default for CropRect {
    fn default() -> Self {
        Self::full()
    }
}

/// Everything needed to reopen the crop editor where the user left it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CropRestoreState {
    /// Normalized crop rectangle.
    pub rect: CropRect,
    /// Applied rotation.
    pub rotation: RotationDegree,
}

impl CropRestoreState {
    /// Serializes to JSON for host-side persistence.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Restores from a JSON string produced by [`Self::to_json`].
    ///
    /// # Errors
    /// Returns error if the input is not valid edit-state JSON.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_cycles_back_to_zero() {
        let mut rotation = RotationDegree::Zero;
        for _ in 0..4 {
            rotation = rotation.rotated_counterclockwise();
        }
        assert_eq!(rotation, RotationDegree::Zero);
    }

    #[test]
    fn test_axis_swap() {
        assert!(RotationDegree::CounterClockwise90.swaps_axes());
        assert!(!RotationDegree::CounterClockwise180.swaps_axes());
    }

    #[test]
    fn test_crop_rect_clamped() {
        let rect = CropRect {
            x: 0.5,
            y: -0.2,
            width: 0.9,
            height: 2.0,
        };
        let clamped = rect.clamped();
        assert!((clamped.x - 0.5).abs() < f64::EPSILON);
        assert!((clamped.y).abs() < f64::EPSILON);
        assert!((clamped.width - 0.5).abs() < f64::EPSILON);
        assert!((clamped.height - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_json_round_trip() {
        let state = CropRestoreState {
            rect: CropRect {
                x: 0.1,
                y: 0.2,
                width: 0.5,
                height: 0.4,
            },
            rotation: RotationDegree::CounterClockwise90,
        };
        let json = state.to_json().unwrap();
        assert_eq!(CropRestoreState::from_json(&json).unwrap(), state);
    }
}
