use serde::{Deserialize, Serialize};
use std::fmt;

/// An absolute pointer position as reported by the platform hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: i32,
    pub y: i32,
}

impl PointerPosition {
    #[allow(dead_code)]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// True when the displacement from `other` exceeds `threshold` on
    /// either axis.
    pub fn moved_beyond(&self, other: &PointerPosition, threshold: i32) -> bool {
        (self.x - other.x).abs() > threshold || (self.y - other.y).abs() > threshold
    }
}

impl fmt::Display for PointerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moved_beyond_either_axis() {
        let origin = PointerPosition::new(100, 100);

        assert!(PointerPosition::new(111, 100).moved_beyond(&origin, 10));
        assert!(PointerPosition::new(100, 89).moved_beyond(&origin, 10));
        assert!(PointerPosition::new(111, 111).moved_beyond(&origin, 10));
    }

    #[test]
    fn test_threshold_is_strict() {
        let origin = PointerPosition::new(0, 0);

        assert!(!PointerPosition::new(10, 10).moved_beyond(&origin, 10));
        assert!(PointerPosition::new(11, 0).moved_beyond(&origin, 10));
    }
}
