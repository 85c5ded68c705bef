// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the user-drawn boxes that are overlaid on the live
//! stream and persisted between sessions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label given to a freshly drawn box.
pub const DEFAULT_LABEL: &str = "Object";

/// An axis-aligned box in frame pixel coordinates.
///
/// Always satisfies `x1 < x2` and `y1 < y2`. On disk it is the array
/// `[x1, y1, x2, y2]`; arrays that break the invariant fail to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

/// Rejected attempt to build a box with zero or negative extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DegenerateBox(pub [i32; 4]);

impl fmt::Display for DegenerateBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x1, y1, x2, y2] = self.0;
        write!(
            f,
            "degenerate box [{x1}, {y1}, {x2}, {y2}]: expected x1 < x2 and y1 < y2"
        )
    }
}

impl std::error::Error for DegenerateBox {}

impl BoundingBox {
    /// Create a box from its corners, rejecting zero-area boxes.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Result<Self, DegenerateBox> {
        if x1 < x2 && y1 < y2 {
            Ok(Self { x1, y1, x2, y2 })
        } else {
            Err(DegenerateBox([x1, y1, x2, y2]))
        }
    }

    /// Strict interior containment; points on the border do not hit.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.x1 < x && x < self.x2 && self.y1 < y && y < self.y2
    }
}

impl TryFrom<[i32; 4]> for BoundingBox {
    type Error = DegenerateBox;

    fn try_from([x1, y1, x2, y2]: [i32; 4]) -> Result<Self, Self::Error> {
        Self::new(x1, y1, x2, y2)
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// A labeled box drawn by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
    pub label: String,
}

impl Annotation {
    /// Create a new annotation with the given box and label.
    pub fn new(bbox: BoundingBox, label: impl Into<String>) -> Self {
        Self {
            bbox,
            label: label.into(),
        }
    }
}

/// All annotations of a session in creation order.
///
/// The order only matters for colour assignment when rendering.
pub type AnnotationSet = Vec<Annotation>;

/// Index of the first annotation whose interior contains the point.
pub fn hit_test(annotations: &[Annotation], x: i32, y: i32) -> Option<usize> {
    annotations.iter().position(|a| a.bbox.contains(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_boxes_rejected() {
        assert!(BoundingBox::new(10, 10, 10, 20).is_err());
        assert!(BoundingBox::new(10, 10, 20, 10).is_err());
        assert!(BoundingBox::new(20, 10, 10, 20).is_err());
        assert!(BoundingBox::new(10, 10, 11, 11).is_ok());
    }

    #[test]
    fn test_contains_is_strict() {
        let b = BoundingBox::new(100, 100, 200, 150).unwrap();
        assert!(b.contains(150, 120));
        assert!(!b.contains(100, 120));
        assert!(!b.contains(200, 120));
        assert!(!b.contains(150, 150));
    }

    #[test]
    fn test_hit_test_first_match_wins() {
        let set = vec![
            Annotation::new(BoundingBox::new(0, 0, 100, 100).unwrap(), "outer"),
            Annotation::new(BoundingBox::new(10, 10, 50, 50).unwrap(), "inner"),
        ];
        assert_eq!(hit_test(&set, 20, 20), Some(0));
        assert_eq!(hit_test(&set, 90, 90), Some(0));
        assert_eq!(hit_test(&set, 150, 150), None);
    }

    #[test]
    fn test_wire_format() {
        let a = Annotation::new(BoundingBox::new(100, 100, 200, 150).unwrap(), "Dog");
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json, serde_json::json!({"box": [100, 100, 200, 150], "label": "Dog"}));
    }

    #[test]
    fn test_deserialize_rejects_inverted_box() {
        let err = serde_json::from_str::<Annotation>(r#"{"box": [5, 5, 1, 9], "label": "x"}"#);
        assert!(err.is_err());
    }
}
