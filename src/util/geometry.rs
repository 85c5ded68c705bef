// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module turns pointer drags into boxes and converts detector
//! coordinates into pixel boxes.

use crate::models::annotation::BoundingBox;

/// A pointer position in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Box spanned by a drag, or `None` unless it exceeds `min_size` on both axes.
///
/// The drag may go in any direction; corners are reordered.
pub fn box_from_drag(start: Point, end: Point, min_size: i32) -> Option<BoundingBox> {
    let min_size = u32::try_from(min_size).unwrap_or(0);
    if start.x.abs_diff(end.x) <= min_size || start.y.abs_diff(end.y) <= min_size {
        return None;
    }
    BoundingBox::new(
        start.x.min(end.x),
        start.y.min(end.y),
        start.x.max(end.x),
        start.y.max(end.y),
    )
    .ok()
}

/// Round detector coordinates to integer pixels, corners reordered.
pub fn pixel_box(bbox: [f32; 4]) -> (i32, i32, i32, i32) {
    let [x1, y1, x2, y2] = bbox.map(|v| v.round() as i32);
    (x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_creates_box() {
        let b = box_from_drag(Point::new(100, 100), Point::new(200, 150), 5).unwrap();
        assert_eq!(<[i32; 4]>::from(b), [100, 100, 200, 150]);
    }

    #[test]
    fn test_reverse_drag_is_normalized() {
        let b = box_from_drag(Point::new(200, 150), Point::new(100, 100), 5).unwrap();
        assert_eq!(<[i32; 4]>::from(b), [100, 100, 200, 150]);
    }

    #[test]
    fn test_tiny_drags_discarded() {
        let start = Point::new(50, 50);
        for (dx, dy) in [(0, 0), (5, 100), (100, 5), (-5, 40), (40, -5), (3, 3)] {
            assert!(box_from_drag(start, Point::new(50 + dx, 50 + dy), 5).is_none());
        }
        assert!(box_from_drag(start, Point::new(56, 56), 5).is_some());
    }

    #[test]
    fn test_pixel_box_rounds() {
        assert_eq!(pixel_box([10.4, 20.6, 5.0, 30.0]), (5, 21, 10, 30));
    }

    #[test]
    fn test_drag_across_whole_coordinate_range() {
        let b = box_from_drag(Point::new(i32::MAX, i32::MAX), Point::new(i32::MIN, i32::MIN), 5)
            .unwrap();
        assert_eq!((b.x1, b.y1, b.x2, b.y2), (i32::MIN, i32::MIN, i32::MAX, i32::MAX));
        assert!(box_from_drag(Point::new(i32::MIN, 0), Point::new(i32::MIN + 3, i32::MAX), 5).is_none());
    }
}
