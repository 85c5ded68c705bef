// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay rendering.
//!
//! This module composes the displayed frame: detector boxes with their
//! class names, the user's annotations in palette colours, and the
//! rubber-band rectangle of a drag in progress. The inputs are never
//! modified; every call draws onto a copy of the frame.

use crate::models::annotation::Annotation;
use crate::models::detection::{ClassNames, Detection};
use crate::ui::input::InputState;
use crate::util::geometry::pixel_box;
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};

/// Annotation colours, cycled by annotation index.
pub const DEFAULT_PALETTE: [[u8; 3]; 8] = [
    [0, 0, 255],
    [0, 255, 0],
    [255, 0, 0],
    [0, 255, 255],
    [255, 0, 255],
    [255, 255, 0],
    [128, 0, 128],
    [128, 128, 0],
];

const DETECTION_BOX: Rgb<u8> = Rgb([163, 81, 251]);
const DETECTION_TEXT: Rgb<u8> = Rgb([0, 255, 0]);
const RUBBER_BAND: Rgb<u8> = Rgb([255, 255, 255]);

/// Glyph cell size of the bitmap font.
const GLYPH: i32 = 8;

pub struct OverlayRenderer {
    palette: Vec<Rgb<u8>>,
    class_names: ClassNames,
}

impl OverlayRenderer {
    /// An empty palette falls back to [`DEFAULT_PALETTE`].
    pub fn new(palette: &[[u8; 3]], class_names: ClassNames) -> Self {
        let source = if palette.is_empty() {
            &DEFAULT_PALETTE[..]
        } else {
            palette
        };
        Self {
            palette: source.iter().map(|c| Rgb(*c)).collect(),
            class_names,
        }
    }

    /// Colour of the annotation at `index`.
    pub fn color(&self, index: usize) -> Rgb<u8> {
        self.palette[index % self.palette.len()]
    }

    /// Draw everything onto a copy of `frame`.
    pub fn render(
        &self,
        frame: &RgbImage,
        annotations: &[Annotation],
        state: &InputState,
        detections: &[Detection],
    ) -> RgbImage {
        let mut canvas = frame.clone();

        for detection in detections {
            let (x1, y1, x2, y2) = pixel_box(detection.bbox);
            draw_rect(&mut canvas, (x1, y1, x2, y2), DETECTION_BOX, 2);
            let name = self.class_names.name(detection.class_id);
            let text_y = y1.saturating_sub(2 * GLYPH + 2);
            draw_text(&mut canvas, name, x1, text_y, DETECTION_TEXT, 2);
        }

        let selected = state.selection();
        for (index, annotation) in annotations.iter().enumerate() {
            let color = self.color(index);
            let b = annotation.bbox;
            let is_selected = selected == Some(index);
            draw_rect(
                &mut canvas,
                (b.x1, b.y1, b.x2, b.y2),
                color,
                if is_selected { 2 } else { 1 },
            );

            let label = match state.pending_label() {
                Some(pending) if is_selected && state.is_editing() => format!("{pending}_"),
                _ => annotation.label.clone(),
            };
            draw_text(&mut canvas, &label, b.x1, b.y1.saturating_sub(10), color, 1);
        }

        if let InputState::Drawing { start, current } = state {
            draw_rect(
                &mut canvas,
                (start.x, start.y, current.x, current.y),
                RUBBER_BAND,
                1,
            );
        }

        canvas
    }
}

fn put(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn dimensions(img: &RgbImage) -> (i32, i32) {
    let (w, h) = img.dimensions();
    (
        i32::try_from(w).unwrap_or(i32::MAX),
        i32::try_from(h).unwrap_or(i32::MAX),
    )
}

/// Draw a rectangle border growing inwards, clipped to the image.
///
/// Corners are clamped to one border width outside the image, so edges that
/// fall off-frame stay off-frame and the loops never exceed the frame size.
fn draw_rect(img: &mut RgbImage, corners: (i32, i32, i32, i32), color: Rgb<u8>, thickness: i32) {
    let (w, h) = dimensions(img);
    let clamp_x = |v: i32| v.clamp(-thickness, w.saturating_add(thickness));
    let clamp_y = |v: i32| v.clamp(-thickness, h.saturating_add(thickness));
    let (ax, ay, bx, by) = corners;
    let (x0, x1) = (clamp_x(ax.min(bx)), clamp_x(ax.max(bx)));
    let (y0, y1) = (clamp_y(ay.min(by)), clamp_y(ay.max(by)));
    for t in 0..thickness {
        let (xx0, yy0, xx1, yy1) = (x0 + t, y0 + t, x1 - t, y1 - t);
        if xx0 > xx1 || yy0 > yy1 {
            break;
        }
        for x in xx0..=xx1 {
            put(img, x, yy0, color);
            put(img, x, yy1, color);
        }
        for y in yy0..=yy1 {
            put(img, xx0, y, color);
            put(img, xx1, y, color);
        }
    }
}

/// Draw text with the 8x8 bitmap font, top-left at `(x, y)`.
fn draw_text(img: &mut RgbImage, text: &str, x: i32, y: i32, color: Rgb<u8>, scale: i32) {
    let (w, h) = dimensions(img);
    let advance = GLYPH * scale;
    if y >= h || y.saturating_add(advance) <= 0 {
        return;
    }
    let mut cursor_x = x;
    for ch in text.chars() {
        if cursor_x >= w {
            break;
        }
        if cursor_x.saturating_add(advance) <= 0 {
            cursor_x = cursor_x.saturating_add(advance);
            continue;
        }
        let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) else {
            cursor_x += advance;
            continue;
        };
        for (row_idx, row) in glyph.iter().enumerate() {
            for col_idx in 0..GLYPH {
                if (*row >> col_idx) & 1 == 0 {
                    continue;
                }
                let px = cursor_x + col_idx * scale;
                let py = y + row_idx as i32 * scale;
                for sy in 0..scale {
                    for sx in 0..scale {
                        put(img, px + sx, py + sy, color);
                    }
                }
            }
        }
        cursor_x += advance;
    }
}
