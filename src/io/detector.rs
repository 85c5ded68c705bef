// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Detector seam.
//!
//! Inference itself happens outside this crate; detections are supplied
//! per frame by an implementation of [`Detector`].

use crate::io::serialization::import_document;
use crate::models::detection::Detection;
use anyhow::{Context, Result};
use image::RgbImage;
use std::path::Path;

pub trait Detector {
    fn infer(&mut self, frame: &RgbImage) -> Vec<Detection>;
}

/// Detector that never reports anything.
#[derive(Debug, Default)]
pub struct NoDetector;

impl Detector for NoDetector {
    fn infer(&mut self, _frame: &RgbImage) -> Vec<Detection> {
        Vec::new()
    }
}

/// Replays recorded detections, one list per frame, cycling at the end.
#[derive(Debug, Clone)]
pub struct ReplayDetector {
    frames: Vec<Vec<Detection>>,
    next: usize,
}

impl ReplayDetector {
    pub fn new(frames: Vec<Vec<Detection>>) -> Self {
        Self { frames, next: 0 }
    }

    /// Load a YAML or JSON file holding a list of per-frame detection lists.
    pub fn from_file(path: &Path) -> Result<Self> {
        let frames: Vec<Vec<Detection>> = import_document(path)
            .with_context(|| format!("Failed to read detections from {}", path.display()))?;
        log::info!(
            "Replaying detections for {} frames from {}",
            frames.len(),
            path.display()
        );
        Ok(Self::new(frames))
    }
}

impl Detector for ReplayDetector {
    fn infer(&mut self, _frame: &RgbImage) -> Vec<Detection> {
        if self.frames.is_empty() {
            return Vec::new();
        }
        let detections = self.frames[self.next].clone();
        self.next = (self.next + 1) % self.frames.len();
        detections
    }
}
