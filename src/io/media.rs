// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame acquisition.
//!
//! This module provides the frame sources the session loop pulls from:
//! still images or image sequences on disk, and (with the `video-opencv`
//! feature) a live camera.

use crate::error::{AnnotatorError, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

/// Supported still image extensions.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif"];

/// A stream of frames. `Ok(None)` signals end-of-stream.
pub trait FrameSource {
    fn read(&mut self) -> Result<Option<RgbImage>>;
}

/// Serves image files from disk in order.
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    position: usize,
    /// Single decoded frame kept around when one file is replayed.
    cached: Option<RgbImage>,
    remaining: usize,
}

impl ImageSequenceSource {
    /// Open a single image (served `repeat` times) or a directory of images
    /// (each served once, sorted by file name).
    pub fn open(path: &Path, repeat: usize) -> Result<Self> {
        if path.is_dir() {
            let mut paths: Vec<PathBuf> = std::fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| is_image(p))
                .collect();
            paths.sort();
            if paths.is_empty() {
                return Err(AnnotatorError::FrameSourceUnavailable(format!(
                    "no images in {}",
                    path.display()
                )));
            }
            log::info!("Serving {} frames from {}", paths.len(), path.display());
            let remaining = paths.len();
            Ok(Self {
                paths,
                position: 0,
                cached: None,
                remaining,
            })
        } else if path.is_file() {
            let frame = load_frame(path)?;
            log::info!(
                "Serving {} ({}x{}) {} times",
                path.display(),
                frame.width(),
                frame.height(),
                repeat
            );
            Ok(Self {
                paths: vec![path.to_path_buf()],
                position: 0,
                cached: Some(frame),
                remaining: repeat,
            })
        } else {
            Err(AnnotatorError::FrameSourceUnavailable(format!(
                "{} does not exist",
                path.display()
            )))
        }
    }

    /// Build a source that replays an in-memory frame.
    #[cfg(test)]
    pub fn from_frame(frame: RgbImage, repeat: usize) -> Self {
        Self {
            paths: Vec::new(),
            position: 0,
            cached: Some(frame),
            remaining: repeat,
        }
    }
}

impl FrameSource for ImageSequenceSource {
    fn read(&mut self) -> Result<Option<RgbImage>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;

        if let Some(ref frame) = self.cached {
            return Ok(Some(frame.clone()));
        }

        let path = &self.paths[self.position];
        self.position += 1;
        load_frame(path)
            .map(Some)
            .map_err(|e| AnnotatorError::FrameRead(format!("{}: {}", path.display(), e)))
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Load an image file as an RGB frame.
pub fn load_frame(path: &Path) -> Result<RgbImage> {
    let img = image::open(path)?;
    Ok(img.to_rgb8())
}

#[cfg(feature = "video-opencv")]
pub use camera::CameraSource;

#[cfg(feature = "video-opencv")]
mod camera {
    use super::FrameSource;
    use crate::error::{AnnotatorError, Result};
    use image::RgbImage;
    use opencv::{
        core::Mat,
        prelude::*,
        videoio::{self, VideoCapture},
    };

    fn cv_err(e: opencv::Error) -> AnnotatorError {
        AnnotatorError::FrameSourceUnavailable(e.to_string())
    }

    fn read_err(e: opencv::Error) -> AnnotatorError {
        AnnotatorError::FrameRead(e.to_string())
    }

    /// Live camera capture through OpenCV.
    pub struct CameraSource {
        cap: VideoCapture,
    }

    impl CameraSource {
        /// Open a camera by index and request a resolution.
        pub fn open(index: i32, width: u32, height: u32) -> Result<Self> {
            let mut cap = VideoCapture::new(index, videoio::CAP_ANY).map_err(cv_err)?;
            if !cap.is_opened().map_err(cv_err)? {
                return Err(AnnotatorError::FrameSourceUnavailable(format!(
                    "could not open camera with index {index}"
                )));
            }
            cap.set(videoio::CAP_PROP_FRAME_WIDTH, width as f64)
                .map_err(cv_err)?;
            cap.set(videoio::CAP_PROP_FRAME_HEIGHT, height as f64)
                .map_err(cv_err)?;
            log::info!("Opened camera {} at {}x{}", index, width, height);
            Ok(Self { cap })
        }
    }

    impl FrameSource for CameraSource {
        fn read(&mut self) -> Result<Option<RgbImage>> {
            let mut mat = Mat::default();
            if !self.cap.read(&mut mat).map_err(read_err)? || mat.empty() {
                return Ok(None);
            }

            let width = mat.cols() as u32;
            let height = mat.rows() as u32;
            let bgr = mat.data_bytes().map_err(read_err)?;
            let mut rgb = Vec::with_capacity(bgr.len());
            for px in bgr.chunks_exact(3) {
                rgb.extend_from_slice(&[px[2], px[1], px[0]]);
            }
            RgbImage::from_raw(width, height, rgb)
                .map(Some)
                .ok_or_else(|| AnnotatorError::FrameRead("unexpected frame layout".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_in_memory_frame_repeats_then_ends() {
        let mut source = ImageSequenceSource::from_frame(RgbImage::new(4, 4), 2);
        assert!(source.read().unwrap().is_some());
        assert!(source.read().unwrap().is_some());
        assert!(source.read().unwrap().is_none());
        assert!(source.read().unwrap().is_none());
    }

    #[test]
    fn test_directory_sequence_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(2, 2, Rgb([1, 1, 1]))
            .save(dir.path().join("b.png"))
            .unwrap();
        RgbImage::from_pixel(2, 2, Rgb([9, 9, 9]))
            .save(dir.path().join("a.png"))
            .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "skip me").unwrap();

        let mut source = ImageSequenceSource::open(dir.path(), 1).unwrap();
        assert_eq!(source.read().unwrap().unwrap().get_pixel(0, 0), &Rgb([9, 9, 9]));
        assert_eq!(source.read().unwrap().unwrap().get_pixel(0, 0), &Rgb([1, 1, 1]));
        assert!(source.read().unwrap().is_none());
    }

    #[test]
    fn test_missing_path_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageSequenceSource::open(&dir.path().join("nope.png"), 1);
        assert!(matches!(err, Err(AnnotatorError::FrameSourceUnavailable(_))));
    }

    #[test]
    fn test_undecodable_frame_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::new(2, 2).save(dir.path().join("a.png")).unwrap();
        std::fs::write(dir.path().join("b.png"), "not a png").unwrap();

        let mut source = ImageSequenceSource::open(dir.path(), 1).unwrap();
        assert!(source.read().unwrap().is_some());
        assert!(matches!(source.read(), Err(AnnotatorError::FrameRead(_))));
    }
}
