// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Command line arguments and the optional YAML settings file.

use crate::error::AnnotatorError;
use crate::models::annotation::DEFAULT_LABEL;
use crate::models::detection::ClassNames;
use crate::ui::canvas::DEFAULT_PALETTE;
use crate::ui::input::EditorOptions;
use crate::ui::keymap::KeyBindings;
use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Draw and label boxes over a live, detector-annotated video stream.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Index of the camera device (1 is usually the OBS virtual camera).
    #[arg(long, default_value_t = 1)]
    pub camera_index: i32,
    /// Requested camera resolution.
    #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"], default_values_t = [1920, 1080])]
    pub webcam_resolution: Vec<u32>,
    /// Where annotations are loaded from and saved to.
    #[arg(long, default_value = "boxes.json")]
    pub boxes_file: PathBuf,
    /// YAML settings file (labels, key bindings, class names, palette).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Image file or directory to use instead of the camera.
    #[arg(long)]
    pub frames: Option<PathBuf>,
    /// How many times a single image given to --frames is served.
    #[arg(long, default_value_t = 1000)]
    pub repeat: usize,
    /// Recorded detections to overlay (YAML or JSON list of per-frame lists).
    #[arg(long)]
    pub detections: Option<PathBuf>,
    /// Replay input from a YAML or JSON script instead of opening a window.
    #[arg(long)]
    pub script: Option<PathBuf>,
    /// Write every displayed frame as PNG into this directory (scripted runs).
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
    /// Per-frame input wait in milliseconds.
    #[arg(long, default_value_t = 30)]
    pub poll_ms: u64,
}

impl Args {
    pub fn resolution(&self) -> (u32, u32) {
        match self.webcam_resolution.as_slice() {
            [w, h] => (*w, *h),
            _ => (1920, 1080),
        }
    }
}

/// Settings read from the YAML file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub default_label: String,
    pub min_box_size: i32,
    pub carry_over_label: bool,
    pub class_names: Vec<String>,
    pub unknown_class_name: String,
    pub key_bindings: KeyBindings,
    pub palette: Vec<[u8; 3]>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_label: DEFAULT_LABEL.to_string(),
            min_box_size: 5,
            carry_over_label: false,
            class_names: vec!["person".to_string()],
            unknown_class_name: "GRID".to_string(),
            key_bindings: KeyBindings::default(),
            palette: DEFAULT_PALETTE.to_vec(),
        }
    }
}

impl Settings {
    /// Load settings, or defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings {}", path.display()))?;
        let settings: Settings = serde_yaml::from_str(&yaml)
            .with_context(|| format!("Failed to parse settings {}", path.display()))?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    fn validate(&self) -> Result<(), AnnotatorError> {
        if self.min_box_size < 0 {
            return Err(AnnotatorError::Config(format!(
                "min_box_size must not be negative (got {})",
                self.min_box_size
            )));
        }
        if self.palette.is_empty() {
            log::warn!("Empty palette in settings, using the default colours");
        }
        let conflicts = self.key_bindings.conflicts();
        if !conflicts.is_empty() {
            log::warn!("Key codes bound to several commands: {:?}", conflicts);
        }
        Ok(())
    }

    pub fn editor_options(&self) -> EditorOptions {
        EditorOptions {
            default_label: self.default_label.clone(),
            min_box_size: self.min_box_size,
            carry_over_label: self.carry_over_label,
        }
    }

    pub fn class_table(&self) -> ClassNames {
        ClassNames::new(self.class_names.clone(), self.unknown_class_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["liveroi"]);
        assert_eq!(args.camera_index, 1);
        assert_eq!(args.resolution(), (1920, 1080));
        assert_eq!(args.boxes_file, PathBuf::from("boxes.json"));
        assert_eq!(args.poll_ms, 30);
    }

    #[test]
    fn test_args_resolution() {
        let args = Args::parse_from(["liveroi", "--webcam-resolution", "640", "480"]);
        assert_eq!(args.resolution(), (640, 480));
    }

    #[test]
    fn test_missing_settings_file_means_defaults() {
        assert_eq!(Settings::load(None).unwrap(), Settings::default());
    }

    #[test]
    fn test_partial_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(
            &path,
            "default_label: Car\nclass_names: [person, bicycle, car]\nkey_bindings:\n  exit: [113]\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.default_label, "Car");
        assert_eq!(settings.min_box_size, 5);
        assert_eq!(settings.class_table().name(2), "car");
        assert_eq!(settings.class_table().name(3), "GRID");
        assert_eq!(settings.key_bindings.exit, vec![113]);
        assert_eq!(settings.key_bindings.enter_edit, vec!['+' as i32]);
        assert_eq!(settings.editor_options().default_label, "Car");
    }

    #[test]
    fn test_negative_min_box_size_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "min_box_size: -1\n").unwrap();
        assert!(Settings::load(Some(&path)).is_err());
    }
}
