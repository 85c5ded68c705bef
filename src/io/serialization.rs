// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation persistence and auxiliary document loading.
//!
//! The annotation set lives in a single JSON array of
//! `{"box": [x1, y1, x2, y2], "label": "..."}` records. Detection replay
//! files and input scripts may be YAML or JSON, picked by extension.

use crate::error::{AnnotatorError, Result};
use crate::models::annotation::AnnotationSet;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File-backed storage for the annotation set.
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    path: PathBuf,
}

impl AnnotationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted set. A missing file is an empty set.
    pub fn load(&self) -> Result<AnnotationSet> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No annotation file at {}, starting empty", self.path.display());
                return Ok(AnnotationSet::new());
            }
            Err(e) => return Err(e.into()),
        };

        let annotations: AnnotationSet =
            serde_json::from_str(&json).map_err(|source| AnnotatorError::StorageCorrupt {
                path: self.path.clone(),
                source,
            })?;
        log::info!(
            "Loaded {} boxes from {}",
            annotations.len(),
            self.path.display()
        );
        Ok(annotations)
    }

    /// Overwrite the persisted state with the full set.
    pub fn save(&self, annotations: &AnnotationSet) -> Result<()> {
        let json = serde_json::to_string_pretty(annotations)
            .map_err(|e| AnnotatorError::Io(e.into()))?;
        std::fs::write(&self.path, json)?;
        log::info!(
            "Saved {} boxes to {}",
            annotations.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Clear the in-memory set and delete the file. Wiping twice is fine.
    pub fn wipe(&self, annotations: &mut AnnotationSet) -> Result<()> {
        annotations.clear();
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        log::info!("All boxes wiped and {} deleted", self.path.display());
        Ok(())
    }
}

/// Read a YAML or JSON document, choosing the parser from the extension.
pub fn import_document<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let extension = path.extension().and_then(|s| s.to_str());
    let text = std::fs::read_to_string(path)?;
    let data = match extension {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&text)?,
        Some("json") => serde_json::from_str(&text)?,
        _ => anyhow::bail!("Unsupported file extension: {:?}", extension),
    };
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::{Annotation, BoundingBox};

    fn sample() -> AnnotationSet {
        vec![
            Annotation::new(BoundingBox::new(100, 100, 200, 150).unwrap(), "Dog"),
            Annotation::new(BoundingBox::new(5, 6, 70, 80).unwrap(), "Object"),
            Annotation::new(BoundingBox::new(300, 10, 310, 400).unwrap(), ""),
        ]
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = AnnotationStore::new(dir.path().join("boxes.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_load_roundtrip_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = AnnotationStore::new(dir.path().join("boxes.json"));
        let boxes = sample();
        store.save(&boxes).unwrap();
        assert_eq!(store.load().unwrap(), boxes);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = AnnotationStore::new(dir.path().join("boxes.json"));
        store.save(&sample()).unwrap();
        let shorter = vec![sample().remove(1)];
        store.save(&shorter).unwrap();
        assert_eq!(store.load().unwrap(), shorter);
    }

    #[test]
    fn test_malformed_file_is_storage_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boxes.json");
        std::fs::write(&path, "[{\"box\": [1, 2, 3]").unwrap();
        let err = AnnotationStore::new(&path).load().unwrap_err();
        assert!(matches!(err, AnnotatorError::StorageCorrupt { .. }));
    }

    #[test]
    fn test_degenerate_persisted_box_is_storage_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boxes.json");
        std::fs::write(&path, r#"[{"box": [10, 10, 10, 20], "label": "flat"}]"#).unwrap();
        let err = AnnotationStore::new(&path).load().unwrap_err();
        assert!(matches!(err, AnnotatorError::StorageCorrupt { .. }));
    }

    #[test]
    fn test_wipe_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = AnnotationStore::new(dir.path().join("boxes.json"));
        let mut boxes = sample();
        store.save(&boxes).unwrap();

        store.wipe(&mut boxes).unwrap();
        assert!(boxes.is_empty());
        assert!(!store.path().exists());

        store.wipe(&mut boxes).unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_import_document_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("list.yaml");
        std::fs::write(&yaml, "- 1\n- 2\n").unwrap();
        let json = dir.path().join("list.json");
        std::fs::write(&json, "[3, 4]").unwrap();
        let txt = dir.path().join("list.txt");
        std::fs::write(&txt, "[5]").unwrap();

        assert_eq!(import_document::<Vec<i32>>(&yaml).unwrap(), vec![1, 2]);
        assert_eq!(import_document::<Vec<i32>>(&json).unwrap(), vec![3, 4]);
        assert!(import_document::<Vec<i32>>(&txt).is_err());
    }
}
