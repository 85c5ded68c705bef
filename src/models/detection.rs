// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Detector output and class-name lookup.

use serde::Deserialize;

/// A model-produced box with its class and confidence.
///
/// Coordinates are frame pixels `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Detection {
    #[serde(rename = "box")]
    pub bbox: [f32; 4],
    pub confidence: f32,
    pub class_id: i64,
}

/// Table mapping detector class ids to display names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNames {
    names: Vec<String>,
    unknown: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self::new(vec!["person".to_string()], "GRID")
    }
}

impl ClassNames {
    pub fn new(names: Vec<String>, unknown: impl Into<String>) -> Self {
        Self {
            names,
            unknown: unknown.into(),
        }
    }

    /// Name for a class id; ids outside the table map to the placeholder.
    pub fn name(&self, class_id: i64) -> &str {
        match usize::try_from(class_id).ok().and_then(|i| self.names.get(i)) {
            Some(name) => name,
            None => &self.unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name_lookup() {
        let names = ClassNames::new(vec!["person".into(), "car".into()], "other");
        assert_eq!(names.name(0), "person");
        assert_eq!(names.name(1), "car");
        assert_eq!(names.name(2), "other");
        assert_eq!(names.name(-1), "other");
    }

    #[test]
    fn test_default_table() {
        let names = ClassNames::default();
        assert_eq!(names.name(0), "person");
        assert_eq!(names.name(79), "GRID");
    }
}
