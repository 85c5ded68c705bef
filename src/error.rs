// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error kinds surfaced to the operator.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AnnotatorError {
    #[error("annotation file {} is corrupt", path.display())]
    StorageCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("frame source unavailable: {0}")]
    FrameSourceUnavailable(String),

    #[error("frame read failed: {0}")]
    FrameRead(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, AnnotatorError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_wrapped_errors_print_cause_once() {
        let err = AnnotatorError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        let chain = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(chain.matches("no such file").count(), 1);
    }

    #[test]
    fn test_corrupt_store_keeps_parser_as_source() {
        let source = serde_json::from_str::<u8>("nope").unwrap_err();
        let err = AnnotatorError::StorageCorrupt {
            path: PathBuf::from("boxes.json"),
            source,
        };
        assert_eq!(err.to_string(), "annotation file boxes.json is corrupt");
        assert!(err.source().is_some());
        let chain = format!("{:#}", anyhow::Error::from(err));
        assert!(chain.starts_with("annotation file boxes.json is corrupt: "));
    }
}
