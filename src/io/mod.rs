// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: frame sources, detections and annotation files.

pub mod detector;
pub mod media;
pub mod serialization;
