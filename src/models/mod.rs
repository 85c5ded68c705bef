// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: user annotations and detector results.

pub mod annotation;
pub mod detection;
