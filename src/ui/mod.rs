// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Interactive overlay: input handling, key bindings, rendering and display.

pub mod canvas;
pub mod display;
pub mod input;
pub mod keymap;
