// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! LIVEROI - Live Region Of Interest overlay
//!
//! Draw, select, relabel and delete boxes on top of a live video stream that
//! is annotated by an external object detector. Boxes persist between
//! sessions in a JSON file.

mod app;
mod config;
mod error;
mod io;
mod models;
mod ui;
mod util;

use anyhow::{Context, Result};
use app::{Session, SessionEnd};
use clap::Parser;
use config::{Args, Settings};
use io::detector::{Detector, NoDetector, ReplayDetector};
use io::media::{FrameSource, ImageSequenceSource};
use io::serialization::AnnotationStore;
use std::time::Duration;
use ui::canvas::OverlayRenderer;
use ui::display::{Display, ScriptedDisplay};
use ui::input::InputStateMachine;

const WINDOW_TITLE: &str = "LIVEROI Live Feed";

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        log::error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let settings = Settings::load(args.config.as_deref())?;

    let source = open_source(args)?;
    let detector: Box<dyn Detector> = match args.detections {
        Some(ref path) => Box::new(ReplayDetector::from_file(path)?),
        None => Box::new(NoDetector),
    };
    let display = open_display(args)?;

    let store = AnnotationStore::new(&args.boxes_file);
    log::info!("Annotations file: {}", store.path().display());
    let mut session = Session::new(
        store,
        source,
        detector,
        display,
        OverlayRenderer::new(&settings.palette, settings.class_table()),
        InputStateMachine::new(settings.key_bindings.clone(), settings.editor_options()),
        Duration::from_millis(args.poll_ms),
    )
    .context("Failed to start session")?;

    let end = session.run()?;
    let count = session.state().annotations.len();
    match end {
        SessionEnd::Exited => log::info!("Session closed by user with {} boxes", count),
        SessionEnd::StreamEnded => {
            log::info!("Stream ended, {} unsaved boxes discarded", count)
        }
    }
    Ok(())
}

fn open_source(args: &Args) -> Result<Box<dyn FrameSource>> {
    if let Some(ref path) = args.frames {
        let source = ImageSequenceSource::open(path, args.repeat)
            .with_context(|| format!("Failed to open frames at {}", path.display()))?;
        return Ok(Box::new(source));
    }
    open_camera(args)
}

#[cfg(feature = "video-opencv")]
fn open_camera(args: &Args) -> Result<Box<dyn FrameSource>> {
    let (width, height) = args.resolution();
    let camera = io::media::CameraSource::open(args.camera_index, width, height)?;
    Ok(Box::new(camera))
}

#[cfg(not(feature = "video-opencv"))]
fn open_camera(args: &Args) -> Result<Box<dyn FrameSource>> {
    Err(error::AnnotatorError::FrameSourceUnavailable(format!(
        "camera {} requested but built without the video-opencv feature; use --frames",
        args.camera_index
    ))
    .into())
}

fn open_display(args: &Args) -> Result<Box<dyn Display>> {
    if let Some(ref path) = args.script {
        let mut display = ScriptedDisplay::from_file(path)?;
        if let Some(ref dir) = args.output_dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            display = display.with_output_dir(dir);
        }
        return Ok(Box::new(display));
    }
    open_window()
}

#[cfg(feature = "video-opencv")]
fn open_window() -> Result<Box<dyn Display>> {
    Ok(Box::new(ui::display::HighGuiDisplay::open(WINDOW_TITLE)?))
}

#[cfg(not(feature = "video-opencv"))]
fn open_window() -> Result<Box<dyn Display>> {
    anyhow::bail!(
        "no window backend for '{}': built without the video-opencv feature; use --script",
        WINDOW_TITLE
    )
}
