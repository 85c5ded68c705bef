// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Session state and the per-frame loop.
//!
//! One iteration: acquire a frame, run the detector, render the overlay,
//! show it, poll a single input event with a bounded wait and feed it to the
//! input state machine. All state lives in [`SessionState`], owned by the
//! [`Session`] and mutated only between frames.

use crate::error::Result;
use crate::io::detector::Detector;
use crate::io::media::FrameSource;
use crate::io::serialization::AnnotationStore;
use crate::models::annotation::AnnotationSet;
use crate::ui::canvas::OverlayRenderer;
use crate::ui::display::Display;
use crate::ui::input::{Effect, Event, InputStateMachine};
use anyhow::Context;
use image::RgbImage;
use std::time::Duration;

/// Everything a session edits: the annotations and the editor state.
pub struct SessionState {
    pub annotations: AnnotationSet,
    pub input: InputStateMachine,
}

impl SessionState {
    pub fn new(annotations: AnnotationSet, input: InputStateMachine) -> Self {
        Self { annotations, input }
    }

    fn apply(&mut self, event: Event) -> Effect {
        self.input.handle(event, &mut self.annotations)
    }
}

/// How a session finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user pressed exit; annotations were saved.
    Exited,
    /// The frame source ran dry or failed to deliver a frame; nothing was
    /// saved.
    StreamEnded,
}

pub struct Session<F, D, W> {
    source: F,
    detector: D,
    display: W,
    store: AnnotationStore,
    renderer: OverlayRenderer,
    poll: Duration,
    state: SessionState,
}

impl<F: FrameSource, D: Detector, W: Display> Session<F, D, W> {
    /// Load persisted annotations and assemble a session.
    ///
    /// A corrupt annotation file is fatal here.
    pub fn new(
        store: AnnotationStore,
        source: F,
        detector: D,
        display: W,
        renderer: OverlayRenderer,
        input: InputStateMachine,
        poll: Duration,
    ) -> Result<Self> {
        let annotations = store.load()?;
        Ok(Self {
            source,
            detector,
            display,
            store,
            renderer,
            poll,
            state: SessionState::new(annotations, input),
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[cfg(test)]
    pub fn display(&self) -> &W {
        &self.display
    }

    /// Run until the user exits or the stream ends.
    pub fn run(&mut self) -> anyhow::Result<SessionEnd> {
        loop {
            if let Some(end) = self.step()? {
                return Ok(end);
            }
        }
    }

    /// Process a single frame.
    pub fn step(&mut self) -> anyhow::Result<Option<SessionEnd>> {
        let frame = match self.source.read() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                log::info!("Stream ended, leaving without saving");
                return Ok(Some(SessionEnd::StreamEnded));
            }
            Err(e) => {
                log::warn!("Frame read failed, leaving without saving: {}", e);
                return Ok(Some(SessionEnd::StreamEnded));
            }
        };

        let composed = self.compose(&frame);
        self.display.show(&composed)?;

        let Some(event) = self.display.poll_event(self.poll)? else {
            return Ok(None);
        };
        log::trace!("Input event: {:?}", event);

        match self.state.apply(event) {
            Effect::None => Ok(None),
            Effect::Wipe => {
                if let Err(e) = self.store.wipe(&mut self.state.annotations) {
                    log::error!("Failed to wipe annotations: {}", e);
                }
                Ok(None)
            }
            Effect::Exit => {
                self.store
                    .save(&self.state.annotations)
                    .context("Failed to save annotations on exit")?;
                Ok(Some(SessionEnd::Exited))
            }
        }
    }

    fn compose(&mut self, frame: &RgbImage) -> RgbImage {
        let detections = self.detector.infer(frame);
        self.renderer.render(
            frame,
            &self.state.annotations,
            self.state.input.state(),
            &detections,
        )
    }
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn read(&mut self) -> Result<Option<RgbImage>> {
        (**self).read()
    }
}

impl<T: Detector + ?Sized> Detector for Box<T> {
    fn infer(&mut self, frame: &RgbImage) -> Vec<crate::models::detection::Detection> {
        (**self).infer(frame)
    }
}

impl<T: Display + ?Sized> Display for Box<T> {
    fn show(&mut self, frame: &RgbImage) -> anyhow::Result<()> {
        (**self).show(frame)
    }

    fn poll_event(&mut self, timeout: Duration) -> anyhow::Result<Option<Event>> {
        (**self).poll_event(timeout)
    }
}
