// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Display window and input event source.
//!
//! [`ScriptedDisplay`] runs without a window: it replays recorded input and
//! can dump the frames it is shown. [`HighGuiDisplay`] (feature
//! `video-opencv`) is the interactive OpenCV window.

use crate::io::serialization::import_document;
use crate::ui::input::Event;
use anyhow::{Context, Result};
use image::RgbImage;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub trait Display {
    fn show(&mut self, frame: &RgbImage) -> Result<()>;

    /// Wait at most `timeout` for the next input event.
    fn poll_event(&mut self, timeout: Duration) -> Result<Option<Event>>;
}

/// Headless display driven by a script of per-frame inputs.
///
/// Each poll consumes one script entry; `None` entries are frames with no
/// input. Once the script runs out every poll returns `None`.
pub struct ScriptedDisplay {
    script: VecDeque<Option<Event>>,
    output_dir: Option<PathBuf>,
    shown: usize,
}

impl ScriptedDisplay {
    pub fn new(script: impl IntoIterator<Item = Option<Event>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            output_dir: None,
            shown: 0,
        }
    }

    /// Load a YAML or JSON script: a list of events or nulls.
    pub fn from_file(path: &Path) -> Result<Self> {
        let script: Vec<Option<Event>> = import_document(path)
            .with_context(|| format!("Failed to read input script {}", path.display()))?;
        log::info!("Loaded {} scripted inputs from {}", script.len(), path.display());
        Ok(Self::new(script))
    }

    /// Write every shown frame as a numbered PNG into `dir`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }
}

impl Display for ScriptedDisplay {
    fn show(&mut self, frame: &RgbImage) -> Result<()> {
        if let Some(ref dir) = self.output_dir {
            let path = dir.join(format!("frame_{:05}.png", self.shown));
            frame
                .save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        self.shown += 1;
        Ok(())
    }

    fn poll_event(&mut self, _timeout: Duration) -> Result<Option<Event>> {
        Ok(self.script.pop_front().flatten())
    }
}

#[cfg(feature = "video-opencv")]
pub use highgui_window::HighGuiDisplay;

#[cfg(feature = "video-opencv")]
mod highgui_window {
    use super::Display;
    use crate::ui::input::Event;
    use anyhow::Result;
    use image::RgbImage;
    use opencv::{
        core::{self, Mat, Scalar},
        highgui,
        prelude::*,
    };
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    type EventQueue = Arc<Mutex<VecDeque<Event>>>;

    /// OpenCV window with mouse callback and `waitKey` polling.
    pub struct HighGuiDisplay {
        window: String,
        events: EventQueue,
    }

    impl HighGuiDisplay {
        pub fn open(window: &str) -> Result<Self> {
            highgui::named_window(window, highgui::WINDOW_AUTOSIZE)?;
            let events: EventQueue = Arc::new(Mutex::new(VecDeque::new()));

            let sink = Arc::clone(&events);
            highgui::set_mouse_callback(
                window,
                Some(Box::new(move |event: i32, x: i32, y: i32, _flags: i32| {
                    let event = match event {
                        highgui::EVENT_LBUTTONDOWN => Event::PointerDown { x, y },
                        highgui::EVENT_MOUSEMOVE => Event::PointerMove { x, y },
                        highgui::EVENT_LBUTTONUP => Event::PointerUp { x, y },
                        _ => return,
                    };
                    if let Ok(mut queue) = sink.lock() {
                        push_coalesced(&mut queue, event);
                    }
                })),
            )?;

            log::info!("Opened window '{}'", window);
            Ok(Self {
                window: window.to_string(),
                events,
            })
        }
    }

    /// Queue an event, folding runs of pointer moves into the latest one.
    fn push_coalesced(queue: &mut VecDeque<Event>, event: Event) {
        let is_move = |e: &Event| matches!(e, Event::PointerMove { .. });
        if is_move(&event) && queue.back().is_some_and(is_move) {
            queue.pop_back();
        }
        queue.push_back(event);
    }

    impl Display for HighGuiDisplay {
        fn show(&mut self, frame: &RgbImage) -> Result<()> {
            let mut mat = Mat::new_rows_cols_with_default(
                frame.height() as i32,
                frame.width() as i32,
                core::CV_8UC3,
                Scalar::all(0.0),
            )?;
            let bgr = mat.data_bytes_mut()?;
            for (dst, src) in bgr.chunks_exact_mut(3).zip(frame.pixels()) {
                dst[0] = src[2];
                dst[1] = src[1];
                dst[2] = src[0];
            }
            highgui::imshow(&self.window, &mat)?;
            Ok(())
        }

        fn poll_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
            let key = highgui::wait_key(timeout.as_millis().max(1) as i32)?;
            let mut queue = self
                .events
                .lock()
                .map_err(|_| anyhow::anyhow!("input queue poisoned"))?;
            if key != -1 {
                queue.push_back(Event::KeyPress { code: key & 0xFF });
            }
            Ok(queue.pop_front())
        }
    }

    impl Drop for HighGuiDisplay {
        fn drop(&mut self) {
            if let Err(e) = highgui::destroy_window(&self.window) {
                log::warn!("Failed to close window: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_replays_then_goes_quiet() {
        let mut display = ScriptedDisplay::new([
            Some(Event::PointerDown { x: 1, y: 2 }),
            None,
            Some(Event::KeyPress { code: 27 }),
        ]);
        let t = Duration::from_millis(30);
        assert_eq!(display.poll_event(t).unwrap(), Some(Event::PointerDown { x: 1, y: 2 }));
        assert_eq!(display.poll_event(t).unwrap(), None);
        assert_eq!(display.poll_event(t).unwrap(), Some(Event::KeyPress { code: 27 }));
        assert_eq!(display.poll_event(t).unwrap(), None);
    }

    #[test]
    fn test_script_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.yaml");
        std::fs::write(
            &path,
            "- type: pointer_down\n  x: 100\n  y: 100\n- ~\n- type: key_press\n  code: 43\n",
        )
        .unwrap();
        let mut display = ScriptedDisplay::from_file(&path).unwrap();
        let t = Duration::ZERO;
        assert_eq!(display.poll_event(t).unwrap(), Some(Event::PointerDown { x: 100, y: 100 }));
        assert_eq!(display.poll_event(t).unwrap(), None);
        assert_eq!(display.poll_event(t).unwrap(), Some(Event::KeyPress { code: 43 }));
    }

    #[test]
    fn test_shown_frames_written() {
        let dir = tempfile::tempdir().unwrap();
        let mut display = ScriptedDisplay::new([]).with_output_dir(dir.path());
        display.show(&RgbImage::new(3, 3)).unwrap();
        display.show(&RgbImage::new(3, 3)).unwrap();
        assert!(dir.path().join("frame_00000.png").exists());
        assert!(dir.path().join("frame_00001.png").exists());
    }
}
