// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pointer and keyboard interpretation.
//!
//! The editor is an explicit state machine over four states. Every event is
//! accepted in every state; combinations with no meaning are no-ops. The
//! machine mutates the annotation set directly and reports the two effects
//! that need the store (wipe and exit) back to the session loop.

use crate::models::annotation::{hit_test, Annotation, AnnotationSet, DEFAULT_LABEL};
use crate::ui::keymap::{Command, KeyBindings};
use crate::util::geometry::{box_from_drag, Point};
use serde::Deserialize;

/// Input event delivered by the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    PointerDown { x: i32, y: i32 },
    PointerMove { x: i32, y: i32 },
    PointerUp { x: i32, y: i32 },
    KeyPress { code: i32 },
}

/// Current editor state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputState {
    #[default]
    Idle,
    /// Dragging out a new box; `current` follows the pointer.
    Drawing { start: Point, current: Point },
    /// An annotation is selected; `pending` is the label edit buffer.
    Selected { index: usize, pending: String },
    /// Keystrokes go into `pending` and through to the label.
    Editing { index: usize, pending: String },
}

impl InputState {
    pub fn selection(&self) -> Option<usize> {
        match self {
            InputState::Selected { index, .. } | InputState::Editing { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, InputState::Editing { .. })
    }

    pub fn pending_label(&self) -> Option<&str> {
        match self {
            InputState::Selected { pending, .. } | InputState::Editing { pending, .. } => {
                Some(pending)
            }
            _ => None,
        }
    }
}

/// Work the session loop must do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Clear every annotation and delete the persisted file.
    Wipe,
    /// Save and end the session.
    Exit,
}

/// Tunables for box creation and labelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOptions {
    pub default_label: String,
    /// Drags must exceed this many pixels on both axes.
    pub min_box_size: i32,
    /// Label new boxes with the last edit buffer instead of `default_label`.
    pub carry_over_label: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            default_label: DEFAULT_LABEL.to_string(),
            min_box_size: 5,
            carry_over_label: false,
        }
    }
}

pub struct InputStateMachine {
    state: InputState,
    keys: KeyBindings,
    options: EditorOptions,
    /// Most recent edit buffer contents, used when `carry_over_label` is set.
    last_label: Option<String>,
}

impl InputStateMachine {
    pub fn new(keys: KeyBindings, options: EditorOptions) -> Self {
        Self {
            state: InputState::Idle,
            keys,
            options,
            last_label: None,
        }
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    /// Apply one event to the annotation set.
    pub fn handle(&mut self, event: Event, annotations: &mut AnnotationSet) -> Effect {
        match event {
            Event::PointerDown { x, y } => {
                self.pointer_down(Point::new(x, y), annotations);
                Effect::None
            }
            Event::PointerMove { x, y } => {
                if let InputState::Drawing { current, .. } = &mut self.state {
                    *current = Point::new(x, y);
                }
                Effect::None
            }
            Event::PointerUp { x, y } => {
                self.pointer_up(Point::new(x, y), annotations);
                Effect::None
            }
            Event::KeyPress { code } => match self.keys.resolve(code) {
                Some(command) => self.command(command, annotations),
                None => Effect::None,
            },
        }
    }

    fn pointer_down(&mut self, point: Point, annotations: &AnnotationSet) {
        match hit_test(annotations, point.x, point.y) {
            Some(index) => {
                let pending = annotations[index].label.clone();
                log::debug!("Box {} selected with label '{}'", index, pending);
                self.last_label = Some(pending.clone());
                self.state = InputState::Selected { index, pending };
            }
            None => {
                log::debug!("Drawing from ({}, {})", point.x, point.y);
                self.state = InputState::Drawing {
                    start: point,
                    current: point,
                };
            }
        }
    }

    fn pointer_up(&mut self, end: Point, annotations: &mut AnnotationSet) {
        let InputState::Drawing { start, .. } = self.state else {
            return;
        };
        self.state = InputState::Idle;

        match box_from_drag(start, end, self.options.min_box_size) {
            Some(bbox) => {
                let label = self.new_box_label();
                annotations.push(Annotation::new(bbox, label));
                log::info!("New box added: {:?}", annotations[annotations.len() - 1]);
            }
            None => log::debug!("Ignored tiny box creation"),
        }
    }

    fn new_box_label(&self) -> String {
        match (&self.last_label, self.options.carry_over_label) {
            (Some(label), true) => label.clone(),
            _ => self.options.default_label.clone(),
        }
    }

    fn command(&mut self, command: Command, annotations: &mut AnnotationSet) -> Effect {
        match command {
            Command::Exit => return Effect::Exit,
            Command::WipeAll => {
                self.state = InputState::Idle;
                return Effect::Wipe;
            }
            _ => {}
        }

        self.state = match (std::mem::take(&mut self.state), command) {
            (InputState::Selected { index, pending }, Command::EnterEdit) => {
                log::debug!("Editing enabled for box {}", index);
                InputState::Editing { index, pending }
            }
            (InputState::Editing { index, mut pending }, Command::DeleteCharacter) => {
                pending.pop();
                self.last_label = Some(pending.clone());
                InputState::Editing { index, pending }
            }
            (InputState::Editing { index, mut pending }, Command::Printable(c)) => {
                pending.push(c);
                if let Some(annotation) = annotations.get_mut(index) {
                    annotation.label.clone_from(&pending);
                }
                self.last_label = Some(pending.clone());
                InputState::Editing { index, pending }
            }
            (
                InputState::Selected { index, .. } | InputState::Editing { index, .. },
                Command::DeleteBox,
            ) => {
                if index < annotations.len() {
                    let removed = annotations.remove(index);
                    log::info!("Deleted box {} with label '{}'", index, removed.label);
                }
                InputState::Idle
            }
            (
                InputState::Selected { index, pending } | InputState::Editing { index, pending },
                Command::Confirm,
            ) => {
                if let Some(annotation) = annotations.get_mut(index) {
                    log::info!("Box {} labelled '{}'", index, pending);
                    annotation.label = pending;
                }
                InputState::Idle
            }
            (state, _) => state,
        };
        Effect::None
    }
}
