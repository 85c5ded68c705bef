// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Raw key codes to editing commands.
//!
//! Bindings come from configuration; any ASCII code in 32..=126 that is not
//! bound to a command types itself.

use serde::Deserialize;

/// Semantic key command understood by the input state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    EnterEdit,
    DeleteCharacter,
    DeleteBox,
    Confirm,
    WipeAll,
    Exit,
    Printable(char),
}

/// Key code table, one list of codes per command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub enter_edit: Vec<i32>,
    pub delete_character: Vec<i32>,
    pub delete_box: Vec<i32>,
    pub confirm: Vec<i32>,
    pub wipe_all: Vec<i32>,
    pub exit: Vec<i32>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            enter_edit: vec!['+' as i32],
            delete_character: vec![8, 127],
            delete_box: vec!['<' as i32],
            confirm: vec![13, 10],
            wipe_all: vec!['*' as i32],
            exit: vec![27],
        }
    }
}

impl KeyBindings {
    /// Resolve a raw key code. Unbound non-printable codes yield `None`.
    pub fn resolve(&self, code: i32) -> Option<Command> {
        let table = [
            (&self.exit, Command::Exit),
            (&self.enter_edit, Command::EnterEdit),
            (&self.delete_character, Command::DeleteCharacter),
            (&self.delete_box, Command::DeleteBox),
            (&self.confirm, Command::Confirm),
            (&self.wipe_all, Command::WipeAll),
        ];
        if let Some((_, command)) = table.iter().find(|(codes, _)| codes.contains(&code)) {
            return Some(*command);
        }

        match u8::try_from(code) {
            Ok(byte @ 32..=126) => Some(Command::Printable(byte as char)),
            _ => None,
        }
    }

    /// Codes bound to more than one command; the first listed wins.
    pub fn conflicts(&self) -> Vec<i32> {
        let all = [
            &self.exit,
            &self.enter_edit,
            &self.delete_character,
            &self.delete_box,
            &self.confirm,
            &self.wipe_all,
        ];
        let mut seen = Vec::new();
        let mut dupes = Vec::new();
        for code in all.into_iter().flatten() {
            if seen.contains(code) {
                if !dupes.contains(code) {
                    dupes.push(*code);
                }
            } else {
                seen.push(*code);
            }
        }
        dupes
    }
}
