//! Mapping of nunchuk input frames to keyboard key actions.
//!
//! The [`event_driver`] quantizes analog axes, detects edges against the previous
//! frame and emits press/release actions through a [`KeyEmitter`].
//!
//! # Channels
//!
//! ```text
//! X axis ──► right (positive) / left (negative)
//! Y axis ──► up    (positive) / down (negative)
//! C      ──► c
//! Z      ──► z
//! ```

pub mod event_driver;
pub mod key_emitter;
pub mod virtual_keyboard;

pub use event_driver::{apply_dead_zone, step, AxisState, EventDriver};
pub use key_emitter::{KeyEmitter, LogKeyEmitter};
pub use virtual_keyboard::{KeyboardError, VirtualKeyboard};

use egui::Key;
use std::fmt::{Display, Formatter};

/// A single keyboard action produced by the event driver
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Press(Key),
    Release(Key),
}

impl KeyAction {
    pub fn key(&self) -> Key {
        match self {
            KeyAction::Press(key) | KeyAction::Release(key) => *key,
        }
    }
}

impl Display for KeyAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyAction::Press(key) => write!(f, "press {}", key.name()),
            KeyAction::Release(key) => write!(f, "release {}", key.name()),
        }
    }
}

/// Key assigned to each logical input channel.
///
/// `None` leaves a channel unmapped: its transitions are still tracked, but no
/// key action is ever emitted for it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyBindings {
    pub up: Option<Key>,
    pub down: Option<Key>,
    pub left: Option<Key>,
    pub right: Option<Key>,
    pub c: Option<Key>,
    pub z: Option<Key>,
}

impl KeyBindings {
    /// Arrow keys on the stick, `C` and `Z` on the buttons
    pub fn standard() -> Self {
        Self {
            up: Some(Key::ArrowUp),
            down: Some(Key::ArrowDown),
            left: Some(Key::ArrowLeft),
            right: Some(Key::ArrowRight),
            c: Some(Key::C),
            z: Some(Key::Z),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_exposes_its_key() {
        assert_eq!(KeyAction::Press(Key::A).key(), Key::A);
        assert_eq!(KeyAction::Release(Key::Space).key(), Key::Space);
    }

    #[test]
    fn action_display_uses_key_name() {
        assert_eq!(KeyAction::Press(Key::A).to_string(), "press A");
        assert_eq!(KeyAction::Release(Key::Z).to_string(), "release Z");
    }

    #[test]
    fn default_bindings_are_unmapped() {
        let bindings = KeyBindings::default();
        assert!(bindings.up.is_none() && bindings.c.is_none());
    }
}
