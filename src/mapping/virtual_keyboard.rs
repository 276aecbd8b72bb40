//! Virtual keyboard on the host through uinput
//!
//! Registers exactly the keys that are bound, then writes one `EV_KEY` event
//! followed by `SYN_REPORT` for every press or release.

use crate::mapping::{KeyBindings, KeyEmitter};
use egui::Key;
use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AttributeSet, EventType, InputEvent, KeyCode, SynchronizationCode,
};
use thiserror::Error;
use tracing::{debug, info, warn};

const DEVICE_NAME: &str = "Nunchuk Keyboard";

#[derive(Debug, Error)]
pub enum KeyboardError {
    #[error("Key {0:?} has no Linux key code")]
    UnmappedKey(Key),

    #[error("Failed to create virtual keyboard: {0}")]
    Device(#[from] std::io::Error),
}

/// Linux key code for an egui key, if there is one
pub fn key_code(key: Key) -> Option<KeyCode> {
    let code = match key {
        Key::ArrowUp => KeyCode::KEY_UP,
        Key::ArrowDown => KeyCode::KEY_DOWN,
        Key::ArrowLeft => KeyCode::KEY_LEFT,
        Key::ArrowRight => KeyCode::KEY_RIGHT,
        Key::Escape => KeyCode::KEY_ESC,
        Key::Tab => KeyCode::KEY_TAB,
        Key::Backspace => KeyCode::KEY_BACKSPACE,
        Key::Enter => KeyCode::KEY_ENTER,
        Key::Space => KeyCode::KEY_SPACE,
        Key::Insert => KeyCode::KEY_INSERT,
        Key::Delete => KeyCode::KEY_DELETE,
        Key::Home => KeyCode::KEY_HOME,
        Key::End => KeyCode::KEY_END,
        Key::PageUp => KeyCode::KEY_PAGEUP,
        Key::PageDown => KeyCode::KEY_PAGEDOWN,

        Key::Comma => KeyCode::KEY_COMMA,
        Key::Backslash => KeyCode::KEY_BACKSLASH,
        Key::Slash => KeyCode::KEY_SLASH,
        Key::OpenBracket => KeyCode::KEY_LEFTBRACE,
        Key::CloseBracket => KeyCode::KEY_RIGHTBRACE,
        Key::Backtick => KeyCode::KEY_GRAVE,
        Key::Minus => KeyCode::KEY_MINUS,
        Key::Period => KeyCode::KEY_DOT,
        Key::Equals => KeyCode::KEY_EQUAL,
        Key::Semicolon => KeyCode::KEY_SEMICOLON,

        Key::Num0 => KeyCode::KEY_0,
        Key::Num1 => KeyCode::KEY_1,
        Key::Num2 => KeyCode::KEY_2,
        Key::Num3 => KeyCode::KEY_3,
        Key::Num4 => KeyCode::KEY_4,
        Key::Num5 => KeyCode::KEY_5,
        Key::Num6 => KeyCode::KEY_6,
        Key::Num7 => KeyCode::KEY_7,
        Key::Num8 => KeyCode::KEY_8,
        Key::Num9 => KeyCode::KEY_9,

        Key::A => KeyCode::KEY_A,
        Key::B => KeyCode::KEY_B,
        Key::C => KeyCode::KEY_C,
        Key::D => KeyCode::KEY_D,
        Key::E => KeyCode::KEY_E,
        Key::F => KeyCode::KEY_F,
        Key::G => KeyCode::KEY_G,
        Key::H => KeyCode::KEY_H,
        Key::I => KeyCode::KEY_I,
        Key::J => KeyCode::KEY_J,
        Key::K => KeyCode::KEY_K,
        Key::L => KeyCode::KEY_L,
        Key::M => KeyCode::KEY_M,
        Key::N => KeyCode::KEY_N,
        Key::O => KeyCode::KEY_O,
        Key::P => KeyCode::KEY_P,
        Key::Q => KeyCode::KEY_Q,
        Key::R => KeyCode::KEY_R,
        Key::S => KeyCode::KEY_S,
        Key::T => KeyCode::KEY_T,
        Key::U => KeyCode::KEY_U,
        Key::V => KeyCode::KEY_V,
        Key::W => KeyCode::KEY_W,
        Key::X => KeyCode::KEY_X,
        Key::Y => KeyCode::KEY_Y,
        Key::Z => KeyCode::KEY_Z,

        Key::F1 => KeyCode::KEY_F1,
        Key::F2 => KeyCode::KEY_F2,
        Key::F3 => KeyCode::KEY_F3,
        Key::F4 => KeyCode::KEY_F4,
        Key::F5 => KeyCode::KEY_F5,
        Key::F6 => KeyCode::KEY_F6,
        Key::F7 => KeyCode::KEY_F7,
        Key::F8 => KeyCode::KEY_F8,
        Key::F9 => KeyCode::KEY_F9,
        Key::F10 => KeyCode::KEY_F10,
        Key::F11 => KeyCode::KEY_F11,
        Key::F12 => KeyCode::KEY_F12,
        Key::F13 => KeyCode::KEY_F13,
        Key::F14 => KeyCode::KEY_F14,
        Key::F15 => KeyCode::KEY_F15,
        Key::F16 => KeyCode::KEY_F16,
        Key::F17 => KeyCode::KEY_F17,
        Key::F18 => KeyCode::KEY_F18,
        Key::F19 => KeyCode::KEY_F19,
        Key::F20 => KeyCode::KEY_F20,
        Key::F21 => KeyCode::KEY_F21,
        Key::F22 => KeyCode::KEY_F22,
        Key::F23 => KeyCode::KEY_F23,
        Key::F24 => KeyCode::KEY_F24,
        _ => return None,
    };
    Some(code)
}

/// Key codes for every bound channel. Fails on the first key with no code,
/// so a bad binding is caught at startup instead of on first press.
pub fn bound_key_codes(bindings: &KeyBindings) -> Result<AttributeSet<KeyCode>, KeyboardError> {
    let mut keys = AttributeSet::<KeyCode>::new();
    let bound = [
        bindings.up,
        bindings.down,
        bindings.left,
        bindings.right,
        bindings.c,
        bindings.z,
    ];
    for key in bound.into_iter().flatten() {
        keys.insert(key_code(key).ok_or(KeyboardError::UnmappedKey(key))?);
    }
    Ok(keys)
}

fn key_events(code: KeyCode, pressed: bool) -> [InputEvent; 2] {
    [
        InputEvent::new(EventType::KEY.0, code.0, i32::from(pressed)),
        InputEvent::new(
            EventType::SYNCHRONIZATION.0,
            SynchronizationCode::SYN_REPORT.0,
            0,
        ),
    ]
}

/// uinput keyboard that types the bound keys on the host
pub struct VirtualKeyboard {
    device: VirtualDevice,
}

impl VirtualKeyboard {
    pub fn create(bindings: &KeyBindings) -> Result<Self, KeyboardError> {
        let keys = bound_key_codes(bindings)?;
        debug!("Registering {} key(s) on virtual keyboard", keys.iter().count());

        let device = VirtualDeviceBuilder::new()?
            .name(DEVICE_NAME)
            .with_keys(&keys)?
            .build()?;

        info!("Created virtual keyboard \"{}\"", DEVICE_NAME);
        Ok(Self { device })
    }

    fn send(&mut self, key: Key, pressed: bool) {
        let Some(code) = key_code(key) else {
            warn!("Dropping key event for {}: no key code", key.name());
            return;
        };
        if let Err(e) = self.device.emit(&key_events(code, pressed)) {
            warn!("Failed to write key event for {}: {}", key.name(), e);
        }
    }
}

impl KeyEmitter for VirtualKeyboard {
    fn press(&mut self, key: Key) {
        self.send(key, true);
    }

    fn release(&mut self, key: Key) {
        self.send(key, false);
    }
}
