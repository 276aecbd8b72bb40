//! Key emitters - sinks for the key actions produced by the event driver

use crate::mapping::KeyAction;
use egui::Key;
use tracing::info;

/// Receiver of keyboard press/release calls.
///
/// Calls are fire-and-forget: an emitter handles its own transport failures and
/// never reports them back to the event driver.
pub trait KeyEmitter {
    fn press(&mut self, key: Key);

    fn release(&mut self, key: Key);

    fn emit(&mut self, action: KeyAction) {
        match action {
            KeyAction::Press(key) => self.press(key),
            KeyAction::Release(key) => self.release(key),
        }
    }
}

/// Records every action in order
impl KeyEmitter for Vec<KeyAction> {
    fn press(&mut self, key: Key) {
        self.push(KeyAction::Press(key));
    }

    fn release(&mut self, key: Key) {
        self.push(KeyAction::Release(key));
    }
}

/// Emitter picked at runtime
impl<E: KeyEmitter + ?Sized> KeyEmitter for Box<E> {
    fn press(&mut self, key: Key) {
        (**self).press(key);
    }

    fn release(&mut self, key: Key) {
        (**self).release(key);
    }
}

/// Dry-run emitter that only writes the actions to the log
#[derive(Debug, Default)]
pub struct LogKeyEmitter {
    held: usize,
}

impl KeyEmitter for LogKeyEmitter {
    fn press(&mut self, key: Key) {
        self.held += 1;
        info!("Key pressed: {} ({} held)", key.name(), self.held);
    }

    fn release(&mut self, key: Key) {
        self.held = self.held.saturating_sub(1);
        info!("Key released: {} ({} held)", key.name(), self.held);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_keeps_order() {
        let mut recorder: Vec<KeyAction> = Vec::new();
        recorder.emit(KeyAction::Press(Key::ArrowLeft));
        recorder.emit(KeyAction::Release(Key::ArrowLeft));
        recorder.press(Key::C);

        assert_eq!(
            recorder,
            vec![
                KeyAction::Press(Key::ArrowLeft),
                KeyAction::Release(Key::ArrowLeft),
                KeyAction::Press(Key::C),
            ]
        );
    }

    #[test]
    fn log_emitter_never_underflows() {
        let mut emitter = LogKeyEmitter::default();
        emitter.release(Key::Z);
        assert_eq!(emitter.held, 0);
        emitter.press(Key::Z);
        assert_eq!(emitter.held, 1);
    }

    #[test]
    fn boxed_emitter_forwards_to_inner() {
        let mut boxed_recorder = Box::new(Vec::<KeyAction>::new());
        KeyEmitter::emit(&mut boxed_recorder, KeyAction::Press(Key::C));
        KeyEmitter::emit(&mut boxed_recorder, KeyAction::Release(Key::C));

        assert_eq!(
            *boxed_recorder,
            vec![KeyAction::Press(Key::C), KeyAction::Release(Key::C)]
        );
    }
}
