//! Event driver - edge detection from input frames to key actions
//!
//! Each poll cycle the driver compares the new [`InputFrame`] with the one it saw
//! last and translates every changed channel into press/release actions.
//!
//! # Axis state machine
//!
//! ```text
//!            ┌──────────┐
//!      ┌────►│ Neutral  │◄────┐
//!      │     └──────────┘     │
//!      ▼                      ▼
//! ┌──────────┐          ┌──────────┐
//! │ Positive │◄────────►│ Negative │
//! └──────────┘          └──────────┘
//! ```
//!
//! Leaving Positive or Negative releases that direction's key before the new
//! direction's key is pressed, so a direct Positive → Negative flip never holds
//! both keys at once.

use crate::controller::input_sampler::{AxisReading, InputFrame};
use crate::mapping::{KeyAction, KeyBindings, KeyEmitter};
use egui::Key;
use std::fmt::{Display, Formatter};
use tracing::debug;

/// Discrete direction of an analog axis after dead-zone quantization
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AxisState {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Display for AxisState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AxisState::Positive => write!(f, "positive"),
            AxisState::Negative => write!(f, "negative"),
            AxisState::Neutral => write!(f, "neutral"),
        }
    }
}

/// Quantizes an axis reading: Neutral iff `|reading| <= dead_zone`, otherwise the
/// sign of the reading picks the direction.
pub fn apply_dead_zone(reading: AxisReading, dead_zone: u8) -> AxisState {
    if reading.unsigned_abs() <= u16::from(dead_zone) {
        AxisState::Neutral
    } else if reading > 0 {
        AxisState::Positive
    } else {
        AxisState::Negative
    }
}

/// Computes the ordered key actions for the transition `previous` → `current`.
///
/// Axes come first (X, then Y), buttons after (C, then Z). Channels without a
/// bound key produce no actions.
pub fn step(current: &InputFrame, previous: &InputFrame, bindings: &KeyBindings) -> Vec<KeyAction> {
    let mut actions = Vec::new();

    axis_actions(
        previous.x.state,
        current.x.state,
        bindings.right,
        bindings.left,
        &mut actions,
    );
    axis_actions(
        previous.y.state,
        current.y.state,
        bindings.up,
        bindings.down,
        &mut actions,
    );
    button_actions(previous.c_button, current.c_button, bindings.c, &mut actions);
    button_actions(previous.z_button, current.z_button, bindings.z, &mut actions);

    actions
}

fn axis_actions(
    previous: AxisState,
    current: AxisState,
    positive_key: Option<Key>,
    negative_key: Option<Key>,
    actions: &mut Vec<KeyAction>,
) {
    if previous == current {
        return;
    }

    // Release strictly before press
    match previous {
        AxisState::Positive => actions.extend(positive_key.map(KeyAction::Release)),
        AxisState::Negative => actions.extend(negative_key.map(KeyAction::Release)),
        AxisState::Neutral => {}
    }
    match current {
        AxisState::Positive => actions.extend(positive_key.map(KeyAction::Press)),
        AxisState::Negative => actions.extend(negative_key.map(KeyAction::Press)),
        AxisState::Neutral => {}
    }
}

fn button_actions(previous: bool, current: bool, key: Option<Key>, actions: &mut Vec<KeyAction>) {
    if previous == current {
        return;
    }

    let action = if current {
        key.map(KeyAction::Press)
    } else {
        key.map(KeyAction::Release)
    };
    actions.extend(action);
}

/// Owns the previous frame and drives a [`KeyEmitter`] from consecutive frames.
#[derive(Debug)]
pub struct EventDriver {
    // Immutable for the driver's lifetime
    bindings: KeyBindings,

    // Last frame seen, the only state carried between cycles
    previous: InputFrame,

    // Decided once from configuration; no log call is made when false
    trace_transitions: bool,
}

impl EventDriver {
    pub fn new(bindings: KeyBindings, trace_transitions: bool) -> Self {
        debug!(
            "Creating EventDriver with bindings: {:?}, tracing transitions: {}",
            bindings, trace_transitions
        );
        Self {
            bindings,
            previous: InputFrame::default(),
            trace_transitions,
        }
    }

    /// Emits the actions for `frame` and records it as the previous frame.
    ///
    /// The frame is recorded even when every changed channel is unbound, so a
    /// channel's state never lags behind the input.
    pub fn process<E>(&mut self, frame: InputFrame, emitter: &mut E) -> Vec<KeyAction>
    where
        E: KeyEmitter + ?Sized,
    {
        if self.trace_transitions {
            self.log_transitions(&frame);
        }

        let actions = step(&frame, &self.previous, &self.bindings);
        for action in &actions {
            emitter.emit(*action);
        }

        self.previous = frame;
        actions
    }

    fn log_transitions(&self, frame: &InputFrame) {
        let previous = &self.previous;

        if frame.x.state != previous.x.state {
            debug!(
                "Axis x changed: {} -> {} (value: {})",
                previous.x.state, frame.x.state, frame.x.reading
            );
        }
        if frame.y.state != previous.y.state {
            debug!(
                "Axis y changed: {} -> {} (value: {})",
                previous.y.state, frame.y.state, frame.y.reading
            );
        }
        if frame.c_button != previous.c_button {
            debug!(
                "Button C changed, current: {}, prev: {}",
                frame.c_button, previous.c_button
            );
        }
        if frame.z_button != previous.z_button {
            debug!(
                "Button Z changed, current: {}, prev: {}",
                frame.z_button, previous.z_button
            );
        }
    }
}
