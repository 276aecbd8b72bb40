//! Wii Nunchuk to keyboard bridge.
//!
//! Polls a nunchuk over I2C, quantizes the stick with a dead zone and turns
//! every state change into keyboard press/release actions.
//!
//! ```text
//! controller::Nunchuk ──► controller::InputSampler ──► mapping::EventDriver ──► mapping::KeyEmitter
//! ```

pub mod config;
pub mod controller;
pub mod mapping;

#[cfg(test)]
mod log_capture;
