//! Controller subsystem for nunchuk input handling
//!
//! 1. [`peripheral`] - Raw device interface and errors
//! 2. [`nunchuk`] - I2C driver for the Wii Nunchuk
//! 3. [`input_sampler`] - Detection and per-cycle sampling into [`InputFrame`]s
//! 4. [`poll_loop`] - The sample → step → emit → sleep cycle
//!
//! # Architecture
//!
//! ```text
//! Nunchuk ──► InputSampler ──► EventDriver ──► KeyEmitter
//!  (I2C)      (InputFrame)     (KeyAction)
//! ```
//!
//! Everything runs in one execution context at a fixed poll interval
//! (~60 cycles per second by default).

pub mod input_sampler;
pub mod nunchuk;
pub mod peripheral;
pub mod poll_loop;

pub use input_sampler::{
    AxisReading, AxisSample, InputFrame, InputSampler, SampleError, SamplerSettings,
};
pub use nunchuk::{Nunchuk, NUNCHUK_ADDRESS};
pub use peripheral::{Peripheral, PeripheralError, RawReading};
pub use poll_loop::PollLoop;
