use thiserror::Error;

/// One raw report from the peripheral, before centering and quantization
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawReading {
    pub axis_x: u8,
    pub axis_y: u8,
    pub button_c: bool,
    pub button_z: bool,
}

// Peripheral errors
#[derive(Debug, Error)]
pub enum PeripheralError {
    #[error("Failed to open I2C bus {bus}: {source}")]
    BusUnavailable {
        bus: u8,
        #[source]
        source: rppal::i2c::Error,
    },

    #[error("I2C transfer failed: {0}")]
    Transfer(#[from] rppal::i2c::Error),

    #[error("Short read from peripheral: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    #[error("Peripheral not detected: {0}")]
    NotDetected(String),
}

/// Two-axis joystick with two buttons, polled once per cycle.
///
/// `detect` (re)acquires the device from scratch; `read` is only valid after a
/// successful `detect`.
pub trait Peripheral {
    fn detect(&mut self) -> Result<(), PeripheralError>;

    fn read(&mut self) -> Result<RawReading, PeripheralError>;
}

#[cfg(test)]
pub mod testing {
    //! Scripted peripheral for exercising the sampler and poll loop without hardware

    use super::*;
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    pub struct Counters {
        pub detects: Rc<Cell<usize>>,
        pub reads: Rc<Cell<usize>>,
    }

    /// Fails detection `detect_failures` times, then replays `readings` in order.
    /// Once the script is exhausted every read fails.
    pub struct ScriptedPeripheral {
        detect_failures: usize,
        readings: VecDeque<Result<RawReading, PeripheralError>>,
        counters: Counters,
    }

    impl ScriptedPeripheral {
        pub fn new(detect_failures: usize, readings: Vec<RawReading>) -> (Self, Counters) {
            let counters = Counters::default();
            let peripheral = Self {
                detect_failures,
                readings: readings.into_iter().map(Ok).collect(),
                counters: counters.clone(),
            };
            (peripheral, counters)
        }
    }

    impl Peripheral for ScriptedPeripheral {
        fn detect(&mut self) -> Result<(), PeripheralError> {
            self.counters.detects.set(self.counters.detects.get() + 1);
            if self.detect_failures > 0 {
                self.detect_failures -= 1;
                return Err(PeripheralError::NotDetected("no ack".to_string()));
            }
            Ok(())
        }

        fn read(&mut self) -> Result<RawReading, PeripheralError> {
            self.counters.reads.set(self.counters.reads.get() + 1);
            self.readings.pop_front().unwrap_or_else(|| {
                Err(PeripheralError::NotDetected("unplugged".to_string()))
            })
        }
    }

    pub fn reading(axis_x: u8, axis_y: u8, button_c: bool, button_z: bool) -> RawReading {
        RawReading {
            axis_x,
            axis_y,
            button_c,
            button_z,
        }
    }
}
