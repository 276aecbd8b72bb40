//! Wii Nunchuk driver over the Raspberry Pi I2C bus
//!
//! Uses the unencrypted initialization sequence (`F0 55`, `FB 00`), after which
//! every report is requested by writing register `00` and reading six bytes:
//!
//! ```text
//! byte 0   joystick X (0-255, ~127 centered)
//! byte 1   joystick Y
//! byte 2-4 accelerometer (unused)
//! byte 5   bit 0 = Z, bit 1 = C (active low), rest accelerometer LSBs
//! ```

use crate::controller::peripheral::{Peripheral, PeripheralError, RawReading};
use rppal::i2c::I2c;
use std::time::Duration;
use tracing::{info, trace};

pub const NUNCHUK_ADDRESS: u16 = 0x52;

const REPORT_LEN: usize = 6;
const INIT_SEQUENCE: [[u8; 2]; 2] = [[0xF0, 0x55], [0xFB, 0x00]];
const INIT_DELAY: Duration = Duration::from_millis(10);
// The controller needs a moment between the register write and the read
const READ_DELAY: Duration = Duration::from_millis(2);

const BUTTON_Z_MASK: u8 = 0x01;
const BUTTON_C_MASK: u8 = 0x02;

pub struct Nunchuk {
    bus: u8,
    address: u16,
    i2c: Option<I2c>,
}

impl Nunchuk {
    pub fn new(bus: u8, address: u16) -> Self {
        Self {
            bus,
            address,
            i2c: None,
        }
    }

    fn decode(report: &[u8; REPORT_LEN]) -> RawReading {
        let reading = RawReading {
            axis_x: report[0],
            axis_y: report[1],
            button_c: report[5] & BUTTON_C_MASK == 0,
            button_z: report[5] & BUTTON_Z_MASK == 0,
        };
        // Once per poll cycle
        trace!("Nunchuk report {:02x?} -> {:?}", report, reading);
        reading
    }
}

impl Peripheral for Nunchuk {
    fn detect(&mut self) -> Result<(), PeripheralError> {
        // Any previous handle belongs to a device that may be gone
        self.i2c = None;

        let mut i2c = I2c::with_bus(self.bus)
            .map_err(|source| PeripheralError::BusUnavailable { bus: self.bus, source })?;
        i2c.set_slave_address(self.address)?;

        for command in INIT_SEQUENCE {
            i2c.write(&command)?;
            std::thread::sleep(INIT_DELAY);
        }

        info!(
            "Nunchuk initialized on bus {} at address {:#04x}",
            self.bus, self.address
        );
        self.i2c = Some(i2c);
        Ok(())
    }

    fn read(&mut self) -> Result<RawReading, PeripheralError> {
        let i2c = self
            .i2c
            .as_mut()
            .ok_or_else(|| PeripheralError::NotDetected("read before detect".to_string()))?;

        i2c.write(&[0x00])?;
        std::thread::sleep(READ_DELAY);

        let mut report = [0u8; REPORT_LEN];
        let actual = i2c.read(&mut report)?;
        if actual != REPORT_LEN {
            return Err(PeripheralError::ShortRead {
                expected: REPORT_LEN,
                actual,
            });
        }

        Ok(Self::decode(&report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_capture::LogCapture;
    use tracing::Level;

    #[test]
    fn decodes_axes_and_released_buttons() {
        let reading = Nunchuk::decode(&[127, 128, 0x80, 0x80, 0x80, 0xFF]);
        assert_eq!(
            reading,
            RawReading {
                axis_x: 127,
                axis_y: 128,
                button_c: false,
                button_z: false,
            }
        );
    }

    #[test]
    fn buttons_are_active_low() {
        assert!(Nunchuk::decode(&[0, 0, 0, 0, 0, 0xFE]).button_z);
        assert!(!Nunchuk::decode(&[0, 0, 0, 0, 0, 0xFE]).button_c);

        let c_only = Nunchuk::decode(&[0, 0, 0, 0, 0, 0xFD]);
        assert!(c_only.button_c && !c_only.button_z);

        let both = Nunchuk::decode(&[0, 0, 0, 0, 0, 0xFC]);
        assert!(both.button_c && both.button_z);
    }

    #[test]
    fn report_is_only_logged_at_trace_level() {
        let report = [127, 128, 0, 0, 0, 0xFF];

        let debug = LogCapture::default();
        debug.run(Level::DEBUG, || Nunchuk::decode(&report));
        assert!(debug.output().is_empty());

        let trace = LogCapture::default();
        trace.run(Level::TRACE, || Nunchuk::decode(&report));
        assert!(trace.output().contains("Nunchuk report"));
    }

    #[test]
    fn read_before_detect_fails() {
        let mut nunchuk = Nunchuk::new(1, NUNCHUK_ADDRESS);
        assert!(matches!(
            nunchuk.read(),
            Err(PeripheralError::NotDetected(_))
        ));
    }
}
