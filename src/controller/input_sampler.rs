use crate::config::Config;
use crate::controller::peripheral::{Peripheral, PeripheralError, RawReading};
use crate::mapping::event_driver::{apply_dead_zone, AxisState};
use statum::{machine, state};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Signed offset of an axis from its center
pub type AxisReading = i16;

// Axis reading together with its quantized state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AxisSample {
    pub reading: AxisReading,
    pub state: AxisState,
}

/// Snapshot of the peripheral taken once per poll cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputFrame {
    pub x: AxisSample,
    pub y: AxisSample,
    pub c_button: bool,
    pub z_button: bool,
}

impl InputFrame {
    pub fn from_raw(raw: &RawReading, settings: &SamplerSettings) -> Self {
        let x = AxisReading::from(raw.axis_x) - AxisReading::from(settings.center);
        let y = AxisReading::from(raw.axis_y) - AxisReading::from(settings.center);

        Self {
            x: AxisSample {
                reading: x,
                state: apply_dead_zone(x, settings.x_dead_zone),
            },
            y: AxisSample {
                reading: y,
                state: apply_dead_zone(y, settings.y_dead_zone),
            },
            c_button: raw.button_c,
            z_button: raw.button_z,
        }
    }
}

// Sampler settings
#[derive(Clone, Debug, PartialEq)]
pub struct SamplerSettings {
    pub center: u8,
    pub x_dead_zone: u8,
    pub y_dead_zone: u8,
    pub detect_retry_interval: Duration,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            center: 127,
            x_dead_zone: 65,
            y_dead_zone: 65,
            detect_retry_interval: Duration::from_secs(1),
        }
    }
}

impl From<&Config> for SamplerSettings {
    fn from(config: &Config) -> Self {
        Self {
            center: config.peripheral.center,
            x_dead_zone: config.x_dead_zone,
            y_dead_zone: config.y_dead_zone,
            detect_retry_interval: config.peripheral.detect_retry_interval,
        }
    }
}

/// A read failure after the peripheral was detected.
///
/// Not retried: cached state is invalid once the device may have been
/// unplugged, so the run ends and the supervisor restarts detection.
#[derive(Debug, thiserror::Error)]
#[error("Failed to sample peripheral: {0}")]
pub struct SampleError(#[from] pub PeripheralError);

#[state]
#[derive(Debug, Clone)]
pub enum SamplerState {
    Detecting,
    Sampling,
}

#[machine]
pub struct InputSampler<S: SamplerState> {
    peripheral: Box<dyn Peripheral>,
    settings: SamplerSettings,
}

impl<S: SamplerState> InputSampler<S> {
    pub fn settings(&self) -> &SamplerSettings {
        &self.settings
    }
}

impl InputSampler<Detecting> {
    pub fn create(peripheral: Box<dyn Peripheral>, settings: SamplerSettings) -> Self {
        debug!("Creating InputSampler with settings: {:?}", settings);
        Self::new(peripheral, settings)
    }

    /// Blocks until the peripheral answers, retrying on a fixed interval with no
    /// limit. A missing device is expected to be plugged in eventually.
    pub async fn wait_for_peripheral(mut self) -> InputSampler<Sampling> {
        let mut attempts: u64 = 0;

        loop {
            attempts += 1;
            match self.peripheral.detect() {
                Ok(()) => {
                    info!("Peripheral found after {} attempt(s)", attempts);
                    return self.transition();
                }
                Err(e) => {
                    // Log the first miss loudly, then keep quiet while waiting
                    if attempts == 1 {
                        warn!("Peripheral unavailable, retrying: {}", e);
                    } else {
                        debug!("Peripheral still unavailable (attempt {}): {}", attempts, e);
                    }
                    tokio::time::sleep(self.settings.detect_retry_interval).await;
                }
            }
        }
    }
}

impl InputSampler<Sampling> {
    pub fn sample(&mut self) -> Result<InputFrame, SampleError> {
        let raw = self.peripheral.read()?;
        Ok(InputFrame::from_raw(&raw, &self.settings))
    }
}
