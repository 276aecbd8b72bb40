//! Poll loop - the single execution context of the program
//!
//! ```text
//! ┌──► sample ──► step ──► emit ──► sleep ──┐
//! └─────────────────────────────────────────┘
//!        │
//!        └── SampleError ──► return (fatal)
//! ```
//!
//! The sleep at the end of every cycle is the only rate limiting. There is no
//! cancellation; the loop runs until a sample fails or the process is torn down.

use crate::controller::input_sampler::{InputSampler, SampleError, Sampling};
use crate::mapping::{EventDriver, KeyAction, KeyEmitter};
use std::convert::Infallible;
use std::time::Duration;
use tracing::{debug, error, info};

pub struct PollLoop<E: KeyEmitter> {
    sampler: InputSampler<Sampling>,
    driver: EventDriver,
    emitter: E,
    poll_interval: Duration,
    cycles: u64,
}

impl<E: KeyEmitter> PollLoop<E> {
    pub fn new(
        sampler: InputSampler<Sampling>,
        driver: EventDriver,
        emitter: E,
        poll_interval: Duration,
    ) -> Self {
        Self {
            sampler,
            driver,
            emitter,
            poll_interval,
            cycles: 0,
        }
    }

    pub fn emitter(&self) -> &E {
        &self.emitter
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Runs one sample → step → emit cycle without sleeping.
    pub fn run_cycle(&mut self) -> Result<Vec<KeyAction>, SampleError> {
        let frame = self.sampler.sample()?;
        let actions = self.driver.process(frame, &mut self.emitter);
        self.cycles += 1;
        Ok(actions)
    }

    /// Polls until the peripheral fails. Only ever returns an error.
    pub async fn run(&mut self) -> Result<Infallible, SampleError> {
        info!("Starting poll loop with interval {:?}", self.poll_interval);

        loop {
            match self.run_cycle() {
                Ok(actions) => {
                    if !actions.is_empty() {
                        debug!("Cycle {}: {} key action(s)", self.cycles, actions.len());
                    }
                }
                Err(e) => {
                    error!("Sampling failed after {} cycle(s): {}", self.cycles, e);
                    return Err(e);
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::input_sampler::SamplerSettings;
    use crate::controller::peripheral::testing::{reading, Counters, ScriptedPeripheral};
    use crate::controller::peripheral::RawReading;
    use crate::mapping::KeyBindings;
    use egui::Key;

    async fn poll_loop(readings: Vec<RawReading>) -> (PollLoop<Vec<KeyAction>>, Counters) {
        let (peripheral, counters) = ScriptedPeripheral::new(0, readings);
        let sampler = InputSampler::create(Box::new(peripheral), SamplerSettings::default())
            .wait_for_peripheral()
            .await;
        let driver = EventDriver::new(KeyBindings::standard(), false);
        (
            PollLoop::new(sampler, driver, Vec::new(), Duration::ZERO),
            counters,
        )
    }

    #[tokio::test]
    async fn fatal_error_stops_emitting() {
        let (mut poll_loop, counters) = poll_loop(vec![
            reading(200, 127, false, false),
            reading(127, 127, true, false),
            reading(127, 30, true, false),
        ])
        .await;

        let result = poll_loop.run().await;
        assert!(matches!(result, Err(SampleError(_))));
        assert_eq!(poll_loop.cycles(), 3);
        assert_eq!(counters.reads.get(), 4);
        assert_eq!(
            poll_loop.emitter(),
            &vec![
                KeyAction::Press(Key::ArrowRight),
                KeyAction::Release(Key::ArrowRight),
                KeyAction::Press(Key::C),
                KeyAction::Press(Key::ArrowDown),
            ]
        );
    }

    #[tokio::test]
    async fn held_input_emits_once() {
        let held = reading(20, 240, false, true);
        let (mut poll_loop, _) = poll_loop(vec![held; 10]).await;

        assert!(poll_loop.run().await.is_err());
        assert_eq!(poll_loop.cycles(), 10);
        assert_eq!(
            poll_loop.emitter(),
            &vec![
                KeyAction::Press(Key::ArrowLeft),
                KeyAction::Press(Key::ArrowUp),
                KeyAction::Press(Key::Z),
            ]
        );
    }

    #[tokio::test]
    async fn run_cycle_reports_actions() {
        let (mut poll_loop, _) = poll_loop(vec![reading(127, 127, true, false)]).await;

        assert_eq!(poll_loop.run_cycle().unwrap(), vec![KeyAction::Press(Key::C)]);
        assert!(poll_loop.run_cycle().is_err());
        assert_eq!(poll_loop.cycles(), 1);
    }
}
