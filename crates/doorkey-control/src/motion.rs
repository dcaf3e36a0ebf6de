//! Occupancy gate holding the door open.
//!
//! Every call is one independent sensor sample: no debouncing, no history.

use doorkey_core::Occupancy;
use doorkey_hardware::{MotionSensor, Result};
use tracing::trace;

#[derive(Debug)]
pub struct MotionGate<S> {
    sensor: S,
    samples: u64,
}

impl<S: MotionSensor> MotionGate<S> {
    pub fn new(sensor: S) -> Self {
        Self { sensor, samples: 0 }
    }

    pub async fn sample(&mut self) -> Result<Occupancy> {
        let occupancy = self.sensor.read().await?;
        self.samples += 1;
        trace!(?occupancy, samples = self.samples, "Motion sample");
        Ok(occupancy)
    }

    /// Number of samples taken since start-up.
    pub fn samples(&self) -> u64 {
        self.samples
    }
}
