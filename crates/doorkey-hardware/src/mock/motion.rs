//! Mock occupancy sensor.
//!
//! The sensor reports a level set through its handle. Tests can also queue
//! an exact sequence of readings, consumed one per read before falling back
//! to the level.

use doorkey_core::Occupancy;
use tokio::sync::{mpsc, watch};

use crate::{Result, traits::MotionSensor};

#[derive(Debug)]
pub struct MockMotionSensor {
    level: watch::Receiver<Occupancy>,
    script: mpsc::UnboundedReceiver<Occupancy>,
}

impl MockMotionSensor {
    /// Create a sensor reading `initial` until told otherwise.
    pub fn new(initial: Occupancy) -> (Self, MockMotionHandle) {
        let (level_tx, level_rx) = watch::channel(initial);
        let (script_tx, script_rx) = mpsc::unbounded_channel();
        (
            Self {
                level: level_rx,
                script: script_rx,
            },
            MockMotionHandle {
                level: level_tx,
                script: script_tx,
            },
        )
    }
}

impl MotionSensor for MockMotionSensor {
    async fn read(&mut self) -> Result<Occupancy> {
        if let Ok(reading) = self.script.try_recv() {
            return Ok(reading);
        }
        Ok(*self.level.borrow())
    }
}

#[derive(Debug)]
pub struct MockMotionHandle {
    level: watch::Sender<Occupancy>,
    script: mpsc::UnboundedSender<Occupancy>,
}

impl MockMotionHandle {
    pub fn set(&self, occupancy: Occupancy) {
        self.level.send_replace(occupancy);
    }

    /// Flip the level and return the new one.
    pub fn toggle(&self) -> Occupancy {
        self.level.send_modify(|level| {
            *level = match level {
                Occupancy::Occupied => Occupancy::Vacant,
                Occupancy::Vacant => Occupancy::Occupied,
            }
        });
        *self.level.borrow()
    }

    pub fn level(&self) -> Occupancy {
        *self.level.borrow()
    }

    /// Queue readings returned, in order, by the next reads.
    pub fn script(&self, readings: impl IntoIterator<Item = Occupancy>) {
        for reading in readings {
            let _ = self.script.send(reading);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_level_and_toggle() {
        let (mut sensor, handle) = MockMotionSensor::new(Occupancy::Vacant);
        assert_eq!(sensor.read().await.unwrap(), Occupancy::Vacant);

        assert_eq!(handle.toggle(), Occupancy::Occupied);
        assert_eq!(sensor.read().await.unwrap(), Occupancy::Occupied);

        handle.set(Occupancy::Vacant);
        assert_eq!(handle.level(), Occupancy::Vacant);
        assert_eq!(sensor.read().await.unwrap(), Occupancy::Vacant);
    }

    #[tokio::test]
    async fn test_script_consumed_before_level() {
        let (mut sensor, handle) = MockMotionSensor::new(Occupancy::Vacant);
        handle.script([Occupancy::Occupied, Occupancy::Occupied]);

        assert_eq!(sensor.read().await.unwrap(), Occupancy::Occupied);
        assert_eq!(sensor.read().await.unwrap(), Occupancy::Occupied);
        assert_eq!(sensor.read().await.unwrap(), Occupancy::Vacant);
    }
}
