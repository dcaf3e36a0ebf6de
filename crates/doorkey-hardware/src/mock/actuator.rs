//! Mock motor and buzzer.
//!
//! Both record every command they receive and remember the last one.

use tracing::debug;

use super::recorder::{self, Recorder, Recording};
use crate::{
    Result,
    traits::{BuzzerDevice, MotorDevice, MotorDirection},
};

#[derive(Debug)]
pub struct MockMotor {
    direction: MotorDirection,
    recorder: Recorder<MotorDirection>,
}

impl MockMotor {
    pub fn new() -> (Self, Recording<MotorDirection>) {
        let (recorder, recording) = recorder::channel();
        let motor = Self {
            direction: MotorDirection::Stop,
            recorder,
        };
        (motor, recording)
    }

    pub fn direction(&self) -> MotorDirection {
        self.direction
    }
}

impl MotorDevice for MockMotor {
    async fn drive(&mut self, direction: MotorDirection) -> Result<()> {
        debug!(%direction, "Motor");
        self.direction = direction;
        self.recorder.record(direction);
        Ok(())
    }
}

#[derive(Debug)]
pub struct MockBuzzer {
    active: bool,
    recorder: Recorder<bool>,
}

impl MockBuzzer {
    pub fn new() -> (Self, Recording<bool>) {
        let (recorder, recording) = recorder::channel();
        (
            Self {
                active: false,
                recorder,
            },
            recording,
        )
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl BuzzerDevice for MockBuzzer {
    async fn set_active(&mut self, active: bool) -> Result<()> {
        debug!(active, "Buzzer");
        self.active = active;
        self.recorder.record(active);
        Ok(())
    }
}
