//! Timed phase sequencer for the door and the alarm.
//!
//! The control node has a single one-shot timer. The sequencer decides what
//! that timer currently means:
//!
//! ```text
//! Idle ──start_opening──▶ Opening ──expiry──▶ Idle   (DoorOpened)
//! Idle ──start_closing──▶ Closing ──expiry──▶ Idle   (DoorClosed)
//! Idle ──start_alarm────▶ Alarm{0} ──expiry──▶ Alarm{1} ... ──Nth expiry──▶ Idle (AlarmSilenced)
//! ```
//!
//! Every alarm expiry before the last re-arms the timer for one more
//! period, so the alarm is active for exactly N periods and the sequencer
//! is `Idle` right after the Nth one. A phase can only be started from
//! `Idle`, which keeps the door and alarm sequences from overlapping.

use std::fmt;
use std::time::Duration;

use doorkey_core::{AlarmState, DeviceConfig, Error, Result};
use doorkey_hardware::OneShotTimer;
use tracing::{debug, info};

/// What the timer is currently timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Opening,
    Closing,
    /// Alarm active, `ticks` periods elapsed so far.
    Alarm { ticks: u32 },
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::Opening => write!(f, "Opening"),
            Phase::Closing => write!(f, "Closing"),
            Phase::Alarm { ticks } => write!(f, "Alarm({ticks})"),
        }
    }
}

/// Result of servicing one timer expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Opening phase complete: stop the motor, the door is open.
    DoorOpened,
    /// Closing phase complete: stop the motor, the door is closed.
    DoorClosed,
    /// One alarm period elapsed, the alarm stays on.
    AlarmTick { tick: u32 },
    /// Last alarm period elapsed: silence the alarm.
    AlarmSilenced { ticks: u32 },
}

#[derive(Debug)]
pub struct PhaseSequencer {
    phase: Phase,
    timer: OneShotTimer,
    door_phase: Duration,
    alarm_tick: Duration,
    alarm_ticks: u32,
}

impl PhaseSequencer {
    /// An alarm always lasts at least one period: `alarm_ticks` of 0 is
    /// raised to 1.
    pub fn new(door_phase: Duration, alarm_tick: Duration, alarm_ticks: u32) -> Self {
        Self {
            phase: Phase::Idle,
            timer: OneShotTimer::new(),
            door_phase,
            alarm_tick,
            alarm_ticks: alarm_ticks.max(1),
        }
    }

    pub fn from_config(config: &DeviceConfig) -> Self {
        Self::new(
            config.timing.door_phase(),
            config.timing.alarm_tick(),
            config.timing.alarm_ticks,
        )
    }

    /// Periods the alarm stays active.
    pub fn alarm_ticks(&self) -> u32 {
        self.alarm_ticks
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn alarm_state(&self) -> AlarmState {
        match self.phase {
            Phase::Alarm { .. } => AlarmState::Active,
            _ => AlarmState::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn start_opening(&mut self) -> Result<()> {
        self.start(Phase::Opening, self.door_phase)
    }

    pub fn start_closing(&mut self) -> Result<()> {
        self.start(Phase::Closing, self.door_phase)
    }

    pub fn start_alarm(&mut self) -> Result<()> {
        self.start(Phase::Alarm { ticks: 0 }, self.alarm_tick)
    }

    fn start(&mut self, phase: Phase, period: Duration) -> Result<()> {
        if !self.is_idle() {
            return Err(Error::transition(self.phase, phase));
        }
        debug!(%phase, period_ms = period.as_millis() as u64, "Phase started");
        self.phase = phase;
        self.timer.arm(period);
        Ok(())
    }

    /// Advance the phase after the timer fired.
    ///
    /// Returns `None` when nothing was being timed.
    pub fn service(&mut self) -> Option<Expiry> {
        let expiry = match self.phase {
            Phase::Idle => return None,
            Phase::Opening => {
                self.phase = Phase::Idle;
                Expiry::DoorOpened
            }
            Phase::Closing => {
                self.phase = Phase::Idle;
                Expiry::DoorClosed
            }
            Phase::Alarm { ticks } => {
                let tick = ticks + 1;
                if tick >= self.alarm_ticks {
                    self.phase = Phase::Idle;
                    self.timer.disarm();
                    info!(ticks = tick, "Alarm period complete");
                    Expiry::AlarmSilenced { ticks: tick }
                } else {
                    self.phase = Phase::Alarm { ticks: tick };
                    self.timer.arm(self.alarm_tick);
                    debug!(tick, of = self.alarm_ticks, "Alarm tick");
                    Expiry::AlarmTick { tick }
                }
            }
        };
        Some(expiry)
    }

    /// Wait for the timer, then service it.
    ///
    /// Pends forever while `Idle`.
    pub async fn next_expiry(&mut self) -> Option<Expiry> {
        if self.is_idle() {
            self.timer.disarm();
        }
        self.timer.expired().await;
        self.service()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tokio::time::Instant;

    const PHASE: Duration = Duration::from_millis(1000);
    const TICK: Duration = Duration::from_millis(12_000);

    fn sequencer(ticks: u32) -> PhaseSequencer {
        PhaseSequencer::new(PHASE, TICK, ticks)
    }

    #[tokio::test(start_paused = true)]
    async fn test_opening_phase_takes_one_period() {
        let mut seq = sequencer(5);
        let start = Instant::now();

        seq.start_opening().unwrap();
        assert_eq!(seq.phase(), Phase::Opening);

        assert_eq!(seq.next_expiry().await, Some(Expiry::DoorOpened));
        assert_eq!(start.elapsed(), PHASE);
        assert!(seq.is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_closing_phase() {
        let mut seq = sequencer(5);
        seq.start_closing().unwrap();
        assert_eq!(seq.next_expiry().await, Some(Expiry::DoorClosed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_alarm_active_for_exactly_n_periods() {
        let mut seq = sequencer(5);
        let start = Instant::now();
        seq.start_alarm().unwrap();

        for tick in 1..5 {
            assert_eq!(seq.next_expiry().await, Some(Expiry::AlarmTick { tick }));
            assert_eq!(seq.alarm_state(), AlarmState::Active);
        }
        assert_eq!(
            seq.next_expiry().await,
            Some(Expiry::AlarmSilenced { ticks: 5 })
        );

        assert_eq!(start.elapsed(), TICK * 5);
        assert_eq!(seq.alarm_state(), AlarmState::Idle);
        assert!(seq.is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_never_expires() {
        let mut seq = sequencer(5);
        let waited = tokio::time::timeout(Duration::from_secs(3600), seq.next_expiry()).await;
        assert!(waited.is_err());
    }

    #[test]
    fn test_phases_do_not_overlap() {
        let mut seq = sequencer(5);
        seq.start_alarm().unwrap();

        assert!(seq.start_opening().is_err());
        assert!(seq.start_closing().is_err());
        assert!(seq.start_alarm().is_err());
    }

    #[test]
    fn test_zero_alarm_ticks_raised_to_one() {
        let mut seq = sequencer(0);
        assert_eq!(seq.alarm_ticks(), 1);

        seq.start_alarm().unwrap();
        assert_eq!(seq.service(), Some(Expiry::AlarmSilenced { ticks: 1 }));
    }

    #[test]
    fn test_service_when_idle() {
        assert_eq!(sequencer(5).service(), None);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Alarm { ticks: 3 }.to_string(), "Alarm(3)");
        assert_eq!(Phase::Opening.to_string(), "Opening");
    }

    proptest! {
        #[test]
        fn prop_alarm_silenced_on_nth_service(n in 1u32..50) {
            let mut seq = sequencer(n);
            seq.start_alarm().unwrap();

            for tick in 1..n {
                prop_assert_eq!(seq.service(), Some(Expiry::AlarmTick { tick }));
                prop_assert_eq!(seq.alarm_state(), AlarmState::Active);
            }
            prop_assert_eq!(seq.service(), Some(Expiry::AlarmSilenced { ticks: n }));
            prop_assert_eq!(seq.alarm_state(), AlarmState::Idle);
        }
    }
}
