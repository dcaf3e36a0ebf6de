//! Control node main loop.
//!
//! The control node is the authoritative side of every transaction. It never
//! speaks first: each exchange starts with a token from the interface node,
//! and the control node answers in lock-step.
//!
//! # Transactions
//!
//! ```text
//! provisioning   ◀ 5 symbols, ◀ 5 symbols, ▶ SUCCESS|ERROR          (repeat while ERROR)
//! login          ◀ MATCH, { ◀ 5 symbols, ▶ SUCCESS|ERROR }          (until success or lockout)
//! open door      ◀ OPEN_DOOR, ◀ READY, ▶ ACK, ▶ MOTION*, ▶ NO_MOTION, ▶ READY
//! change pass    ◀ CHANGE_PASSWORD, provisioning
//! lockout        ◀ ALARM, (alarm for N periods), ▶ READY, ◀ ACK
//! ```

use doorkey_core::{
    AlarmState, AuthOutcome, AuthState, Authenticator, DeviceConfig, DoorState,
};
use doorkey_hardware::{
    BuzzerDevice, MotionSensor, MotorDevice, MotorDirection, PersistentStorage,
};
use doorkey_protocol::{SerialLink, Token};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{error, info, warn};

use crate::{
    door::DoorStateMachine,
    error::{ControlError, Result},
    motion::MotionGate,
    sequencer::{Expiry, PhaseSequencer},
    store::PasswordStore,
};

/// Peripherals owned by the control node.
#[derive(Debug)]
pub struct ControlDevices<M, B, S, P> {
    pub motor: M,
    pub buzzer: B,
    pub motion: S,
    pub storage: P,
}

#[derive(Debug)]
pub struct ControlNode<T, M, B, S, P> {
    link: SerialLink<T>,
    motor: M,
    buzzer: B,
    gate: MotionGate<S>,
    store: PasswordStore<P>,
    door: DoorStateMachine,
    sequencer: PhaseSequencer,
    auth: Authenticator,
    storage_faults: u32,
}

impl<T, M, B, S, P> ControlNode<T, M, B, S, P>
where
    T: AsyncRead + AsyncWrite + Unpin,
    M: MotorDevice,
    B: BuzzerDevice,
    S: MotionSensor,
    P: PersistentStorage,
{
    /// # Errors
    ///
    /// Returns `ControlError::Core` if the configured attempt limit is 0.
    pub fn new(
        link: SerialLink<T>,
        devices: ControlDevices<M, B, S, P>,
        config: &DeviceConfig,
    ) -> Result<Self> {
        Ok(Self {
            link,
            motor: devices.motor,
            buzzer: devices.buzzer,
            gate: MotionGate::new(devices.motion),
            store: PasswordStore::new(devices.storage, config.storage.password_address),
            door: DoorStateMachine::new(),
            sequencer: PhaseSequencer::from_config(config),
            auth: Authenticator::new(config.auth.max_attempts)?,
            storage_faults: 0,
        })
    }

    /// Provision a password, then serve transactions until the link fails.
    pub async fn run(&mut self) -> Result<()> {
        info!("Control node started");
        self.provision_until_accepted().await?;
        loop {
            self.serve().await?;
        }
    }

    /// Receive a password and its confirmation and answer with the result.
    ///
    /// Returns whether the new password was accepted. A password that could
    /// not be stored is rejected like a mismatch and counted in
    /// [`storage_faults`](Self::storage_faults).
    pub async fn provision(&mut self) -> Result<bool> {
        let password = self.link.recv_password_idle().await?;
        self.store.stage(password);
        let confirmation = self.link.recv_password_idle().await?;

        let accepted = match self.store.confirm(&confirmation).await {
            Ok(accepted) => accepted,
            Err(e) => {
                self.storage_faults += 1;
                error!(error = %e, faults = self.storage_faults, "Password not stored");
                false
            }
        };
        self.link.send_token(Token::from_result(accepted)).await?;
        Ok(accepted)
    }

    pub async fn provision_until_accepted(&mut self) -> Result<()> {
        while !self.provision().await? {
            info!("Provisioning rejected, waiting for a new attempt");
        }
        Ok(())
    }

    /// Serve one transaction, starting from the peer's `MATCH`.
    ///
    /// Tokens other than `MATCH` received while idle are logged and dropped.
    pub async fn serve(&mut self) -> Result<()> {
        self.link.wait_for_idle(Token::Match).await?;
        info!("Authentication requested");

        if self.authenticate().await? {
            self.dispatch().await
        } else {
            self.lockout().await
        }
    }

    /// Run the attempt loop. Returns `true` when authenticated, `false` once
    /// locked out.
    async fn authenticate(&mut self) -> Result<bool> {
        self.auth.begin()?;
        loop {
            let candidate = self.link.recv_password_idle().await?;
            let stored = self.store.active_or_err()?;
            let outcome = self.auth.compare(stored, &candidate)?;
            self.link
                .send_token(Token::from_result(outcome.is_success()))
                .await?;

            match outcome {
                AuthOutcome::Authenticated => return Ok(true),
                AuthOutcome::Locked => return Ok(false),
                AuthOutcome::Retry { .. } => {}
            }
        }
    }

    async fn dispatch(&mut self) -> Result<()> {
        loop {
            match self.link.recv_token().await? {
                Token::OpenDoor => {
                    self.open_door().await?;
                    break;
                }
                Token::ChangePassword => {
                    info!("Password change requested");
                    self.provision_until_accepted().await?;
                    break;
                }
                other => warn!(token = %other, "Ignoring token while awaiting a command"),
            }
        }
        self.auth.finish()?;
        Ok(())
    }

    async fn open_door(&mut self) -> Result<()> {
        info!("Opening door");
        self.door.transition_to(DoorState::Opening)?;
        self.motor.drive(MotorDirection::Clockwise).await?;
        self.sequencer.start_opening()?;
        self.await_expiry(Expiry::DoorOpened).await?;
        self.motor.drive(MotorDirection::Stop).await?;
        self.door.transition_to(DoorState::Open)?;

        // the peer times its own phase; both must be done before the hold
        self.link.wait_for(Token::Ready).await?;
        self.link.send_token(Token::Ack).await?;

        while self.gate.sample().await?.is_occupied() {
            self.link.send_token(Token::Motion).await?;
        }
        self.link.send_token(Token::NoMotion).await?;

        self.door.transition_to(DoorState::Closing)?;
        self.motor.drive(MotorDirection::AntiClockwise).await?;
        self.sequencer.start_closing()?;
        self.await_expiry(Expiry::DoorClosed).await?;
        self.motor.drive(MotorDirection::Stop).await?;
        self.door.transition_to(DoorState::Closed)?;

        self.link.send_token(Token::Ready).await?;
        info!(samples = self.gate.samples(), "Door cycle complete");
        Ok(())
    }

    async fn lockout(&mut self) -> Result<()> {
        self.link.wait_for(Token::Alarm).await?;
        warn!("Attempts exhausted, alarm raised");

        self.buzzer.set_active(true).await?;
        self.sequencer.start_alarm()?;
        loop {
            match self.sequencer.next_expiry().await {
                Some(Expiry::AlarmTick { .. }) => continue,
                Some(Expiry::AlarmSilenced { .. }) => break,
                other => return Err(ControlError::UnexpectedExpiry(format!("{other:?}"))),
            }
        }
        self.buzzer.set_active(false).await?;

        self.link.send_token(Token::Ready).await?;
        self.link.wait_for(Token::Ack).await?;
        self.auth.complete_lockout()?;
        info!("Lockout complete");
        Ok(())
    }

    /// Shut down this end of the link.
    pub async fn hang_up(&mut self) -> Result<()> {
        self.link.close().await?;
        Ok(())
    }

    async fn await_expiry(&mut self, expected: Expiry) -> Result<()> {
        match self.sequencer.next_expiry().await {
            Some(expiry) if expiry == expected => Ok(()),
            other => Err(ControlError::UnexpectedExpiry(format!("{other:?}"))),
        }
    }

    pub fn door(&self) -> &DoorStateMachine {
        &self.door
    }

    pub fn alarm_state(&self) -> AlarmState {
        self.sequencer.alarm_state()
    }

    pub fn auth_state(&self) -> AuthState {
        self.auth.state()
    }

    pub fn attempts(&self) -> u8 {
        self.auth.attempts()
    }

    /// Passwords rejected because storage did not confirm the write.
    pub fn storage_faults(&self) -> u32 {
        self.storage_faults
    }

    pub fn store(&self) -> &PasswordStore<P> {
        &self.store
    }

    pub fn motor(&self) -> &M {
        &self.motor
    }

    pub fn buzzer(&self) -> &B {
        &self.buzzer
    }
}
