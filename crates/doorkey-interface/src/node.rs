//! Interface node main loop.
//!
//! The interface node starts every exchange. It owns no password: it forwards
//! what the user types and mirrors the control node's attempt counter from
//! the `SUCCESS`/`ERROR` replies, so both sides reach the lockout together.

use std::time::Duration;

use doorkey_core::{AuthOutcome, AuthState, Authenticator, DeviceConfig};
use doorkey_hardware::{DisplayDevice, KeypadDevice, OneShotTimer};
use doorkey_protocol::{LinkError, SerialLink, Token};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::{
    entry::{MenuChoice, Prompt, read_menu_choice, read_password},
    error::Result,
};

const SCREEN_UNLOCKING: (&str, &str) = ("Unlocking Door", "");
const SCREEN_HOLDING: (&str, &str) = ("Wait for people", "to enter");
const SCREEN_LOCKING: (&str, &str) = ("Locking Door", "");
const SCREEN_LOCKOUT: (&str, &str) = ("ERROR!", "");

#[derive(Debug)]
pub struct InterfaceNode<T, K, D> {
    link: SerialLink<T>,
    keypad: K,
    display: D,
    timer: OneShotTimer,
    door_phase: Duration,
    alarm_duration: Duration,
    auth: Authenticator,
}

impl<T, K, D> InterfaceNode<T, K, D>
where
    T: AsyncRead + AsyncWrite + Unpin,
    K: KeypadDevice,
    D: DisplayDevice,
{
    /// # Errors
    ///
    /// Returns `InterfaceError::Core` if the configured attempt limit is 0.
    pub fn new(link: SerialLink<T>, keypad: K, display: D, config: &DeviceConfig) -> Result<Self> {
        Ok(Self {
            link,
            keypad,
            display,
            timer: OneShotTimer::new(),
            door_phase: config.timing.door_phase(),
            alarm_duration: config.timing.alarm_duration(),
            auth: Authenticator::new(config.auth.max_attempts)?,
        })
    }

    /// Provision a password, then run transactions until the keypad or the
    /// link goes away.
    pub async fn run(&mut self) -> Result<()> {
        info!("Interface node started");
        self.provision_until_accepted().await?;
        loop {
            self.transaction().await?;
        }
    }

    /// Have the user type a password twice and send both copies.
    ///
    /// Returns whether the control node accepted it.
    pub async fn provision(&mut self) -> Result<bool> {
        self.link.clear();

        let password = read_password(&mut self.keypad, &mut self.display, Prompt::NEW_PASSWORD).await?;
        self.link.send_password(&password).await?;

        let confirmation =
            read_password(&mut self.keypad, &mut self.display, Prompt::CONFIRM_PASSWORD).await?;
        self.link.send_password(&confirmation).await?;

        let accepted = self.recv_result().await?;
        if accepted {
            info!("Password accepted");
        } else {
            warn!("Password rejected");
        }
        Ok(accepted)
    }

    pub async fn provision_until_accepted(&mut self) -> Result<()> {
        while !self.provision().await? {}
        Ok(())
    }

    /// Run one menu choice from start to finish: authentication, then the
    /// chosen operation or the lockout.
    pub async fn transaction(&mut self) -> Result<()> {
        let choice = read_menu_choice(&mut self.keypad, &mut self.display).await?;
        self.link.send_token(Token::Match).await?;

        if !self.authenticate().await? {
            return self.lockout().await;
        }

        info!(%choice, "Authenticated");
        self.link.send_token(choice.token()).await?;
        match choice {
            MenuChoice::OpenDoor => self.open_door().await?,
            MenuChoice::ChangePassword => self.provision_until_accepted().await?,
        }
        self.auth.finish()?;
        Ok(())
    }

    async fn authenticate(&mut self) -> Result<bool> {
        self.auth.begin()?;
        loop {
            self.link.clear();
            let candidate =
                read_password(&mut self.keypad, &mut self.display, Prompt::CURRENT_PASSWORD).await?;
            self.link.send_password(&candidate).await?;
            self.auth.submit()?;

            let matched = self.recv_result().await?;
            match self.auth.record(matched)? {
                AuthOutcome::Authenticated => return Ok(true),
                AuthOutcome::Locked => return Ok(false),
                AuthOutcome::Retry { attempts } => debug!(attempts, "Asking again"),
            }
        }
    }

    async fn open_door(&mut self) -> Result<()> {
        self.show(SCREEN_UNLOCKING).await?;

        self.timer.arm(self.door_phase);
        self.timer.expired().await;
        self.link.send_token(Token::Ready).await?;
        // the control node may still be finishing its own opening phase
        self.link.wait_for_after(Token::Ack, self.door_phase).await?;

        loop {
            match self.link.recv_token().await? {
                Token::Motion => self.show(SCREEN_HOLDING).await?,
                Token::NoMotion => break,
                other => warn!(token = %other, "Ignoring token during motion hold"),
            }
        }

        self.show(SCREEN_LOCKING).await?;
        self.link.wait_for_after(Token::Ready, self.door_phase).await?;
        info!("Door cycle complete");
        Ok(())
    }

    async fn lockout(&mut self) -> Result<()> {
        self.link.send_token(Token::Alarm).await?;
        self.show(SCREEN_LOCKOUT).await?;
        warn!("Attempts exhausted, waiting for the alarm to end");

        self.link
            .wait_for_after(Token::Ready, self.alarm_duration)
            .await?;
        self.link.send_token(Token::Ack).await?;
        self.auth.complete_lockout()?;
        info!("Lockout complete");
        Ok(())
    }

    /// Shut down this end of the link so the control node stops too.
    pub async fn hang_up(&mut self) -> Result<()> {
        self.link.close().await?;
        Ok(())
    }

    async fn recv_result(&mut self) -> Result<bool> {
        let token = self.link.recv_token().await?;
        token
            .as_result()
            .ok_or_else(|| LinkError::unexpected("SUCCESS or ERROR", token).into())
    }

    async fn show(&mut self, (top, bottom): (&str, &str)) -> Result<()> {
        self.display.show(top, bottom).await?;
        Ok(())
    }

    pub fn auth_state(&self) -> AuthState {
        self.auth.state()
    }

    pub fn attempts(&self) -> u8 {
        self.auth.attempts()
    }

    pub fn display(&self) -> &D {
        &self.display
    }
}
