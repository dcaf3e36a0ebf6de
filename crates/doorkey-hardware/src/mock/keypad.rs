//! Mock keypad.
//!
//! Key presses are queued through a [`MockKeypadHandle`] and handed out one
//! per read, in order. Dropping every handle unplugs the keypad: once the
//! queue is drained, reads fail with [`HardwareError::Disconnected`].
//!
//! ```
//! use doorkey_hardware::mock::MockKeypad;
//! use doorkey_hardware::traits::{KeypadDevice, KeypadInput};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> doorkey_hardware::Result<()> {
//! let (mut keypad, handle) = MockKeypad::new();
//! handle.send_keys("+1=").await?;
//!
//! assert_eq!(keypad.read_input().await?, KeypadInput::OpenDoor);
//! assert_eq!(keypad.read_input().await?, KeypadInput::Digit(1));
//! assert_eq!(keypad.read_input().await?, KeypadInput::Enter);
//! # Ok(())
//! # }
//! ```

use tokio::sync::mpsc;
use tracing::trace;

use crate::{
    HardwareError, Result,
    traits::{KeypadDevice, KeypadInput},
};

/// Presses that can be queued before the reader catches up.
const KEY_QUEUE: usize = 64;

const DEVICE: &str = "keypad";

#[derive(Debug)]
pub struct MockKeypad {
    presses: mpsc::Receiver<KeypadInput>,
}

impl MockKeypad {
    pub fn new() -> (Self, MockKeypadHandle) {
        let (tx, presses) = mpsc::channel(KEY_QUEUE);
        (Self { presses }, MockKeypadHandle { tx })
    }
}

impl KeypadDevice for MockKeypad {
    async fn read_input(&mut self) -> Result<KeypadInput> {
        let key = self
            .presses
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected(DEVICE))?;
        trace!(%key, "Key pressed");
        Ok(key)
    }
}

/// Presses keys on a [`MockKeypad`]. Cloneable; the keypad stays plugged in
/// while any clone is alive.
#[derive(Debug, Clone)]
pub struct MockKeypadHandle {
    tx: mpsc::Sender<KeypadInput>,
}

impl MockKeypadHandle {
    /// # Errors
    ///
    /// Returns `HardwareError::Disconnected` once the keypad is dropped.
    pub async fn send_input(&self, input: KeypadInput) -> Result<()> {
        self.tx
            .send(input)
            .await
            .map_err(|_| HardwareError::disconnected(DEVICE))
    }

    /// Press the keys labelled by `keys`, e.g. `"+ 12345="`. Whitespace is
    /// skipped.
    pub async fn send_keys(&self, keys: &str) -> Result<()> {
        for label in keys.chars().filter(|c| !c.is_whitespace()) {
            self.send_input(KeypadInput::from_char(label)).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_presses_read_in_order() {
        let (mut keypad, handle) = MockKeypad::new();
        handle.send_keys("- 9 %").await.unwrap();

        assert_eq!(keypad.read_input().await.unwrap(), KeypadInput::ChangePassword);
        assert_eq!(keypad.read_input().await.unwrap(), KeypadInput::Digit(9));
        assert_eq!(keypad.read_input().await.unwrap(), KeypadInput::Other('%'));
    }

    #[tokio::test]
    async fn test_queued_keys_survive_unplug() {
        let (mut keypad, handle) = MockKeypad::new();
        handle.send_input(KeypadInput::Enter).await.unwrap();
        drop(handle);

        assert_eq!(keypad.read_input().await.unwrap(), KeypadInput::Enter);
        let err = keypad.read_input().await.unwrap_err();
        assert!(matches!(err, HardwareError::Disconnected { .. }));
    }

    #[tokio::test]
    async fn test_send_after_keypad_dropped() {
        let (keypad, handle) = MockKeypad::new();
        drop(keypad);

        assert!(handle.send_keys("1").await.is_err());
    }
}
