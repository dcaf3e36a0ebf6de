//! Peripheral trait definitions.
//!
//! Each node drives its peripherals through these narrow traits, so the
//! node controllers run unchanged against mock devices, a terminal front
//! end, or real drivers.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro. As a consequence they
//! are not object-safe: use generic parameters.

#![allow(async_fn_in_trait)]

use std::fmt;

use doorkey_core::{
    Occupancy,
    constants::{KEY_CHANGE_PASSWORD, KEY_ENTER, KEY_OPEN_DOOR},
};
use serde::{Deserialize, Serialize};

use crate::error::{HardwareError, Result};

/// A key press on the interface node's keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypadInput {
    /// Numeric digit (0-9).
    Digit(u8),

    /// Confirm entry (`=`).
    Enter,

    /// Menu choice: open the door (`+`).
    OpenDoor,

    /// Menu choice: change the password (`-`).
    ChangePassword,

    /// Any other key on the pad.
    Other(char),
}

impl KeypadInput {
    /// Create a digit input.
    ///
    /// # Errors
    ///
    /// Returns an error if the digit is greater than 9.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorkey_hardware::traits::KeypadInput;
    ///
    /// let input = KeypadInput::digit(5).unwrap();
    /// assert_eq!(input.as_digit(), Some(5));
    ///
    /// assert!(KeypadInput::digit(10).is_err());
    /// ```
    pub fn digit(d: u8) -> Result<Self> {
        if d > 9 {
            return Err(HardwareError::invalid_data(format!(
                "Digit must be 0-9, got {}",
                d
            )));
        }
        Ok(Self::Digit(d))
    }

    /// Map a key label to its input.
    ///
    /// ```
    /// use doorkey_hardware::traits::KeypadInput;
    ///
    /// assert_eq!(KeypadInput::from_char('7'), KeypadInput::Digit(7));
    /// assert_eq!(KeypadInput::from_char('='), KeypadInput::Enter);
    /// assert_eq!(KeypadInput::from_char('%'), KeypadInput::Other('%'));
    /// ```
    pub fn from_char(key: char) -> Self {
        match key {
            KEY_ENTER => Self::Enter,
            KEY_OPEN_DOOR => Self::OpenDoor,
            KEY_CHANGE_PASSWORD => Self::ChangePassword,
            c => match c.to_digit(10) {
                Some(d) => Self::Digit(d as u8),
                None => Self::Other(c),
            },
        }
    }

    /// Key label as printed on the pad.
    pub fn as_char(&self) -> char {
        match self {
            Self::Digit(d) => char::from(b'0' + d),
            Self::Enter => KEY_ENTER,
            Self::OpenDoor => KEY_OPEN_DOOR,
            Self::ChangePassword => KEY_CHANGE_PASSWORD,
            Self::Other(c) => *c,
        }
    }

    pub fn is_digit(&self) -> bool {
        matches!(self, Self::Digit(_))
    }

    pub fn as_digit(&self) -> Option<u8> {
        match self {
            Self::Digit(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for KeypadInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Keypad abstraction.
///
/// # Examples
///
/// ```no_run
/// use doorkey_hardware::traits::{KeypadDevice, KeypadInput};
/// use doorkey_hardware::Result;
///
/// async fn wait_for_enter<K: KeypadDevice>(keypad: &mut K) -> Result<()> {
///     while keypad.read_input().await? != KeypadInput::Enter {}
///     Ok(())
/// }
/// ```
pub trait KeypadDevice: Send + Sync {
    /// Block until the next key press.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is disconnected.
    async fn read_input(&mut self) -> Result<KeypadInput>;
}

/// Character display abstraction (2 rows × 16 columns on the reference
/// device).
pub trait DisplayDevice: Send + Sync {
    /// Blank the whole display.
    async fn clear(&mut self) -> Result<()>;

    /// Write `text` starting at `(row, column)`.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::OutOfBounds` if the position is outside the
    /// display. Text running past the last column is truncated.
    async fn write_at(&mut self, row: usize, column: usize, text: &str) -> Result<()>;

    /// Clear, then show `top` on row 0 and `bottom` on row 1.
    async fn show(&mut self, top: &str, bottom: &str) -> Result<()> {
        self.clear().await?;
        self.write_at(0, 0, top).await?;
        if !bottom.is_empty() {
            self.write_at(1, 0, bottom).await?;
        }
        Ok(())
    }
}

/// Rotation commanded to the door motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotorDirection {
    Stop,
    /// Opens the door.
    Clockwise,
    /// Closes the door.
    AntiClockwise,
}

impl fmt::Display for MotorDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stop => "stop",
            Self::Clockwise => "clockwise",
            Self::AntiClockwise => "anti-clockwise",
        };
        f.write_str(name)
    }
}

/// Door motor driver.
pub trait MotorDevice: Send + Sync {
    async fn drive(&mut self, direction: MotorDirection) -> Result<()>;
}

/// Alarm buzzer driver.
pub trait BuzzerDevice: Send + Sync {
    async fn set_active(&mut self, active: bool) -> Result<()>;
}

/// Binary occupancy sensor.
pub trait MotionSensor: Send + Sync {
    /// Sample the sensor once.
    async fn read(&mut self) -> Result<Occupancy>;
}

/// Byte-addressed persistent storage.
pub trait PersistentStorage: Send + Sync {
    /// Write `data` starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::Storage` if the range is outside the device
    /// or the write fails.
    async fn write_bytes(&mut self, address: u16, data: &[u8]) -> Result<()>;

    /// Fill `buffer` from `address` onwards.
    async fn read_bytes(&mut self, address: u16, buffer: &mut [u8]) -> Result<()>;
}
