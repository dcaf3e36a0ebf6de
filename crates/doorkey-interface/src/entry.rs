//! Keypad entry with display feedback.
//!
//! Password digits are echoed as `*` on the bottom row, right after the
//! bottom prompt text. Keys that make no sense at the current step are
//! ignored rather than rejected: the keypad has no way to report an error.

use std::fmt;

use doorkey_core::{Password, constants::PASSWORD_LENGTH};
use doorkey_hardware::{DisplayDevice, KeypadDevice, KeypadInput};
use doorkey_protocol::Token;
use tracing::{debug, trace};

use crate::error::Result;

/// Two-row prompt shown while a password is typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prompt {
    pub top: &'static str,
    pub bottom: &'static str,
}

impl Prompt {
    pub const NEW_PASSWORD: Prompt = Prompt {
        top: "Enter Pass:",
        bottom: "",
    };

    pub const CONFIRM_PASSWORD: Prompt = Prompt {
        top: "Re-Enter the",
        bottom: "same pass:",
    };

    pub const CURRENT_PASSWORD: Prompt = Prompt {
        top: "Enter old Pass:",
        bottom: "",
    };

    /// Column of the first echoed `*` on the bottom row.
    pub fn echo_column(&self) -> usize {
        self.bottom.len()
    }
}

/// Operation picked at the top menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    OpenDoor,
    ChangePassword,
}

impl MenuChoice {
    pub const TOP_ROW: &'static str = "+ : Open Door";
    pub const BOTTOM_ROW: &'static str = "- : Change Pass";

    pub fn from_input(input: KeypadInput) -> Option<Self> {
        match input {
            KeypadInput::OpenDoor => Some(Self::OpenDoor),
            KeypadInput::ChangePassword => Some(Self::ChangePassword),
            _ => None,
        }
    }

    /// Command token sent once the user is authenticated.
    pub fn token(self) -> Token {
        match self {
            Self::OpenDoor => Token::OpenDoor,
            Self::ChangePassword => Token::ChangePassword,
        }
    }
}

impl fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenDoor => write!(f, "open door"),
            Self::ChangePassword => write!(f, "change password"),
        }
    }
}

/// Show `prompt`, read five digits and wait for the confirm key.
///
/// Digits typed after the fifth are ignored until the confirm key.
///
/// # Errors
///
/// Returns `InterfaceError::Hardware` if the keypad or display fails.
pub async fn read_password<K, D>(keypad: &mut K, display: &mut D, prompt: Prompt) -> Result<Password>
where
    K: KeypadDevice,
    D: DisplayDevice,
{
    display.show(prompt.top, prompt.bottom).await?;

    let mut digits = [0u8; PASSWORD_LENGTH];
    let mut count = 0;
    while count < PASSWORD_LENGTH {
        match keypad.read_input().await? {
            KeypadInput::Digit(d) => {
                digits[count] = d;
                display.write_at(1, prompt.echo_column() + count, "*").await?;
                count += 1;
            }
            other => trace!(key = %other, "Ignoring non-digit key"),
        }
    }

    while keypad.read_input().await? != KeypadInput::Enter {}
    debug!(prompt = prompt.top, "Password entered");

    Ok(Password::new(digits)?)
}

/// Show the top menu and wait for `+` or `-`.
pub async fn read_menu_choice<K, D>(keypad: &mut K, display: &mut D) -> Result<MenuChoice>
where
    K: KeypadDevice,
    D: DisplayDevice,
{
    display
        .show(MenuChoice::TOP_ROW, MenuChoice::BOTTOM_ROW)
        .await?;

    loop {
        let input = keypad.read_input().await?;
        if let Some(choice) = MenuChoice::from_input(input) {
            debug!(%choice, "Menu choice");
            return Ok(choice);
        }
        trace!(key = %input, "Ignoring key at menu");
    }
}
