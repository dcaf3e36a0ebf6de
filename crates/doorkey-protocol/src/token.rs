//! Command and status tokens.
//!
//! | Token | Value | Meaning |
//! |---|---|---|
//! | `Error` | 0 | operation failed |
//! | `Success` | 1 | operation succeeded |
//! | `OpenDoor` | 2 | request: open the door |
//! | `ChangePassword` | 3 | request: change password |
//! | `Match` | 4 | request: authenticate before a privileged action |
//! | `Ack` | 5 | generic acknowledgment |
//! | `Ready` | 6 | peer completed a timed action |
//! | `Alarm` | 7 | lockout alarm notification |
//! | `NoMotion` | 8 | no occupancy |
//! | `Motion` | 9 | occupancy detected |
//!
//! Values 0-7 match the reference firmware. Occupancy readings get values of
//! their own so that a failed operation and an empty doorway can never be
//! mistaken for each other on the wire.

use std::fmt;

use doorkey_core::Occupancy;
use serde::{Deserialize, Serialize};

use crate::error::LinkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Token {
    Error = 0,
    Success = 1,
    OpenDoor = 2,
    ChangePassword = 3,
    Match = 4,
    Ack = 5,
    Ready = 6,
    Alarm = 7,
    NoMotion = 8,
    Motion = 9,
}

impl Token {
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Status token for a comparison or persistence result.
    pub fn from_result(ok: bool) -> Self {
        if ok { Token::Success } else { Token::Error }
    }

    /// Motion token for a sensor reading.
    pub fn from_occupancy(occupancy: Occupancy) -> Self {
        match occupancy {
            Occupancy::Occupied => Token::Motion,
            Occupancy::Vacant => Token::NoMotion,
        }
    }

    /// `true` for `Success`, `false` for `Error`, `None` otherwise.
    pub fn as_result(self) -> Option<bool> {
        match self {
            Token::Success => Some(true),
            Token::Error => Some(false),
            _ => None,
        }
    }

    /// Look up a token by wire value.
    pub fn from_u8(value: u8) -> Option<Self> {
        let token = match value {
            0 => Token::Error,
            1 => Token::Success,
            2 => Token::OpenDoor,
            3 => Token::ChangePassword,
            4 => Token::Match,
            5 => Token::Ack,
            6 => Token::Ready,
            7 => Token::Alarm,
            8 => Token::NoMotion,
            9 => Token::Motion,
            _ => return None,
        };
        Some(token)
    }
}

impl TryFrom<u8> for Token {
    type Error = LinkError;

    fn try_from(value: u8) -> Result<Self, LinkError> {
        Token::from_u8(value)
            .ok_or_else(|| LinkError::invalid_frame(format!("unknown token {value}")))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Token::Error => "ERROR",
            Token::Success => "SUCCESS",
            Token::OpenDoor => "OPEN_DOOR",
            Token::ChangePassword => "CHANGE_PASSWORD",
            Token::Match => "MATCH",
            Token::Ack => "ACK",
            Token::Ready => "READY",
            Token::Alarm => "ALARM",
            Token::NoMotion => "NO_MOTION",
            Token::Motion => "MOTION",
        };
        f.write_str(name)
    }
}
