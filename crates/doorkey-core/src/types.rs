use crate::{
    Result,
    constants::{DEFAULT_MAX_ATTEMPTS, MAX_SYMBOL, PASSWORD_LENGTH},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single password symbol (one keypad digit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(u8);

impl Symbol {
    /// Create a symbol with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidSymbol` if the value is not a digit 0-9.
    pub fn new(value: u8) -> Result<Self> {
        if value > MAX_SYMBOL {
            return Err(Error::InvalidSymbol(value));
        }
        Ok(Symbol(value))
    }

    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 5-symbol credential.
///
/// The same type carries the stored password and a freshly entered
/// candidate; see [`Candidate`].
///
/// # Security
/// `Debug` and `Display` never print the symbols.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Password([Symbol; PASSWORD_LENGTH]);

/// A password entered for confirmation or for a login attempt.
pub type Candidate = Password;

impl Password {
    /// Create a password from raw symbol bytes.
    ///
    /// # Errors
    /// Returns `Error::InvalidSymbol` if any byte is not a digit 0-9.
    pub fn new(bytes: [u8; PASSWORD_LENGTH]) -> Result<Self> {
        let mut symbols = [Symbol(0); PASSWORD_LENGTH];
        for (slot, byte) in symbols.iter_mut().zip(bytes) {
            *slot = Symbol::new(byte)?;
        }
        Ok(Password(symbols))
    }

    /// Create a password from a slice of symbol bytes.
    ///
    /// # Errors
    /// Returns `Error::InvalidPassword` if the slice is not exactly
    /// [`PASSWORD_LENGTH`] long, or `Error::InvalidSymbol` for a non-digit.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; PASSWORD_LENGTH] = bytes.try_into().map_err(|_| {
            Error::InvalidPassword(format!(
                "expected {PASSWORD_LENGTH} symbols, got {}",
                bytes.len()
            ))
        })?;
        Self::new(array)
    }

    /// Build a password from already validated symbols.
    #[must_use]
    pub fn from_symbols(symbols: [Symbol; PASSWORD_LENGTH]) -> Self {
        Password(symbols)
    }

    #[must_use]
    pub fn symbols(&self) -> &[Symbol; PASSWORD_LENGTH] {
        &self.0
    }

    /// Raw bytes in storage order.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; PASSWORD_LENGTH] {
        self.0.map(|s| s.as_u8())
    }

    /// Element-wise comparison against a candidate.
    ///
    /// Stops at the first mismatching position. The result is all-or-nothing:
    /// a candidate matching four of five symbols is simply a mismatch.
    #[must_use]
    pub fn matches(&self, candidate: &Candidate) -> bool {
        self.0.iter().zip(candidate.0.iter()).all(|(a, b)| a == b)
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(*****)")
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("*****")
    }
}

/// Consecutive failed candidate comparisons within one transaction.
///
/// Ranges over `0..=limit`. Once the limit is reached the counter stays
/// there until [`reset`](AttemptCounter::reset) is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptCounter {
    count: u8,
    limit: u8,
}

impl AttemptCounter {
    /// # Errors
    /// Returns `Error::Config` for a zero limit.
    pub fn new(limit: u8) -> Result<Self> {
        if limit == 0 {
            return Err(Error::Config("attempt limit must be at least 1".into()));
        }
        Ok(Self { count: 0, limit })
    }

    #[must_use]
    pub fn count(&self) -> u8 {
        self.count
    }

    #[must_use]
    pub fn limit(&self) -> u8 {
        self.limit
    }

    /// Record one failed comparison and return the new count.
    pub fn increment(&mut self) -> u8 {
        self.count = self.count.saturating_add(1).min(self.limit);
        self.count
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.count >= self.limit
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }
}

impl Default for AttemptCounter {
    fn default() -> Self {
        Self {
            count: 0,
            limit: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Physical door position as driven by the door actuator.
///
/// Transitions are strictly cyclic:
/// `Closed → Opening → Open → Closing → Closed`.
/// `Closed` and `Open` are rest states; `Opening` and `Closing` last one
/// motor phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorState {
    Closed,
    Opening,
    Open,
    Closing,
}

impl DoorState {
    /// The only state this one may move to.
    #[must_use]
    pub fn successor(&self) -> DoorState {
        match self {
            DoorState::Closed => DoorState::Opening,
            DoorState::Opening => DoorState::Open,
            DoorState::Open => DoorState::Closing,
            DoorState::Closing => DoorState::Closed,
        }
    }

    #[must_use]
    pub fn can_transition_to(&self, target: &DoorState) -> bool {
        self.successor() == *target
    }

    /// `true` while a motor phase is running.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        matches!(self, DoorState::Opening | DoorState::Closing)
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DoorState::Closed => "Closed",
            DoorState::Opening => "Opening",
            DoorState::Open => "Open",
            DoorState::Closing => "Closing",
        };
        write!(f, "{}", s)
    }
}

/// Audible/visual alert state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmState {
    #[default]
    Idle,
    Active,
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlarmState::Idle => write!(f, "Idle"),
            AlarmState::Active => write!(f, "Active"),
        }
    }
}

/// Binary reading of the occupancy sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occupancy {
    Vacant,
    Occupied,
}

impl Occupancy {
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        matches!(self, Occupancy::Occupied)
    }
}

impl From<bool> for Occupancy {
    fn from(level: bool) -> Self {
        if level {
            Occupancy::Occupied
        } else {
            Occupancy::Vacant
        }
    }
}
