//! Device configuration.
//!
//! A single [`DeviceConfig`] describes one device, both nodes included, so
//! that serial settings, attempt limits and timings can never differ between
//! the two sides. Every field has a default; a TOML file only needs to list
//! what it overrides:
//!
//! ```
//! use doorkey_core::DeviceConfig;
//! use std::time::Duration;
//!
//! let config = DeviceConfig::from_toml_str(r#"
//!     [timing]
//!     door_phase_ms = 2000
//!     alarm_ticks = 3
//! "#).unwrap();
//!
//! assert_eq!(config.timing.door_phase(), Duration::from_secs(2));
//! assert_eq!(config.timing.alarm_ticks, 3);
//! assert_eq!(config.serial.baud_rate, 9600);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    constants::{
        DEFAULT_ALARM_TICK_MS, DEFAULT_ALARM_TICKS, DEFAULT_BAUD_RATE, DEFAULT_DATA_BITS,
        DEFAULT_DOOR_PHASE_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_SETTLE_DELAY_MS, DEFAULT_STOP_BITS,
        PASSWORD_ADDRESS,
    },
    error::Error,
};

/// Parity setting of the serial line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
}

/// Serial line settings. Both nodes must match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
    pub parity: Parity,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DEFAULT_DATA_BITS,
            stop_bits: DEFAULT_STOP_BITS,
            parity: Parity::None,
        }
    }
}

impl SerialConfig {
    /// Line time of one character including start, parity and stop bits.
    #[must_use]
    pub fn character_time(&self) -> Duration {
        let parity_bits = u32::from(self.parity != Parity::None);
        let bits = 1 + u32::from(self.data_bits) + parity_bits + u32::from(self.stop_bits);
        Duration::from_micros(u64::from(bits) * 1_000_000 / u64::from(self.baud_rate.max(1)))
    }
}

impl std::fmt::Display for SerialConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parity = match self.parity {
            Parity::None => 'N',
            Parity::Even => 'E',
            Parity::Odd => 'O',
        };
        write!(
            f,
            "{} baud {}{}{}",
            self.baud_rate, self.data_bits, parity, self.stop_bits
        )
    }
}

/// Durations of the timed sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Duration of each motor phase.
    pub door_phase_ms: u64,
    /// Alarm timer period.
    pub alarm_tick_ms: u64,
    /// Timer periods before the alarm silences itself.
    pub alarm_ticks: u32,
    /// Delay after each frame sent on the link.
    pub settle_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            door_phase_ms: DEFAULT_DOOR_PHASE_MS,
            alarm_tick_ms: DEFAULT_ALARM_TICK_MS,
            alarm_ticks: DEFAULT_ALARM_TICKS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }
}

impl TimingConfig {
    #[must_use]
    pub fn door_phase(&self) -> Duration {
        Duration::from_millis(self.door_phase_ms)
    }

    #[must_use]
    pub fn alarm_tick(&self) -> Duration {
        Duration::from_millis(self.alarm_tick_ms)
    }

    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Total time the alarm stays active.
    #[must_use]
    pub fn alarm_duration(&self) -> Duration {
        self.alarm_tick() * self.alarm_ticks
    }
}

/// Link behaviour beyond the raw serial settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Receive timeout. `None` blocks forever on a silent peer.
    pub recv_timeout_ms: Option<u64>,
}

impl LinkConfig {
    #[must_use]
    pub fn recv_timeout(&self) -> Option<Duration> {
        self.recv_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub max_attempts: u8,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Address of the 5-byte password record.
    pub password_address: u16,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            password_address: PASSWORD_ADDRESS,
        }
    }
}

/// Complete configuration of one device (both nodes).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub serial: SerialConfig,
    pub timing: TimingConfig,
    pub link: LinkConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

impl DeviceConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    /// Returns `Error::ConfigParse` for malformed TOML and `Error::Config`
    /// for values rejected by [`validate`](Self::validate).
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: DeviceConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Reject values that would make a sequence impossible to complete.
    ///
    /// # Errors
    /// Returns `Error::Config` describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.serial.baud_rate == 0 {
            return Err(Error::Config("serial.baud_rate must be positive".into()));
        }
        if !(5..=8).contains(&self.serial.data_bits) {
            return Err(Error::Config(format!(
                "serial.data_bits must be 5-8, got {}",
                self.serial.data_bits
            )));
        }
        if !(1..=2).contains(&self.serial.stop_bits) {
            return Err(Error::Config(format!(
                "serial.stop_bits must be 1-2, got {}",
                self.serial.stop_bits
            )));
        }
        if self.timing.door_phase_ms == 0 {
            return Err(Error::Config("timing.door_phase_ms must be positive".into()));
        }
        if self.timing.alarm_tick_ms == 0 {
            return Err(Error::Config("timing.alarm_tick_ms must be positive".into()));
        }
        if self.timing.alarm_ticks == 0 {
            return Err(Error::Config("timing.alarm_ticks must be positive".into()));
        }
        if self.auth.max_attempts == 0 {
            return Err(Error::Config("auth.max_attempts must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn test_defaults_match_reference_device() {
        let config = DeviceConfig::default();
        assert_eq!(config.serial.to_string(), "9600 baud 8N1");
        assert_eq!(config.timing.door_phase(), Duration::from_secs(1));
        assert_eq!(config.timing.alarm_ticks, 5);
        assert_eq!(config.timing.alarm_duration(), Duration::from_secs(60));
        assert_eq!(config.auth.max_attempts, 3);
        assert_eq!(config.storage.password_address, 0x0311);
        assert_eq!(config.link.recv_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_character_time_8n1() {
        // 10 bits at 9600 baud
        assert_eq!(
            SerialConfig::default().character_time(),
            Duration::from_micros(1041)
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DeviceConfig::from_toml_str(
            r#"
            [link]
            recv_timeout_ms = 500

            [serial]
            parity = "even"
            "#,
        )
        .unwrap();

        assert_eq!(config.link.recv_timeout(), Some(Duration::from_millis(500)));
        assert_eq!(config.serial.parity, Parity::Even);
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.timing, TimingConfig::default());
    }

    #[rstest]
    #[case("[timing]\ndoor_phase_ms = 0", "door_phase_ms")]
    #[case("[timing]\nalarm_ticks = 0", "alarm_ticks")]
    #[case("[timing]\nalarm_tick_ms = 0", "alarm_tick_ms")]
    #[case("[auth]\nmax_attempts = 0", "max_attempts")]
    #[case("[serial]\ndata_bits = 9", "data_bits")]
    #[case("[serial]\nstop_bits = 3", "stop_bits")]
    #[case("[serial]\nbaud_rate = 0", "baud_rate")]
    fn test_invalid_values_rejected(#[case] source: &str, #[case] field: &str) {
        let err = DeviceConfig::from_toml_str(source).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains(field));
    }

    #[test]
    fn test_malformed_toml() {
        let err = DeviceConfig::from_toml_str("[timing\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[timing]\nalarm_ticks = 2").unwrap();

        let config = DeviceConfig::load(file.path()).unwrap();
        assert_eq!(config.timing.alarm_ticks, 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = DeviceConfig::load("/nonexistent/doorkey.toml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
