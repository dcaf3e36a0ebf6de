//! Shared data model for the two-node door controller.
//!
//! Both the interface node and the control node link against this crate so
//! that they agree on password shape, attempt limits, door/alarm states and
//! configuration.

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use auth::{AuthOutcome, AuthState, Authenticator};
pub use config::DeviceConfig;
pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
