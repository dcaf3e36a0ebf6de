//! Error types for the control node.

use doorkey_hardware::HardwareError;
use doorkey_protocol::LinkError;

/// Result type alias for control node operations.
pub type Result<T> = std::result::Result<T, ControlError>;

#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error(transparent)]
    Core(#[from] doorkey_core::Error),

    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),

    /// The stored record read back differs from what was written.
    #[error("Password write at {address:#06x} not confirmed by read-back")]
    StorageNotConfirmed { address: u16 },

    /// A privileged operation was requested before any password was set.
    #[error("No password provisioned")]
    NotProvisioned,

    /// The phase timer fired with nothing to service.
    #[error("Timer expired in phase {0}")]
    UnexpectedExpiry(String),
}

impl ControlError {
    /// `true` if the peer is gone and the node can only stop.
    pub fn is_link_closed(&self) -> bool {
        matches!(self, Self::Link(LinkError::Closed))
    }
}
