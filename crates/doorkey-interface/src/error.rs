//! Error types for the interface node.

use doorkey_hardware::HardwareError;
use doorkey_protocol::LinkError;

/// Result type alias for interface node operations.
pub type Result<T> = std::result::Result<T, InterfaceError>;

#[derive(Debug, thiserror::Error)]
pub enum InterfaceError {
    #[error(transparent)]
    Core(#[from] doorkey_core::Error),

    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),
}

impl InterfaceError {
    /// `true` once the keypad or the link is gone: nothing left to drive.
    pub fn is_disconnected(&self) -> bool {
        matches!(
            self,
            Self::Link(LinkError::Closed) | Self::Hardware(HardwareError::Disconnected { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected() {
        assert!(InterfaceError::from(LinkError::Closed).is_disconnected());
        assert!(InterfaceError::from(HardwareError::disconnected("keypad")).is_disconnected());
        assert!(!InterfaceError::from(LinkError::Timeout(10)).is_disconnected());
    }
}
