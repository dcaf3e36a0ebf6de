//! Error types for link operations.

/// Result type alias for link operations.
pub type Result<T> = std::result::Result<T, LinkError>;

/// Errors raised by the codec and the serial link.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Check byte did not match the frame contents.
    #[error("Checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// Sequence tag skipped or repeated: a frame was lost or duplicated.
    #[error("Link desynchronized: expected sequence {expected}, got {actual}")]
    Desynchronized { expected: u8, actual: u8 },

    /// Frame kind, token value or symbol value out of range.
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// A well-formed frame arrived where a different kind was required.
    #[error("Unexpected frame: expected {expected}, got {actual}")]
    UnexpectedFrame { expected: String, actual: String },

    /// Receive timed out.
    #[error("Receive timeout after {0}ms")]
    Timeout(u64),

    /// Peer closed the line.
    #[error("Link closed by peer")]
    Closed,

    /// Low-level I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LinkError {
    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Self::InvalidFrame(message.into())
    }

    pub fn unexpected(expected: impl ToString, actual: impl ToString) -> Self {
        Self::UnexpectedFrame {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// `true` for errors that mean the two nodes no longer agree on where
    /// they are in the protocol.
    pub fn is_desync(&self) -> bool {
        matches!(
            self,
            Self::ChecksumMismatch { .. } | Self::Desynchronized { .. } | Self::InvalidFrame(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desync_display() {
        let error = LinkError::Desynchronized {
            expected: 4,
            actual: 6,
        };
        assert_eq!(
            error.to_string(),
            "Link desynchronized: expected sequence 4, got 6"
        );
        assert!(error.is_desync());
    }

    #[test]
    fn test_checksum_display() {
        let error = LinkError::ChecksumMismatch {
            expected: 0xA5,
            actual: 0x00,
        };
        assert_eq!(error.to_string(), "Checksum mismatch: expected 0xa5, got 0x00");
    }

    #[test]
    fn test_timeout_is_not_desync() {
        assert!(!LinkError::Timeout(100).is_desync());
        assert!(!LinkError::Closed.is_desync());
    }
}
