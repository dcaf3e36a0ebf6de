//! Error types for peripheral operations.
//!
//! Covers the failure modes of the narrow collaborators both nodes drive:
//! disconnected devices, out-of-range data and storage faults.

/// Result type alias for peripheral operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur while driving a peripheral.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Invalid data passed to or received from a device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Position outside the display area.
    #[error("Display position out of range: row {row}, column {column}")]
    OutOfBounds { row: usize, column: usize },

    /// Persistent storage access failed.
    #[error("Storage error at {address:#06x}: {message}")]
    Storage { address: u16, message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new storage error.
    pub fn storage(address: u16, message: impl Into<String>) -> Self {
        Self::Storage {
            address,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("Keypad");
        assert!(matches!(error, HardwareError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: Keypad");
    }

    #[test]
    fn test_storage_error() {
        let error = HardwareError::storage(0x0311, "write failed");
        assert_eq!(error.to_string(), "Storage error at 0x0311: write failed");
    }

    #[test]
    fn test_out_of_bounds_error() {
        let error = HardwareError::OutOfBounds { row: 2, column: 0 };
        assert_eq!(
            error.to_string(),
            "Display position out of range: row 2, column 0"
        );
    }
}
