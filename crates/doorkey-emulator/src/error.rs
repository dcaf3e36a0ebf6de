use doorkey_control::ControlError;
use doorkey_interface::InterfaceError;

/// Result type alias for emulator operations.
pub type Result<T> = std::result::Result<T, EmulatorError>;

#[derive(Debug, thiserror::Error)]
pub enum EmulatorError {
    #[error("Configuration error: {0}")]
    Config(#[from] doorkey_core::Error),

    #[error("Interface node: {0}")]
    Interface(#[from] InterfaceError),

    #[error("Control node: {0}")]
    Control(#[from] ControlError),

    #[error("Node task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
