//! Mock device implementations for testing and development.
//!
//! Input devices come with a handle used to drive them; output devices come
//! with a [`Recording`] of everything they were told to do.

pub mod actuator;
pub mod display;
pub mod keypad;
pub mod motion;
mod recorder;
pub mod storage;

// Re-export commonly used types
pub use actuator::{MockBuzzer, MockMotor};
pub use display::{DisplaySnapshot, MockDisplay};
pub use keypad::{MockKeypad, MockKeypadHandle};
pub use motion::{MockMotionHandle, MockMotionSensor};
pub use recorder::Recording;
pub use storage::{MockStorage, StorageFault};
