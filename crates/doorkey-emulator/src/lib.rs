//! Door controller emulator.
//!
//! Runs the interface node and the control node side by side on mock
//! devices, connected by an in-memory serial line. Used by the command-line
//! front end and by the end-to-end tests.

pub mod emulator;
pub mod error;
pub mod panel;

pub use emulator::{EmulatedControl, EmulatedInterface, Emulator, EmulatorBuilder, EmulatorReport};
pub use error::{EmulatorError, Result};
pub use panel::{PanelEvent, render_screen};
