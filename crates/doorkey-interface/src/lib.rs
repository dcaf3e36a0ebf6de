//! Interface node of the door controller.
//!
//! Reads the keypad, drives the character display and starts every exchange
//! with the control node. The interface node never sees the stored password;
//! it only learns the outcome of each comparison.
//!
//! - [`entry`]: prompts, masked password entry and the top menu
//! - [`node`]: provisioning, transactions, and the door and lockout client sides

pub mod entry;
pub mod error;
pub mod node;

pub use entry::{MenuChoice, Prompt};
pub use error::{InterfaceError, Result};
pub use node::InterfaceNode;
