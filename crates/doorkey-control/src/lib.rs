//! Control node of the door controller.
//!
//! Validates passwords against the stored one, drives the door motor, holds
//! the door open while the occupancy sensor reports someone in the doorway,
//! and sounds the alarm after repeated failures. All of it is driven by
//! tokens received from the interface node over a [`SerialLink`].
//!
//! [`SerialLink`]: doorkey_protocol::SerialLink
//!
//! # Modules
//!
//! - [`store`]: active and staged password, persisted with read-back
//! - [`door`]: door position state machine with history
//! - [`sequencer`]: one-shot timer phases for the door and the alarm
//! - [`motion`]: single-sample occupancy gate
//! - [`node`]: the main loop tying the above to the link

pub mod door;
pub mod error;
pub mod motion;
pub mod node;
pub mod sequencer;
pub mod store;

pub use door::{DoorStateMachine, DoorTransition};
pub use error::{ControlError, Result};
pub use motion::MotionGate;
pub use node::{ControlDevices, ControlNode};
pub use sequencer::{Expiry, Phase, PhaseSequencer};
pub use store::PasswordStore;
