//! Inter-node link protocol.
//!
//! The two nodes talk over a single byte-oriented serial line. This crate
//! defines what travels on it:
//!
//! - [`Token`]: the closed command/status vocabulary shared by both nodes
//! - [`Frame`]: one unit on the wire, either a token or a password symbol
//! - [`LinkCodec`]: the 4-byte wire encoding with sequence tag and check byte
//! - [`SerialLink`]: a duplex channel with blocking send/receive and clear
//!
//! Every exchange is strict lock-step with no length prefix. The sequence
//! tag and check byte do not add retransmission; they turn a lost, repeated
//! or corrupted byte into an explicit [`LinkError`] instead of a silent
//! deadlock.

pub mod codec;
pub mod error;
pub mod frame;
pub mod link;
pub mod token;

pub use codec::{FRAME_SIZE, LinkCodec};
pub use error::{LinkError, Result};
pub use frame::Frame;
pub use link::{SerialLink, memory_pair};
pub use token::Token;
