//! Peripheral abstraction layer for the door controller.
//!
//! Each node drives a handful of simple devices. This crate defines them as
//! narrow async traits and ships mock implementations so that both nodes
//! run and test without hardware.
//!
//! # Devices
//!
//! | Trait | Node | Reference hardware |
//! |---|---|---|
//! | [`KeypadDevice`] | interface | 4×4 matrix keypad |
//! | [`DisplayDevice`] | interface | 2×16 character LCD |
//! | [`MotorDevice`] | control | DC motor through an H-bridge |
//! | [`BuzzerDevice`] | control | alarm buzzer |
//! | [`MotionSensor`] | control | PIR occupancy sensor |
//! | [`PersistentStorage`] | control | external EEPROM |
//!
//! Both nodes also own a [`OneShotTimer`], which stands in for the hardware
//! compare timer driving the timed phases.
//!
//! # Design
//!
//! - **Async-first**: all I/O uses native `async fn` in traits (Rust 1.90 +
//!   Edition 2024 RPITIT).
//! - **Thread-safe**: all traits require `Send + Sync` for use with Tokio.
//! - **Error-aware**: every operation returns [`Result<T>`].
//!
//! # Example
//!
//! ```no_run
//! use doorkey_hardware::traits::{KeypadDevice, KeypadInput};
//! use doorkey_hardware::Result;
//!
//! async fn read_digits<K: KeypadDevice>(keypad: &mut K) -> Result<Vec<u8>> {
//!     let mut digits = Vec::new();
//!     loop {
//!         match keypad.read_input().await? {
//!             KeypadInput::Digit(d) => digits.push(d),
//!             KeypadInput::Enter => return Ok(digits),
//!             _ => {}
//!         }
//!     }
//! }
//! ```

pub mod error;
pub mod mock;
pub mod timer;
pub mod traits;

pub use error::{HardwareError, Result};
pub use timer::OneShotTimer;
pub use traits::{
    BuzzerDevice, DisplayDevice, KeypadDevice, KeypadInput, MotionSensor, MotorDevice,
    MotorDirection, PersistentStorage,
};
