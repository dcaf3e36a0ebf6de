//! In-memory persistent storage.
//!
//! Sized and initialised like a blank 1 KiB EEPROM (every byte `0xFF`).
//! Faults can be injected to exercise write verification.

use tracing::trace;

use crate::{HardwareError, Result, traits::PersistentStorage};

/// Capacity of the reference device's EEPROM.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Value of an erased cell.
const ERASED: u8 = 0xFF;

/// Injected storage fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageFault {
    #[default]
    None,
    /// Every write returns an error.
    FailWrites,
    /// Writes report success but leave the cells untouched.
    DropWrites,
}

#[derive(Debug, Clone)]
pub struct MockStorage {
    memory: Vec<u8>,
    fault: StorageFault,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            memory: vec![ERASED; capacity],
            fault: StorageFault::None,
        }
    }

    pub fn with_fault(mut self, fault: StorageFault) -> Self {
        self.fault = fault;
        self
    }

    pub fn set_fault(&mut self, fault: StorageFault) {
        self.fault = fault;
    }

    /// Raw view of `len` bytes at `address`, if in range.
    pub fn peek(&self, address: u16, len: usize) -> Option<&[u8]> {
        let start = usize::from(address);
        self.memory.get(start..start.checked_add(len)?)
    }

    fn range(&self, address: u16, len: usize) -> Result<std::ops::Range<usize>> {
        let start = usize::from(address);
        let end = start
            .checked_add(len)
            .filter(|end| *end <= self.memory.len())
            .ok_or_else(|| {
                HardwareError::storage(
                    address,
                    format!("{len} bytes exceed capacity {}", self.memory.len()),
                )
            })?;
        Ok(start..end)
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistentStorage for MockStorage {
    async fn write_bytes(&mut self, address: u16, data: &[u8]) -> Result<()> {
        let range = self.range(address, data.len())?;
        match self.fault {
            StorageFault::FailWrites => {
                return Err(HardwareError::storage(address, "write failed"));
            }
            StorageFault::DropWrites => {
                trace!(address, len = data.len(), "Write silently dropped");
            }
            StorageFault::None => {
                self.memory[range].copy_from_slice(data);
                trace!(address, len = data.len(), "Write");
            }
        }
        Ok(())
    }

    async fn read_bytes(&mut self, address: u16, buffer: &mut [u8]) -> Result<()> {
        let range = self.range(address, buffer.len())?;
        buffer.copy_from_slice(&self.memory[range]);
        Ok(())
    }
}
