//! In-memory crypto EEPROM simulation.
//!
//! Stands in for the AES-132-class secure EEPROM during host testing:
//! a flat 4 KB user zone with the same read/write/CRC surface the real
//! driver exposes. Keys and counters never pass through the transport
//! core, so a byte array is a faithful substitute here.

use crate::app::ports::{SecureStorePort, StorageError};

/// Size of the simulated user zone.
pub const EEPROM_SIZE: usize = 4096;

/// Volatile stand-in for the secure EEPROM.
pub struct InMemoryEeprom {
    mem: [u8; EEPROM_SIZE],
}

impl Default for InMemoryEeprom {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEeprom {
    /// A blank (all-0xFF, erased-state) EEPROM.
    pub fn new() -> Self {
        Self {
            mem: [0xFF; EEPROM_SIZE],
        }
    }

    fn span(&self, addr: u32, len: usize) -> Result<core::ops::Range<usize>, StorageError> {
        let start = addr as usize;
        let end = start.checked_add(len).ok_or(StorageError::OutOfRange)?;
        if end > EEPROM_SIZE {
            return Err(StorageError::OutOfRange);
        }
        Ok(start..end)
    }
}

impl SecureStorePort for InMemoryEeprom {
    fn read(&self, addr: u32, buf: &mut [u8]) -> Result<(), StorageError> {
        let span = self.span(addr, buf.len())?;
        buf.copy_from_slice(&self.mem[span]);
        Ok(())
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), StorageError> {
        let span = self.span(addr, data.len())?;
        self.mem[span].copy_from_slice(data);
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────
