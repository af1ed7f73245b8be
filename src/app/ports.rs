//! Port traits — the boundary between the transport core and the rest
//! of the firmware.
//!
//! ```text
//!   HID engine ──▶ CommandPort    (application command handler)
//!   HID engine ──▶ SecureStorePort (crypto EEPROM service)
//! ```
//!
//! The engine consumes these via generics or trait objects, so the
//! protocol core never contains application or storage logic. Test
//! suites substitute recording mocks.

use heapless::Vec;

use crate::hid::MAX_MSG_LEN;

// ───────────────────────────────────────────────────────────────
// Application command port (driven adapter: transport → application)
// ───────────────────────────────────────────────────────────────

/// Opaque application command handler.
///
/// The transport core delivers every fully reassembled message whose
/// command byte it does not handle itself (framing-level PING, INIT,
/// LOCK) and transports the opaque reply back to the host. Payload
/// *meaning* — signing, registration, attestation — lives entirely
/// behind this port.
pub trait CommandPort {
    /// Handle a complete message on `channel`.
    ///
    /// Returns the reply payload, or [`AppError::Unsupported`] when the
    /// command byte is not recognized (the transport answers the host
    /// with an `InvalidCmd` error frame).
    fn handle(
        &mut self,
        channel: u32,
        command: u8,
        payload: &[u8],
    ) -> Result<Vec<u8, MAX_MSG_LEN>, AppError>;

    /// Perform the WINK identification side effect (blink, buzz, …).
    ///
    /// Only invoked when the device advertises the wink capability.
    fn wink(&mut self, channel: u32);
}

/// Errors from [`CommandPort::handle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppError {
    /// The command byte is not implemented by this application.
    Unsupported,
}

impl core::fmt::Display for AppError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unsupported => write!(f, "command not supported"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Crypto EEPROM port (driven adapter: transport ↔ secure storage)
// ───────────────────────────────────────────────────────────────

/// Byte-addressed secure storage — the crypto EEPROM service.
///
/// The real device fronts an AES-132-class crypto EEPROM holding keys,
/// counters and device configuration. The transport core only needs the
/// raw read/write/CRC surface; zone policy and I2C framing stay inside
/// the driver.
pub trait SecureStorePort {
    /// Read `buf.len()` bytes starting at `addr`.
    fn read(&self, addr: u32, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Write `data` starting at `addr`. Writes are atomic per call.
    fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), StorageError>;

    /// CRC-16 over `data`, as used to guard EEPROM I/O blocks.
    ///
    /// The default is the polynomial the device's EEPROM driver computes
    /// in software (0x8005, bit-reflected, zero init); hardware drivers
    /// may override with the peripheral's own engine.
    fn crc(&self, data: &[u8]) -> u16 {
        let mut crc: u16 = 0;
        for &byte in data {
            crc ^= u16::from(byte);
            for _ in 0..8 {
                if crc & 1 != 0 {
                    crc = (crc >> 1) ^ 0xA001;
                } else {
                    crc >>= 1;
                }
            }
        }
        crc
    }
}

/// Errors from [`SecureStorePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The address range falls outside the addressable zone.
    OutOfRange,
    /// The device rejected or failed the write.
    WriteFailed,
    /// Generic bus/I/O error.
    Io,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfRange => write!(f, "address out of range"),
            Self::WriteFailed => write!(f, "write failed"),
            Self::Io => write!(f, "I/O error"),
        }
    }
}
