//! Device configuration parameters.
//!
//! All tunable parameters of the HID transport core. Values persist in
//! the crypto EEPROM user zone as a CRC-guarded `postcard` blob; a
//! missing or corrupt blob falls back to [`TokenConfig::default`].

use serde::{Deserialize, Serialize};

use crate::app::ports::{SecureStorePort, StorageError};

/// EEPROM user-zone address of the configuration blob.
pub const CONFIG_ADDR: u32 = 0x0100;

/// Maximum serialized size of the blob, header included.
const CONFIG_BLOB_MAX: usize = 32;

/// Core device configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    // --- Identity ---
    /// Firmware version reported in the INIT reply (major).
    pub version_major: u8,
    /// Firmware version reported in the INIT reply (minor).
    pub version_minor: u8,
    /// Firmware version reported in the INIT reply (build).
    pub version_build: u8,

    // --- Capabilities ---
    /// Device performs the WINK identification side effect.
    pub wink_supported: bool,
    /// Device honors channel LOCK requests.
    pub lock_supported: bool,

    // --- Timing ---
    /// Reassembly deadline for a multi-report message (milliseconds).
    pub msg_timeout_ms: u32,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            version_major: 0,
            version_minor: 2,
            version_build: 0,

            wink_supported: true,
            lock_supported: true,

            msg_timeout_ms: 500,
        }
    }
}

impl TokenConfig {
    /// Capability bitflags as advertised in the INIT reply.
    pub fn capabilities(&self) -> u8 {
        let mut caps = 0;
        if self.wink_supported {
            caps |= crate::hid::CAP_WINK;
        }
        if self.lock_supported {
            caps |= crate::hid::CAP_LOCK;
        }
        caps
    }

    /// Range-check the configuration.
    ///
    /// The reassembly deadline must stay within the protocol's observable
    /// window: long enough that a slow host can keep a transfer alive,
    /// short enough that an abandoned transfer reports its timeout within
    /// one second.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.msg_timeout_ms < 100 || self.msg_timeout_ms > 1000 {
            return Err("msg_timeout_ms outside 100..=1000");
        }
        Ok(())
    }

    /// Load the configuration from the crypto EEPROM.
    ///
    /// Returns defaults when the blob is absent, fails its CRC, fails to
    /// decode, or fails validation — the device must come up usable with
    /// a blank or scrambled EEPROM.
    pub fn load(store: &dyn SecureStorePort) -> Self {
        let mut blob = [0u8; CONFIG_BLOB_MAX];
        if store.read(CONFIG_ADDR, &mut blob).is_err() {
            return Self::default();
        }

        let len = blob[0] as usize;
        if len == 0 || len > CONFIG_BLOB_MAX - 3 {
            return Self::default();
        }
        let stored_crc = u16::from_le_bytes([blob[1], blob[2]]);
        let body = &blob[3..3 + len];
        if store.crc(body) != stored_crc {
            log::warn!("config: CRC mismatch, using defaults");
            return Self::default();
        }

        match postcard::from_bytes::<Self>(body) {
            Ok(cfg) if cfg.validate().is_ok() => cfg,
            _ => {
                log::warn!("config: stored blob invalid, using defaults");
                Self::default()
            }
        }
    }

    /// Persist the configuration to the crypto EEPROM.
    pub fn save(&self, store: &mut dyn SecureStorePort) -> Result<(), StorageError> {
        let mut blob = [0u8; CONFIG_BLOB_MAX];
        let len = {
            let body = postcard::to_slice(self, &mut blob[3..]).map_err(|_| StorageError::Io)?;
            body.len()
        };
        blob[0] = len as u8;
        let crc = store.crc(&blob[3..3 + len]);
        blob[1..3].copy_from_slice(&crc.to_le_bytes());
        store.write(CONFIG_ADDR, &blob[..3 + len])
    }
}
