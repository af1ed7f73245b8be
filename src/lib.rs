//! AuthFob firmware transport core.
//!
//! The HID transport layer of the AuthFob security key: report framing,
//! channel multiplexing, message reassembly, lock arbitration and
//! response fragmentation. Application command handling, the crypto
//! EEPROM and the physical USB transport are consumed through port
//! traits, so the whole protocol core runs and is tested on the host.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod hid;
