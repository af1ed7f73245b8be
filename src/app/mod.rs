//! Application boundary — port traits only, zero I/O.
//!
//! The transport core never interprets message content and never touches
//! the crypto EEPROM directly. Both collaborators sit behind **port
//! traits** defined in [`ports`], keeping the protocol layer fully
//! testable without real firmware around it.

pub mod ports;
