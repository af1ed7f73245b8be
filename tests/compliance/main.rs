//! HID transport compliance suite.
//!
//! Drives the engine exactly the way a host drives the device: one
//! 64-byte report at a time, with an explicit fake clock instead of
//! wall-time sleeps. These tests are the normative description of the
//! framing, arbitration and timeout behavior — if one of them changes,
//! host compatibility changes.


mod channel_tests;
mod lock_tests;
