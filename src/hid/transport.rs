//! Physical transport abstraction — one 64-byte report at a time.
//!
//! Concrete implementations on the device side:
//! - USB HID interrupt endpoints (the production path)
//! - UHID / hidraw bridges for host-side integration testing
//!
//! The engine and service loop are generic over `HidTransport`, so a
//! new physical layer requires zero changes to the protocol logic.

use super::Report;

/// Report-oriented transport channel.
pub trait HidTransport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Send one report to the host.
    fn send(&mut self, report: &Report) -> Result<(), Self::Error>;

    /// Wait up to `timeout_ms` for one report from the host.
    /// Returns `Ok(None)` when the window lapses with no traffic.
    fn recv(&mut self, timeout_ms: u32) -> Result<Option<Report>, Self::Error>;
}

/// A transport that discards all writes and never produces a report.
/// Useful as a default while no host is attached.
pub struct NullTransport;

impl HidTransport for NullTransport {
    type Error = ();

    fn send(&mut self, _report: &Report) -> Result<(), ()> {
        Ok(())
    }

    fn recv(&mut self, _timeout_ms: u32) -> Result<Option<Report>, ()> {
        Ok(None)
    }
}
