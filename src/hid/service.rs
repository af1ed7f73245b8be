//! Polling service loop — bridges the transport, the clock and the
//! engine.
//!
//! Frames are handled strictly one at a time in arrival order; between
//! arrivals the loop checks the reassembly deadline. This is the single
//! mutator thread of control the protocol core assumes — there is no
//! finer-grained locking anywhere below it.
//!
//! ```text
//!   loop {
//!       deadline check ──▶ engine.poll(now)      ──▶ send reports
//!       recv(slice)    ──▶ engine.handle_report  ──▶ send reports
//!   }
//! ```

use log::warn;

use crate::app::ports::CommandPort;
use crate::error::{Result, TransportError};

use super::dispatch::{HidEngine, Reply};
use super::transport::HidTransport;

/// How long one `recv` call may block before the loop re-checks the
/// reassembly deadline. Short enough that a timeout error frame is
/// never late by a visible amount.
const POLL_SLICE_MS: u32 = 10;

/// Drives a [`HidEngine`] from a physical transport.
pub struct HidService<T, A> {
    engine: HidEngine,
    transport: T,
    app: A,
}

impl<T: HidTransport, A: CommandPort> HidService<T, A> {
    pub fn new(engine: HidEngine, transport: T, app: A) -> Self {
        Self {
            engine,
            transport,
            app,
        }
    }

    /// One iteration of the service loop: check the deadline, then wait
    /// one poll slice for an inbound report and process it.
    ///
    /// `now_ms` is the caller's monotonic clock reading; the loop never
    /// reads time itself, which keeps it testable and portable.
    pub fn poll_once(&mut self, now_ms: u64) -> Result<()> {
        if let Some(reply) = self.engine.poll(now_ms) {
            self.send_reply(&reply)?;
        }

        let report = self
            .transport
            .recv(POLL_SLICE_MS)
            .map_err(|e| transport_err("recv", &e))?;

        if let Some(report) = report {
            if let Some(reply) = self.engine.handle_report(now_ms, &report, &mut self.app) {
                self.send_reply(&reply)?;
            }
        }
        Ok(())
    }

    /// Access the engine (capability queries, tests).
    pub fn engine(&self) -> &HidEngine {
        &self.engine
    }

    /// Access the transport (tests inspect scripted transports).
    pub fn transport_ref(&self) -> &T {
        &self.transport
    }

    fn send_reply(&mut self, reply: &Reply) -> Result<()> {
        for report in reply.reports() {
            self.transport
                .send(&report)
                .map_err(|e| transport_err("send", &e))?;
        }
        Ok(())
    }
}

fn transport_err(op: &str, err: &impl core::fmt::Debug) -> crate::error::Error {
    warn!("HID transport {op} failed: {err:?}");
    TransportError::Io.into()
}
