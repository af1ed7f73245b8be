//! Outbound message fragmentation.
//!
//! A reply payload becomes one initial report (carrying the total
//! length) followed by as many continuation reports as the remainder
//! needs, sequence numbers counting up from 0. The iterator yields
//! ready-to-send 64-byte reports in transmit order.

use super::frame::{encode_cont, encode_init};
use super::{CONT_PAYLOAD, INIT_PAYLOAD, MAX_MSG_LEN, Report};

/// Iterator over the reports of one outbound message.
pub struct Fragmenter<'a> {
    cid: u32,
    cmd: u8,
    payload: &'a [u8],
    offset: usize,
    next_seq: u8,
    started: bool,
}

impl<'a> Fragmenter<'a> {
    /// Fragment `payload` as command `cmd` on channel `cid`.
    pub fn new(cid: u32, cmd: u8, payload: &'a [u8]) -> Self {
        debug_assert!(payload.len() <= MAX_MSG_LEN);
        Self {
            cid,
            cmd,
            payload,
            offset: 0,
            next_seq: 0,
            started: false,
        }
    }
}

impl Iterator for Fragmenter<'_> {
    type Item = Report;

    fn next(&mut self) -> Option<Report> {
        if !self.started {
            self.started = true;
            let chunk = &self.payload[..self.payload.len().min(INIT_PAYLOAD)];
            self.offset = chunk.len();
            return Some(encode_init(self.cid, self.cmd, self.payload.len(), chunk));
        }

        if self.offset >= self.payload.len() {
            return None;
        }

        let end = (self.offset + CONT_PAYLOAD).min(self.payload.len());
        let report = encode_cont(self.cid, self.next_seq, &self.payload[self.offset..end]);
        self.offset = end;
        self.next_seq += 1;
        Some(report)
    }
}

// ── Tests ────────────────────────────────────────────────────
