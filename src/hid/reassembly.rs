//! Inbound message reassembly.
//!
//! The device owns exactly one reassembly slot. A message that fits its
//! initial report completes on the spot; anything longer parks the slot
//! in `Receiving` until the owning channel delivers every continuation
//! in sequence or the deadline lapses.
//!
//! ```text
//!            initial (fits one report)
//!   Idle ──────────────────────────────▶ complete
//!    │ initial (needs continuations)         ▲
//!    ▼                                       │ last continuation
//!   Receiving {owner, total, next_seq, deadline}
//!    │          │
//!    │ bad seq  │ deadline lapsed
//!    ▼          ▼
//!   Idle       Idle (MsgTimeout reported to owner)
//! ```
//!
//! Arbitration between channels (busy replies, the INIT exemption, the
//! same-channel abort-and-restart) is the engine's business; this module
//! only owns the slot itself.

use heapless::Vec;

use super::{MAX_MSG_LEN, MAX_SEQ};

/// A fully reassembled inbound message.
#[derive(Debug)]
pub struct Message {
    pub cid: u32,
    pub cmd: u8,
    pub payload: Vec<u8, MAX_MSG_LEN>,
}

#[derive(Clone, Copy)]
enum State {
    Idle,
    Receiving {
        cid: u32,
        cmd: u8,
        total_len: usize,
        next_seq: u8,
        deadline_ms: u64,
    },
}

/// Outcome of an initial report accepted into the slot.
#[derive(Debug)]
pub enum BeginOutcome {
    /// The whole message fit the initial report.
    Complete(Message),
    /// Continuations are required; the slot is now `Receiving`.
    Pending,
}

/// Outcome of a continuation report.
#[derive(Debug)]
pub enum ContOutcome {
    /// No transfer to continue, or the sender does not own the slot.
    /// The report is dropped without a reply.
    Ignored,
    /// Sequence mismatch from the owner; the transfer is discarded.
    BadSeq,
    /// Accepted; more continuations expected.
    Pending,
    /// Accepted and the message is complete.
    Complete(Message),
}

/// The single device-wide reassembly slot.
pub struct Reassembler {
    state: State,
    buf: Vec<u8, MAX_MSG_LEN>,
    timeout_ms: u64,
}

impl Reassembler {
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            state: State::Idle,
            buf: Vec::new(),
            timeout_ms: u64::from(timeout_ms),
        }
    }

    /// Channel currently holding the slot, if any.
    pub fn owner(&self) -> Option<u32> {
        match self.state {
            State::Idle => None,
            State::Receiving { cid, .. } => Some(cid),
        }
    }

    /// Start a message from its initial report.
    ///
    /// The caller has already verified `total_len <= MAX_MSG_LEN` and
    /// resolved slot ownership; `payload` is the portion the initial
    /// report carried.
    pub fn begin(
        &mut self,
        cid: u32,
        cmd: u8,
        total_len: usize,
        payload: &[u8],
        now_ms: u64,
    ) -> BeginOutcome {
        debug_assert!(total_len <= MAX_MSG_LEN);

        self.buf.clear();
        // Capacity is MAX_MSG_LEN; bounds hold by the precondition.
        let _ = self.buf.extend_from_slice(payload);

        if self.buf.len() >= total_len {
            self.buf.truncate(total_len);
            self.state = State::Idle;
            return BeginOutcome::Complete(Message {
                cid,
                cmd,
                payload: core::mem::take(&mut self.buf),
            });
        }

        self.state = State::Receiving {
            cid,
            cmd,
            total_len,
            next_seq: 0,
            deadline_ms: now_ms + self.timeout_ms,
        };
        BeginOutcome::Pending
    }

    /// Feed a continuation report into the slot.
    pub fn feed_cont(&mut self, cid: u32, seq: u8, payload: &[u8], now_ms: u64) -> ContOutcome {
        let State::Receiving {
            cid: owner,
            cmd,
            total_len,
            next_seq,
            ..
        } = self.state
        else {
            return ContOutcome::Ignored;
        };

        if cid != owner {
            return ContOutcome::Ignored;
        }

        if seq != next_seq {
            self.reset();
            return ContOutcome::BadSeq;
        }

        let needed = total_len - self.buf.len();
        let take = needed.min(payload.len());
        let _ = self.buf.extend_from_slice(&payload[..take]);

        if self.buf.len() >= total_len {
            self.state = State::Idle;
            return ContOutcome::Complete(Message {
                cid: owner,
                cmd,
                payload: core::mem::take(&mut self.buf),
            });
        }

        debug_assert!(next_seq < MAX_SEQ);
        self.state = State::Receiving {
            cid: owner,
            cmd,
            total_len,
            next_seq: next_seq + 1,
            deadline_ms: now_ms + self.timeout_ms,
        };
        ContOutcome::Pending
    }

    /// Deadline check. Returns the owner of a transfer that has lapsed,
    /// after resetting the slot; the caller reports `MsgTimeout` to it.
    pub fn poll_deadline(&mut self, now_ms: u64) -> Option<u32> {
        match self.state {
            State::Receiving {
                cid, deadline_ms, ..
            } if now_ms >= deadline_ms => {
                self.reset();
                Some(cid)
            }
            _ => None,
        }
    }

    /// Discard any pending transfer without a reply.
    pub fn abort(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.state = State::Idle;
        self.buf.clear();
    }
}

// ── Tests ────────────────────────────────────────────────────
