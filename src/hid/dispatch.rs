//! HID engine — arbitration and command dispatch.
//!
//! **Transport-decoupled**: the engine does not own a transport. Callers
//! feed one decoded report at a time via [`HidEngine::handle_report`]
//! and check deadlines via [`HidEngine::poll`]; both return at most one
//! logical [`Reply`], which the caller fragments onto the wire. Time is
//! an explicit millisecond timestamp on every call, so the engine never
//! sleeps and tests drive it with a fake clock.
//!
//! Every inbound report passes through the arbitration pipeline:
//!
//! 1. **Addressing** — channel 0 and non-INIT broadcast traffic are
//!    rejected with `InvalidCid` before anything else looks at them.
//! 2. **Slot ownership** — while one channel's transfer is pending,
//!    initial reports from other channels bounce with `ChannelBusy`
//!    (INIT excepted), their continuations are dropped silently, and a
//!    fresh initial report from the owner aborts-and-restarts.
//! 3. **Lock** — a completed message from a non-owner while a lock is
//!    live answers `ChannelBusy`; INIT is exempt.
//! 4. **Dispatch** — PING/WINK/LOCK/INIT are handled here; everything
//!    else is the application's, through [`CommandPort`].

use heapless::Vec;
use log::{info, warn};

use crate::app::ports::{AppError, CommandPort};
use crate::config::TokenConfig;

use super::channel::ChannelRegistry;
use super::fragment::Fragmenter;
use super::frame::{Command, ErrorCode, Frame};
use super::lock::ChannelLock;
use super::reassembly::{BeginOutcome, ContOutcome, Message, Reassembler};
use super::{BROADCAST_CID, IF_VERSION, INIT_NONCE_LEN, MAX_MSG_LEN, RESERVED_CID, Report};

// ── Reply ────────────────────────────────────────────────────

/// One logical outbound message, possibly spanning several reports.
#[derive(Debug)]
pub struct Reply {
    pub cid: u32,
    pub cmd: u8,
    pub payload: Vec<u8, MAX_MSG_LEN>,
}

impl Reply {
    fn new(cid: u32, cmd: Command, payload: &[u8]) -> Self {
        let mut buf = Vec::new();
        // Payload length is bounded by MAX_MSG_LEN on every path here.
        let _ = buf.extend_from_slice(payload);
        Self {
            cid,
            cmd: cmd.into(),
            payload: buf,
        }
    }

    fn empty(cid: u32, cmd: Command) -> Self {
        Self::new(cid, cmd, &[])
    }

    fn error(cid: u32, code: ErrorCode) -> Self {
        Self::new(cid, Command::Error, &[code as u8])
    }

    /// True for single-report `ERROR` replies.
    pub fn is_error(&self) -> bool {
        self.cmd == Command::Error.into()
    }

    /// The reports of this reply, in transmit order.
    pub fn reports(&self) -> Fragmenter<'_> {
        Fragmenter::new(self.cid, self.cmd, &self.payload)
    }
}

// ── Engine ───────────────────────────────────────────────────

/// The device-wide transport engine: one reassembly slot, one lock.
pub struct HidEngine {
    config: TokenConfig,
    registry: ChannelRegistry,
    slot: Reassembler,
    lock: ChannelLock,
}

impl HidEngine {
    /// Build an engine from a validated configuration and a startup
    /// entropy seed for channel-id generation.
    pub fn new(config: TokenConfig, seed: u64) -> Self {
        let slot = Reassembler::new(config.msg_timeout_ms);
        Self {
            config,
            registry: ChannelRegistry::new(seed),
            slot,
            lock: ChannelLock::new(),
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Process one inbound report.
    ///
    /// Returns the single reply this event produces, if any; silence is
    /// deliberate for reports the protocol ignores.
    pub fn handle_report(
        &mut self,
        now_ms: u64,
        report: &Report,
        app: &mut impl CommandPort,
    ) -> Option<Reply> {
        let reply = match Frame::parse(report) {
            Frame::Init {
                cid,
                cmd,
                total_len,
                payload,
            } => self.handle_initial(now_ms, cid, cmd, total_len, payload, app),
            Frame::Cont { cid, seq, payload } => {
                self.handle_continuation(now_ms, cid, seq, payload, app)
            }
        };

        // Any successfully dispatched message from the lock owner keeps
        // the lease alive.
        if let Some(reply) = &reply {
            if !reply.is_error() && reply.cid != BROADCAST_CID {
                self.lock.refresh(reply.cid, now_ms);
            }
        }
        reply
    }

    /// Deadline check; call on every polling opportunity.
    ///
    /// A pending transfer whose window has lapsed is discarded and its
    /// owner told `MsgTimeout`.
    pub fn poll(&mut self, now_ms: u64) -> Option<Reply> {
        let owner = self.slot.poll_deadline(now_ms)?;
        warn!("HID[{owner:08x}]: transfer timed out");
        Some(Reply::error(owner, ErrorCode::MsgTimeout))
    }

    // ── Inbound report handling ───────────────────────────────

    fn handle_initial(
        &mut self,
        now_ms: u64,
        cid: u32,
        cmd: u8,
        total_len: usize,
        payload: &[u8],
        app: &mut impl CommandPort,
    ) -> Option<Reply> {
        if cid == RESERVED_CID {
            warn!("HID: initial report on channel 0");
            return Some(Reply::error(cid, ErrorCode::InvalidCid));
        }

        if cid == BROADCAST_CID {
            // Only INIT negotiation lives on the broadcast channel.
            if Command::try_from(cmd) == Ok(Command::Init) {
                return Some(self.init_reply(cid, total_len, payload));
            }
            warn!("HID: non-INIT command {cmd:#04x} on broadcast channel");
            return Some(Reply::error(cid, ErrorCode::InvalidCid));
        }

        if let Some(owner) = self.slot.owner() {
            if owner != cid {
                // INIT on a second channel is answered immediately and
                // leaves the pending transfer undisturbed.
                if Command::try_from(cmd) == Ok(Command::Init) {
                    return Some(self.init_reply(cid, total_len, payload));
                }
                return Some(Reply::error(cid, ErrorCode::ChannelBusy));
            }
            // The owner starting over cancels its own transfer without
            // an error round-trip.
            info!("HID[{cid:08x}]: transfer restarted by new initial report");
            self.slot.abort();
        }

        if total_len > MAX_MSG_LEN {
            warn!("HID[{cid:08x}]: declared length {total_len} exceeds {MAX_MSG_LEN}");
            return Some(Reply::error(cid, ErrorCode::InvalidLen));
        }

        match self.slot.begin(cid, cmd, total_len, payload, now_ms) {
            BeginOutcome::Complete(msg) => Some(self.dispatch(now_ms, msg, app)),
            BeginOutcome::Pending => None,
        }
    }

    fn handle_continuation(
        &mut self,
        now_ms: u64,
        cid: u32,
        seq: u8,
        payload: &[u8],
        app: &mut impl CommandPort,
    ) -> Option<Reply> {
        match self.slot.feed_cont(cid, seq, payload, now_ms) {
            ContOutcome::Ignored | ContOutcome::Pending => None,
            ContOutcome::BadSeq => {
                warn!("HID[{cid:08x}]: out-of-order continuation (seq {seq})");
                Some(Reply::error(cid, ErrorCode::InvalidSeq))
            }
            ContOutcome::Complete(msg) => Some(self.dispatch(now_ms, msg, app)),
        }
    }

    // ── Completed-message dispatch ────────────────────────────

    fn dispatch(&mut self, now_ms: u64, msg: Message, app: &mut impl CommandPort) -> Reply {
        let Message { cid, cmd, payload } = msg;

        match Command::try_from(cmd) {
            // INIT on an established channel re-synchronizes it; never
            // blocked by the lock.
            Ok(Command::Init) => self.init_reply(cid, payload.len(), &payload),

            _ if self.lock.is_blocked(cid, now_ms) => {
                warn!("HID[{cid:08x}]: command {cmd:#04x} blocked by channel lock");
                Reply::error(cid, ErrorCode::ChannelBusy)
            }

            Ok(Command::Ping) => {
                info!("HID[{cid:08x}]: PING {} bytes", payload.len());
                Reply::new(cid, Command::Ping, &payload)
            }

            Ok(Command::Wink) => {
                if !self.config.wink_supported {
                    return Reply::error(cid, ErrorCode::InvalidCmd);
                }
                if !payload.is_empty() {
                    return Reply::error(cid, ErrorCode::InvalidLen);
                }
                info!("HID[{cid:08x}]: WINK");
                app.wink(cid);
                Reply::empty(cid, Command::Wink)
            }

            Ok(Command::Lock) => {
                if !self.config.lock_supported {
                    return Reply::error(cid, ErrorCode::InvalidCmd);
                }
                if payload.len() != 1 {
                    return Reply::error(cid, ErrorCode::InvalidLen);
                }
                if !self.lock.try_begin(cid, payload[0], now_ms) {
                    return Reply::error(cid, ErrorCode::ChannelBusy);
                }
                Reply::empty(cid, Command::Lock)
            }

            // Everything else is application traffic, MSG included.
            Ok(Command::Msg | Command::Error) | Err(_) => {
                match app.handle(cid, cmd, &payload) {
                    Ok(reply_payload) => {
                        info!(
                            "HID[{cid:08x}]: command {cmd:#04x} handled, {} byte reply",
                            reply_payload.len()
                        );
                        Reply {
                            cid,
                            cmd,
                            payload: reply_payload,
                        }
                    }
                    Err(AppError::Unsupported) => {
                        warn!("HID[{cid:08x}]: unknown command {cmd:#04x}");
                        Reply::error(cid, ErrorCode::InvalidCmd)
                    }
                }
            }
        }
    }

    /// Build the INIT reply for `addressed` (possibly broadcast).
    ///
    /// Payload: echoed nonce, assigned channel id, interface version,
    /// firmware version triple, capability flags.
    fn init_reply(&mut self, addressed: u32, nonce_len: usize, nonce: &[u8]) -> Reply {
        if nonce_len != INIT_NONCE_LEN {
            warn!("HID[{addressed:08x}]: INIT nonce of {nonce_len} bytes");
            return Reply::error(addressed, ErrorCode::InvalidLen);
        }

        let assigned = if addressed == BROADCAST_CID {
            let fresh = self.registry.allocate();
            info!("HID: INIT allocated channel {fresh:08x}");
            fresh
        } else {
            info!("HID[{addressed:08x}]: INIT re-sync");
            addressed
        };

        let mut payload = Vec::new();
        let _ = payload.extend_from_slice(&nonce[..INIT_NONCE_LEN]);
        let _ = payload.extend_from_slice(&assigned.to_le_bytes());
        let _ = payload.extend_from_slice(&[
            IF_VERSION,
            self.config.version_major,
            self.config.version_minor,
            self.config.version_build,
            self.config.capabilities(),
        ]);
        Reply {
            cid: addressed,
            cmd: Command::Init.into(),
            payload,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────
