//! HID report codec.
//!
//! Wire format of one 64-byte report:
//!
//! ```text
//! ┌──────────────┬──────────┬────────────┬───────────────────────┐
//! │ Channel (4B) │ CMD/SEQ  │ Count (2B) │ Payload (zero-padded) │
//! │ LE u32       │ 1B       │ BE u16 *   │                       │
//! └──────────────┴──────────┴────────────┴───────────────────────┘
//!                            * initial reports only
//! ```
//!
//! Byte 4 distinguishes the two report kinds: bit 7 set marks an
//! initial report whose lower 7 bits are the command; bit 7 clear marks
//! a continuation whose lower 7 bits are the sequence number. Decoding
//! is purely structural — with a fixed report size there is no
//! truncated-input failure mode.

use super::{BROADCAST_CID, CONT_PAYLOAD, INIT_PAYLOAD, REPORT_SIZE};

/// One physical transport unit.
pub type Report = [u8; REPORT_SIZE];

/// Initial-report marker bit in byte 4.
const TYPE_INIT: u8 = 0x80;

// ── Commands ─────────────────────────────────────────────────

/// Command bytes the transport layer knows about.
///
/// Anything else — `Msg` included — is opaque to this layer and is
/// carried to the application port once reassembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    /// Echo transaction, handled in the transport layer.
    Ping = 0x01,
    /// Encapsulated application message (opaque payload).
    Msg = 0x03,
    /// Place or release an exclusive channel lock.
    Lock = 0x04,
    /// Allocate a new channel id or synchronize an existing one.
    Init = 0x06,
    /// Ask the device to identify itself visually.
    Wink = 0x08,
    /// Error reply (outbound only).
    Error = 0x3F,
}

impl TryFrom<u8> for Command {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0x01 => Ok(Command::Ping),
            0x03 => Ok(Command::Msg),
            0x04 => Ok(Command::Lock),
            0x06 => Ok(Command::Init),
            0x08 => Ok(Command::Wink),
            0x3F => Ok(Command::Error),
            other => Err(other),
        }
    }
}

impl From<Command> for u8 {
    fn from(cmd: Command) -> Self {
        cmd as u8
    }
}

// ── Error codes ──────────────────────────────────────────────

/// Single-byte payload of an `ERROR` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    /// Command byte not implemented.
    InvalidCmd = 0x01,
    /// Declared message length exceeds the maximum.
    InvalidLen = 0x03,
    /// Continuation arrived out of order.
    InvalidSeq = 0x04,
    /// Reassembly deadline exceeded.
    MsgTimeout = 0x05,
    /// Another channel owns the pending transfer or the lock.
    ChannelBusy = 0x06,
    /// Channel id 0, or a non-INIT command on the broadcast channel.
    InvalidCid = 0x0B,
}

// ── Decoding ─────────────────────────────────────────────────

/// Decoded view of one report. Payload slices borrow from the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame<'a> {
    /// First report of a message.
    Init {
        cid: u32,
        /// Command byte (lower 7 bits of byte 4).
        cmd: u8,
        /// Declared total message length.
        total_len: usize,
        /// The part of the message this report carries.
        payload: &'a [u8],
    },
    /// Follow-up report of an in-progress message.
    Cont {
        cid: u32,
        seq: u8,
        /// Full continuation capacity; the reassembler takes what the
        /// declared length still needs.
        payload: &'a [u8],
    },
}

impl<'a> Frame<'a> {
    /// Decode a report. Structural only — never fails.
    pub fn parse(report: &'a Report) -> Self {
        let cid = u32::from_le_bytes([report[0], report[1], report[2], report[3]]);
        if report[4] & TYPE_INIT != 0 {
            let total_len = usize::from(u16::from_be_bytes([report[5], report[6]]));
            let carried = total_len.min(INIT_PAYLOAD);
            Frame::Init {
                cid,
                cmd: report[4] & !TYPE_INIT,
                total_len,
                payload: &report[7..7 + carried],
            }
        } else {
            Frame::Cont {
                cid,
                seq: report[4],
                payload: &report[5..],
            }
        }
    }

    /// Channel id of either report kind.
    pub fn cid(&self) -> u32 {
        match self {
            Frame::Init { cid, .. } | Frame::Cont { cid, .. } => *cid,
        }
    }

    /// True when addressed to the broadcast channel.
    pub fn is_broadcast(&self) -> bool {
        self.cid() == BROADCAST_CID
    }
}

// ── Encoding ─────────────────────────────────────────────────

/// Build an initial report. `chunk` is the leading part of the message
/// and must fit the initial-report capacity.
pub fn encode_init(cid: u32, cmd: u8, total_len: usize, chunk: &[u8]) -> Report {
    debug_assert!(chunk.len() <= INIT_PAYLOAD);
    let mut report = [0u8; REPORT_SIZE];
    report[0..4].copy_from_slice(&cid.to_le_bytes());
    report[4] = cmd | TYPE_INIT;
    report[5..7].copy_from_slice(&(total_len as u16).to_be_bytes());
    report[7..7 + chunk.len()].copy_from_slice(chunk);
    report
}

/// Build a continuation report carrying `chunk` at sequence `seq`.
pub fn encode_cont(cid: u32, seq: u8, chunk: &[u8]) -> Report {
    debug_assert!(chunk.len() <= CONT_PAYLOAD);
    debug_assert!(seq & TYPE_INIT == 0);
    let mut report = [0u8; REPORT_SIZE];
    report[0..4].copy_from_slice(&cid.to_le_bytes());
    report[4] = seq;
    report[5..5 + chunk.len()].copy_from_slice(chunk);
    report
}

// ── Tests ────────────────────────────────────────────────────
