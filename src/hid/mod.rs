//! HID transport stack — framing, multiplexing, arbitration.
//!
//! The device talks to hosts through fixed 64-byte HID reports. Many
//! logical channels share that one pipe; the stack below keeps them
//! honest:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     HID Transport Stack                     │
//! │                                                             │
//! │  ┌───────────┐   ┌───────┐   ┌────────────┐   ┌─────────┐  │
//! │  │ Transport │──▶│ Frame │──▶│ Reassembly │──▶│ Engine  │  │
//! │  │ (trait)   │   │ codec │   │ + Lock     │   │ dispatch│  │
//! │  └───────────┘   └───────┘   └────────────┘   └────┬────┘  │
//! │        ▲                                           │       │
//! │        │         ┌────────────┐                    │       │
//! │        └─────────│ Fragmenter │◀───────────────────┘       │
//! │                  └────────────┘        Reply               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The whole device owns **one** pending inbound transfer and **one**
//! lock, system-wide. That is the resource model, not a shortcut: a
//! host cannot exhaust device memory with interleaved partial messages,
//! and contention resolves through `ChannelBusy` replies and timeouts
//! instead of queues.

pub mod channel;
pub mod dispatch;
pub mod fragment;
pub mod frame;
pub mod lock;
pub mod reassembly;
pub mod service;
pub mod transport;

pub use dispatch::{HidEngine, Reply};
pub use frame::{Command, ErrorCode, Frame, Report};
pub use service::HidService;
pub use transport::HidTransport;

// ── Wire constants ───────────────────────────────────────────

/// Size of one physical HID report.
pub const REPORT_SIZE: usize = 64;

/// Payload capacity of an initial report (4 cid + 1 cmd + 2 count).
pub const INIT_PAYLOAD: usize = REPORT_SIZE - 7;

/// Payload capacity of a continuation report (4 cid + 1 seq).
pub const CONT_PAYLOAD: usize = REPORT_SIZE - 5;

/// Highest continuation sequence number (7-bit field).
pub const MAX_SEQ: u8 = 0x7F;

/// Longest accepted message: one initial report plus the full run of
/// 128 continuation reports the sequence field can address.
pub const MAX_MSG_LEN: usize = INIT_PAYLOAD + (MAX_SEQ as usize + 1) * CONT_PAYLOAD;

/// Channel id reserved for INIT negotiation.
pub const BROADCAST_CID: u32 = 0xFFFF_FFFF;

/// Channel id 0 is never valid on the wire.
pub const RESERVED_CID: u32 = 0;

/// Nonce length carried by an INIT request and echoed in its reply.
pub const INIT_NONCE_LEN: usize = 8;

/// Protocol interface version reported in the INIT reply.
pub const IF_VERSION: u8 = 2;

/// Capability flag: device implements WINK.
pub const CAP_WINK: u8 = 0x01;

/// Capability flag: device implements LOCK.
pub const CAP_LOCK: u8 = 0x02;
