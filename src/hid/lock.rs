//! Exclusive channel lock.
//!
//! One channel may claim the device for a few seconds so a multi-step
//! exchange is not interleaved with other hosts' traffic. The claim is
//! a lease: every successfully dispatched message from the owner renews
//! it for the originally requested duration, and it decays through
//! inactivity. INIT is never subject to the lock, so new channels can
//! always be negotiated while one host holds the device.

use log::info;

/// The single device-wide lock slot.
pub struct ChannelLock {
    lease: Option<Lease>,
}

#[derive(Clone, Copy)]
struct Lease {
    owner: u32,
    duration_ms: u64,
    deadline_ms: u64,
}

impl ChannelLock {
    pub fn new() -> Self {
        Self { lease: None }
    }

    /// Apply a LOCK request from `cid` for `seconds` (0 = unlock).
    ///
    /// Returns `false` when a live lock held by another channel blocks
    /// the request; the dispatcher answers such callers with
    /// `ChannelBusy`.
    pub fn try_begin(&mut self, cid: u32, seconds: u8, now_ms: u64) -> bool {
        match self.live(now_ms) {
            Some(lease) if lease.owner != cid => false,
            _ if seconds == 0 => {
                // Unlock is only meaningful from the owner; from anyone
                // else on an idle lock it is a no-op.
                if self.lease.is_some_and(|l| l.owner == cid) {
                    info!("HID[{cid:08x}]: lock released");
                    self.lease = None;
                }
                true
            }
            _ => {
                let duration_ms = u64::from(seconds) * 1000;
                info!("HID[{cid:08x}]: lock held for {seconds}s");
                self.lease = Some(Lease {
                    owner: cid,
                    duration_ms,
                    deadline_ms: now_ms + duration_ms,
                });
                true
            }
        }
    }

    /// True when a live lock owned by a different channel exists.
    pub fn is_blocked(&self, cid: u32, now_ms: u64) -> bool {
        self.live(now_ms).is_some_and(|lease| lease.owner != cid)
    }

    /// Renew the lease after a successfully dispatched owner message.
    pub fn refresh(&mut self, cid: u32, now_ms: u64) {
        if let Some(lease) = &mut self.lease {
            if lease.owner == cid && now_ms < lease.deadline_ms {
                lease.deadline_ms = now_ms + lease.duration_ms;
            }
        }
    }

    fn live(&self, now_ms: u64) -> Option<Lease> {
        self.lease.filter(|lease| now_ms < lease.deadline_ms)
    }
}

// ── Tests ────────────────────────────────────────────────────
