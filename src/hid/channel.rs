//! Channel id allocation.
//!
//! Channel ids are anti-collision discriminators, not secrets: any
//! non-reserved 32-bit value works as long as two live hosts are
//! overwhelmingly unlikely to share one. A small PRNG seeded once at
//! startup plus a re-roll against recently issued ids covers that; no
//! cryptographic strength is required.

use heapless::FnvIndexSet;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::{BROADCAST_CID, RESERVED_CID};

/// How many previously issued ids the registry remembers for re-roll.
/// Must be a power of two (index-set requirement).
const ISSUED_HISTORY: usize = 16;

/// Bound on re-rolls before giving up on history avoidance. With a
/// 32-bit space and 16 remembered ids this is unreachable in practice.
const REROLL_LIMIT: usize = 64;

/// Allocates fresh channel ids for broadcast INIT requests.
pub struct ChannelRegistry {
    rng: SmallRng,
    issued: FnvIndexSet<u32, ISSUED_HISTORY>,
}

impl ChannelRegistry {
    /// Create a registry from a startup entropy seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            issued: FnvIndexSet::new(),
        }
    }

    /// Generate a fresh channel id: never 0, never broadcast, and
    /// re-rolled against the remembered history.
    pub fn allocate(&mut self) -> u32 {
        let mut cid = self.roll();
        for _ in 0..REROLL_LIMIT {
            if !self.issued.contains(&cid) {
                break;
            }
            cid = self.roll();
        }

        if self.issued.insert(cid).is_err() {
            // History full — forget the oldest generation wholesale.
            self.issued.clear();
            let _ = self.issued.insert(cid);
        }
        cid
    }

    fn roll(&mut self) -> u32 {
        loop {
            let cid: u32 = self.rng.random();
            if cid != RESERVED_CID && cid != BROADCAST_CID {
                return cid;
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────
