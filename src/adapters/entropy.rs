//! Startup entropy for channel-id generation.
//!
//! Channel ids need collision avoidance, not cryptographic strength, so
//! a 64-bit process seed is enough to start the registry's PRNG. On the
//! device this comes from the hardware RNG; on the host we derive it
//! from the standard library's per-process hasher randomness, which
//! needs no extra dependency.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};

/// A 64-bit seed that differs between processes and between calls.
pub fn host_seed() -> u64 {
    RandomState::new().build_hasher().finish()
}
