//! Deterministic per-draw and caller-held RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each draw of a batch gets its own independent `SmallRng` seeded by:
//!
//!   seed = batch_seed XOR (draw_index * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive draw indices uniformly across the seed space.
//! This means:
//!
//! - Draws never share RNG state (no contention, no ordering dependency).
//! - A batch is bit-identical whether it runs serially or on any number of
//!   worker threads, and the first `m` draws of an `n`-draw batch equal an
//!   `m`-draw batch with the same seed.
//! - All RNG calls are local to the owning thread; no synchronisation needed.
//!
//! `SmallRng` output is reproducible for a fixed `rand` version and
//! platform word size; it is not a cross-platform stream guarantee.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::DrawId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── DrawRng ───────────────────────────────────────────────────────────────────

/// Per-draw deterministic RNG.
///
/// The type is `!Sync` to prevent accidental sharing across threads; each
/// Rayon work item creates its own.
pub struct DrawRng(SmallRng);

impl DrawRng {
    /// Seed deterministically from the batch seed and a draw index.
    pub fn new(batch_seed: u64, draw: DrawId) -> Self {
        let seed = batch_seed ^ draw.0.wrapping_mul(MIXING_CONSTANT);
        DrawRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand`/`rand_distr`
    /// distribution types (`dist.sample(rng.inner())`).
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Caller-held RNG state from which batch seeds are taken.
///
/// Re-invoking a sampler with a `SimRng` in the same state reproduces the
/// batch; each call advances the state so consecutive batches differ.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Draw the seed for the next batch.
    pub fn next_seed(&mut self) -> u64 {
        self.0.r#gen::<u64>()
    }
}
