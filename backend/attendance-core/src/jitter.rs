// src/jitter.rs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::schedule::NormalizedSlot;

/// Source of jitter draws. Implementations must return a value in `[1, max]`
/// for any `max >= 1`; callers never ask for a draw with `max == 0`.
pub trait JitterSource {
    fn draw(&mut self, max: u32) -> u32;
}

/// Production jitter backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngJitter<R: Rng> {
    rng: R,
}

impl<R: Rng> RngJitter<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngJitter<StdRng> {
    /// Seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible sequence, for tests and `--seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> JitterSource for RngJitter<R> {
    fn draw(&mut self, max: u32) -> u32 {
        self.rng.gen_range(1..=max)
    }
}

impl<J: JitterSource + ?Sized> JitterSource for &mut J {
    fn draw(&mut self, max: u32) -> u32 {
        (**self).draw(max)
    }
}

/// One day's worth of jitter offsets, one per slot position.
///
/// Slot `i` has its start shifted by `offsets[i]` and its end shifted by
/// `offsets[n - 1 - i]`. With a single slot both edges move together, and the
/// first slot's start always moves by the same amount as the last slot's end,
/// so the overall working window keeps its length while no timestamp repeats
/// day after day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JitterPlan {
    offsets: Vec<u32>,
}

impl JitterPlan {
    /// Draws `total_slots` offsets in `[1, entropy_minutes]`. An entropy of
    /// zero draws nothing and every offset is zero.
    pub fn draw<J: JitterSource + ?Sized>(
        source: &mut J,
        entropy_minutes: u32,
        total_slots: usize,
    ) -> Self {
        let offsets = if entropy_minutes == 0 {
            vec![0; total_slots]
        } else {
            (0..total_slots)
                .map(|_| source.draw(entropy_minutes))
                .collect()
        };
        Self { offsets }
    }

    /// A plan with fixed offsets.
    pub fn from_offsets(offsets: Vec<u32>) -> Self {
        Self { offsets }
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn start_offset(&self, index: usize) -> u32 {
        self.offsets.get(index).copied().unwrap_or(0)
    }

    pub fn end_offset(&self, index: usize) -> u32 {
        match self.offsets.len().checked_sub(1 + index) {
            Some(paired) => self.offsets[paired],
            None => 0,
        }
    }

    /// Jittered `(start, end)` in minutes for slot `index` of this day.
    pub fn apply(&self, slot: &NormalizedSlot, index: usize) -> (u32, u32) {
        (
            slot.start.saturating_add(self.start_offset(index)),
            slot.end.saturating_add(self.end_offset(index)),
        )
    }
}
