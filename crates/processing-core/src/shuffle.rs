//! Presentation order shuffling.
//!
//! Base portraits are shown in a random order that stays fixed for the
//! session. The random source is injected so tests can replay an order.

/// A source of uniformly distributed random numbers.
pub trait RandomSource {
    fn next_u64(&mut self) -> u64;

    /// Uniform integer in `[0, bound)`. `bound` must be non-zero.
    ///
    /// Draws falling in the short final bucket are rejected so every value
    /// is equally likely.
    fn below(&mut self, bound: u64) -> u64 {
        debug_assert!(bound > 0, "bound must be positive");
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let draw = self.next_u64();
            if draw >= threshold {
                return draw % bound;
            }
        }
    }
}

/// SplitMix64 generator: small, fast, and fully determined by its seed.
#[derive(Debug, Clone)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Seed from the wall clock, for production sessions.
    pub fn from_entropy() -> Self {
        let now = chrono::Utc::now();
        let nanos = now
            .timestamp_nanos_opt()
            .unwrap_or_else(|| now.timestamp_micros().wrapping_mul(1_000));
        Self::new((nanos as u64) ^ 0xA076_1D64_78BD_642F)
    }
}

impl RandomSource for SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

/// Return a uniformly shuffled copy of `items` (Fisher–Yates).
///
/// Walks `i` from the last index down to 1, swapping with a uniform `j` in
/// `[0, i]`. The input is left untouched.
pub fn shuffle<T: Clone, R: RandomSource + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.below(i as u64 + 1) as usize;
        shuffled.swap(i, j);
    }
    tracing::trace!(len = shuffled.len(), "Shuffled presentation order");
    shuffled
}

/// Owns a random source and hands out shuffled presentation orders.
#[derive(Debug, Clone)]
pub struct PresentationShuffler<R: RandomSource = SplitMix64> {
    rng: R,
}

impl PresentationShuffler<SplitMix64> {
    /// Shuffler with a reproducible seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(SplitMix64::new(seed))
    }

    /// Shuffler seeded from the clock.
    pub fn from_entropy() -> Self {
        Self::new(SplitMix64::from_entropy())
    }
}

impl<R: RandomSource> PresentationShuffler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn shuffle<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        shuffle(items, &mut self.rng)
    }
}
