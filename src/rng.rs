//! Deterministic RNG based on splitmix64. Every logical concern draws from its
//! own salted stream, so no result depends on how many values another concern
//! consumed.

/// Offset between consecutive per-rib streams.
pub const RIB_STREAM_STRIDE: u64 = 10_007;

#[inline]
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Seed for a global sub-stream (wave fields, warp, mass).
#[inline]
pub fn sub_seed(seed: u64, salt: u64) -> u64 {
    splitmix64(seed ^ salt)
}

/// Seed for rib `index`'s private stream. Independent of rib_count and of the
/// order ribs are computed in.
#[inline]
pub fn rib_seed(seed: u64, index: usize) -> u64 {
    seed.wrapping_add((index as u64).wrapping_mul(RIB_STREAM_STRIDE))
}

/// Simple sequential RNG. Cheap to construct, so build one per concern.
#[derive(Clone, Debug)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = splitmix64(self.state);
        self.state
    }

    /// Uniform in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in [lo, hi).
    pub fn range_f64(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }

    /// Uniform in [-1, 1).
    pub fn signed(&mut self) -> f64 {
        self.range_f64(-1.0, 1.0)
    }
}
