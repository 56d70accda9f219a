//! RNG module - uniform random piece selection
//!
//! Every spawn picks one of the seven kinds with equal probability; there is no
//! bag or history. The default source is a small seeded LCG so games can be
//! replayed from a seed.

use crate::types::PieceKind;

/// Source of the next piece kind.
pub trait PieceRandomizer {
    fn next_kind(&mut self) -> PieceKind;
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Scales by the high bits; the low bits of an LCG cycle with short periods.
    pub fn next_range(&mut self, max: u32) -> u32 {
        ((u64::from(self.next_u32()) * u64::from(max)) >> 32) as u32
    }
}

impl PieceRandomizer for SimpleRng {
    fn next_kind(&mut self) -> PieceKind {
        PieceKind::ALL[self.next_range(PieceKind::ALL.len() as u32) as usize]
    }
}

/// Replays a fixed list of kinds, cycling when it runs out.
///
/// Useful for scripted demos and deterministic tests.
#[derive(Debug, Clone)]
pub struct SequenceRandomizer {
    kinds: Vec<PieceKind>,
    index: usize,
}

impl SequenceRandomizer {
    /// Panics if `kinds` is empty.
    pub fn new(kinds: impl Into<Vec<PieceKind>>) -> Self {
        let kinds = kinds.into();
        assert!(!kinds.is_empty(), "sequence needs at least one piece kind");
        Self { kinds, index: 0 }
    }
}

impl PieceRandomizer for SequenceRandomizer {
    fn next_kind(&mut self) -> PieceKind {
        let kind = self.kinds[self.index % self.kinds.len()];
        self.index = self.index.wrapping_add(1);
        kind
    }
}
