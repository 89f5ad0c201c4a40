//! Deterministic random streams for star initialization.

const MULTIPLIER: u64 = 9301;
const INCREMENT: u64 = 49297;
const MODULUS: u64 = 233_280;

/// A source of uniform values in `[0, 1)`.
pub trait UnitRandom {
  fn next_unit(&mut self) -> f32;
}

/// Linear congruential generator. The same seed always yields the same stream.
#[derive(Clone, Debug)]
pub struct SeededRandom {
  state: u64,
}

impl SeededRandom {
  pub fn new(seed: u64) -> Self {
    // reduced up front so `state * MULTIPLIER` always fits in a u64
    Self { state: seed % MODULUS }
  }
}

impl UnitRandom for SeededRandom {
  fn next_unit(&mut self) -> f32 {
    self.state = (self.state * MULTIPLIER + INCREMENT) % MODULUS;
    (self.state as f64 / MODULUS as f64) as f32
  }
}
