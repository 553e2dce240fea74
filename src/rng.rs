//! Pluggable randomness for AI timing, crit rolls and particle spread.
//!
//! Production runs use [`SeededRng`]; tests supply a [`ScriptedRng`] so every
//! roll is known in advance.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Source of uniform values in `[0, 1)`
pub trait BattleRng: Send + Sync {
    fn next_f64(&mut self) -> f64;

    /// True with probability `p`
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// `min + random * span`
    fn range(&mut self, min: f32, span: f32) -> f32 {
        min + self.next_f64() as f32 * span
    }

    /// Uniform index in `0..len` (0 when `len` is 0)
    fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }
}

/// xoshiro256++ generator
pub struct SeededRng {
    inner: Xoshiro256PlusPlus,
}

impl SeededRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self {
            inner: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            inner: Xoshiro256PlusPlus::from_entropy(),
        }
    }
}

impl BattleRng for SeededRng {
    fn next_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }
}

/// Replays a fixed sequence of values, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRng {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Always returns the same value
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl BattleRng for ScriptedRng {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        if v.is_finite() {
            v.clamp(0.0, 1.0 - f64::EPSILON)
        } else {
            0.0
        }
    }
}
