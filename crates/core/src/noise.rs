//! Seeded multi-octave Perlin noise.
//!
//! Each octave samples the `noise` crate's gradient noise, whose permutation
//! table is a seeded shuffle of 0..=255. The crate is pinned to an exact
//! version so saved documents keep replaying identically. Values are
//! remapped from [-1, 1] to [0, 1].

use crate::error::EngineError;
use crate::prng::Xorshift64;
use ::noise::{NoiseFn, Perlin as GradientNoise};
use std::fmt;

/// Lattice period; coordinates wrap every `REPEAT` units.
pub const REPEAT: f64 = 256.0;

/// Deterministic 3-D noise field over ℝ³ → [0, 1].
///
/// Read-only after construction and `Send + Sync`, so one instance can be
/// shared by every worker of a parallel render.
pub struct Perlin {
    gradient: GradientNoise,
    octaves: u32,
    persistence: f64,
    frequency: f64,
}

impl fmt::Debug for Perlin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Perlin")
            .field("octaves", &self.octaves)
            .field("persistence", &self.persistence)
            .field("frequency", &self.frequency)
            .finish_non_exhaustive()
    }
}

/// Seed handed to the gradient noise, derived from the caller's seed.
fn gradient_seed(seed: u64) -> u32 {
    Xorshift64::new(seed).next_seed() as u32
}

impl Perlin {
    /// Builds a field with one octave, persistence 1 and frequency 1.
    pub fn new(seed: u64) -> Self {
        Self {
            gradient: GradientNoise::new(gradient_seed(seed)),
            octaves: 1,
            persistence: 1.0,
            frequency: 1.0,
        }
    }

    /// Builds a fully configured field.
    ///
    /// Returns `EngineError::InvalidParameter` if `octaves` is zero or if
    /// `persistence`/`frequency` are not finite.
    pub fn with_octaves(
        seed: u64,
        octaves: u32,
        persistence: f64,
        frequency: f64,
    ) -> Result<Self, EngineError> {
        if octaves == 0 {
            return Err(EngineError::invalid_param("octaves", "must be at least 1"));
        }
        if !persistence.is_finite() || persistence <= 0.0 {
            return Err(EngineError::invalid_param(
                "persistence",
                "must be finite and positive",
            ));
        }
        if !frequency.is_finite() {
            return Err(EngineError::invalid_param("frequency", "must be finite"));
        }
        Ok(Self {
            gradient: GradientNoise::new(gradient_seed(seed)),
            octaves,
            persistence,
            frequency,
        })
    }

    pub fn octaves(&self) -> u32 {
        self.octaves
    }

    pub fn persistence(&self) -> f64 {
        self.persistence
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Fractal noise at `(x, y, z)` in [0, 1].
    ///
    /// Sums `octaves` layers, doubling the frequency and multiplying the
    /// amplitude by `persistence` each time, then divides by the total
    /// amplitude so the result stays in range for any octave count.
    pub fn value(&self, x: f64, y: f64, z: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = self.frequency;
        let mut amplitude = 1.0;
        let mut max_value = 0.0;

        for _ in 0..self.octaves {
            total += self.base(x * frequency, y * frequency, z * frequency) * amplitude;
            max_value += amplitude;
            amplitude *= self.persistence;
            frequency *= 2.0;
        }
        (total / max_value).clamp(0.0, 1.0)
    }

    /// Convenience for the z = 0 slice.
    pub fn value2(&self, x: f64, y: f64) -> f64 {
        self.value(x, y, 0.0)
    }

    /// Single-octave gradient noise in [0, 1].
    fn base(&self, x: f64, y: f64, z: f64) -> f64 {
        (self.gradient.get([x, y, z]) + 1.0) / 2.0
    }
}
