//! Radial "flower" seeding and direction bias.
//!
//! Inside `ctr_radius + petal_length` of the centre lines run straight out
//! radially; beyond `ctr_radius + petal_length + dropoff` the noise field
//! alone steers; in between the two angles are blended along the shorter
//! arc. The disc of radius `ctr_radius` is kept free of start points.

use genart_core::math::{lerp_angle, ramp, unit};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

pub const DEFAULT_CTR_RADIUS: f64 = 30.0;
pub const DEFAULT_PETAL_LENGTH: f64 = 80.0;
pub const DEFAULT_DROPOFF: f64 = 190.0;

/// Geometry of the flower influence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowerParams {
    pub ctr_radius: f64,
    pub petal_length: f64,
    pub dropoff: f64,
}

impl Default for FlowerParams {
    fn default() -> Self {
        Self {
            ctr_radius: DEFAULT_CTR_RADIUS,
            petal_length: DEFAULT_PETAL_LENGTH,
            dropoff: DEFAULT_DROPOFF,
        }
    }
}

/// A placed flower.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flower {
    pub center: DVec2,
    pub params: FlowerParams,
}

impl Flower {
    pub fn new(center: DVec2, params: FlowerParams) -> Self {
        Self { center, params }
    }

    /// True inside the centre disc, where no streamline may start.
    pub fn forbids(&self, pt: DVec2) -> bool {
        pt.distance(self.center) < self.params.ctr_radius
    }

    /// Blends `noise_angle` with the outward radial angle at `pt`.
    pub fn steer(&self, pt: DVec2, noise_angle: f64) -> f64 {
        let offset = pt - self.center;
        let dist = offset.length();
        let inner = self.params.ctr_radius + self.params.petal_length;
        let outer = inner + self.params.dropoff;
        if dist >= outer {
            return noise_angle;
        }
        let radial = offset.y.atan2(offset.x);
        if dist <= inner {
            return radial;
        }
        lerp_angle(radial, noise_angle, ramp(dist, inner, outer))
    }

    /// Number of petals: `floor(2π · ctr_radius / spacing)`.
    pub fn petal_count(&self, spacing: f64) -> usize {
        if spacing <= 0.0 {
            return 0;
        }
        (TAU * self.params.ctr_radius / spacing).floor().max(0.0) as usize
    }

    /// Petal start points evenly spaced on the centre circle, rotated by
    /// `rotation` radians.
    pub fn petal_starts(&self, spacing: f64, rotation: f64) -> Vec<DVec2> {
        let count = self.petal_count(spacing);
        (0..count)
            .map(|i| {
                let angle = rotation + TAU * i as f64 / count as f64;
                self.center + unit(angle) * self.params.ctr_radius
            })
            .collect()
    }
}
