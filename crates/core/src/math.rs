//! Small numeric helpers shared by the generators.
//!
//! Points and vectors are `glam::DVec2` throughout; these functions cover the
//! few operations glam does not provide directly (angle interpolation, the
//! maturity ramp used for streamline coloring).

use glam::DVec2;
use std::f64::consts::{PI, TAU};

/// Linear interpolation: `a` at `t = 0`, `b` at `t = 1`. `t` is not clamped.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Wraps an angle in radians to [0, 2π).
pub fn normalize_angle(angle: f64) -> f64 {
    angle.rem_euclid(TAU)
}

/// Interpolates between two angles (radians) along the shorter arc.
///
/// The result is normalized to [0, 2π).
pub fn lerp_angle(from: f64, to: f64, t: f64) -> f64 {
    let delta = match (to - from).rem_euclid(TAU) {
        d if d > PI => d - TAU,
        d => d,
    };
    normalize_angle(from + t * delta)
}

/// Maps `value` onto [0, 1]: 0 at or below `low`, 1 at or above `high`,
/// linear in between. A degenerate range (`high <= low`) is a step at `low`.
pub fn ramp(value: f64, low: f64, high: f64) -> f64 {
    if high <= low {
        return if value < low { 0.0 } else { 1.0 };
    }
    ((value - low) / (high - low)).clamp(0.0, 1.0)
}

/// Unit vector at `angle` radians from the +x axis.
pub fn unit(angle: f64) -> DVec2 {
    DVec2::new(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        assert!(approx_eq(lerp(2.0, 6.0, 0.0), 2.0));
        assert!(approx_eq(lerp(2.0, 6.0, 1.0), 6.0));
        assert!(approx_eq(lerp(2.0, 6.0, 0.5), 4.0));
    }

    #[test]
    fn lerp_angle_takes_short_way_across_zero() {
        // 350° -> 10° should pass through 0°, not 180°.
        let from = 350f64.to_radians();
        let to = 10f64.to_radians();
        let mid = lerp_angle(from, to, 0.5);
        assert!(
            mid < 1e-9 || (TAU - mid) < 1e-9,
            "expected ~0 rad, got {mid}"
        );
    }

    #[test]
    fn lerp_angle_endpoints() {
        let from = 1.0;
        let to = 2.5;
        assert!(approx_eq(lerp_angle(from, to, 0.0), from));
        assert!(approx_eq(lerp_angle(from, to, 1.0), to));
    }

    #[test]
    fn lerp_angle_handles_unnormalized_inputs() {
        let a = lerp_angle(-PI / 2.0, 5.0 * PI / 2.0, 0.0);
        assert!(approx_eq(a, 3.0 * PI / 2.0));
        let b = lerp_angle(-PI / 2.0, 5.0 * PI / 2.0, 1.0);
        assert!(approx_eq(b, PI / 2.0));
    }

    #[test]
    fn ramp_clamps_and_interpolates() {
        assert!(approx_eq(ramp(5.0, 20.0, 100.0), 0.0));
        assert!(approx_eq(ramp(150.0, 20.0, 100.0), 1.0));
        assert!(approx_eq(ramp(60.0, 20.0, 100.0), 0.5));
    }

    #[test]
    fn ramp_with_degenerate_range_is_a_step() {
        assert!(approx_eq(ramp(9.0, 10.0, 10.0), 0.0));
        assert!(approx_eq(ramp(10.0, 10.0, 10.0), 1.0));
    }

    #[test]
    fn unit_vector_has_length_one() {
        for i in 0..16 {
            let v = unit(i as f64 * 0.4);
            assert!(approx_eq(v.length(), 1.0));
        }
    }
}
