//! Five-entry color palette with HSB jitter.
//!
//! Each entry carries a color and an enable flag. Selection picks uniformly
//! among enabled entries and perturbs hue, saturation and brightness by
//! independent uniform jitter. The HSB form of the enabled entries is cached
//! and rebuilt on every mutation and after deserialization.

use crate::color::{Color, Hsb};
use crate::error::EngineError;
use crate::prng::Xorshift64;
use serde::{Deserialize, Serialize};

/// Number of slots in every palette.
pub const PALETTE_SIZE: usize = 5;

/// One palette slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub color: Color,
    pub enabled: bool,
}

impl PaletteEntry {
    pub const fn new(color: Color, enabled: bool) -> Self {
        Self { color, enabled }
    }
}

/// Serialized shape of a [`Palette`]; the HSB cache is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PaletteDoc {
    entries: [PaletteEntry; PALETTE_SIZE],
    var_h: f64,
    var_s: f64,
    var_b: f64,
}

/// Fixed-size palette with per-channel HSB variance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "PaletteDoc", into = "PaletteDoc")]
pub struct Palette {
    entries: [PaletteEntry; PALETTE_SIZE],
    var_h: f64,
    var_s: f64,
    var_b: f64,
    enabled_hsb: Vec<Hsb>,
}

impl PartialEq for Palette {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
            && self.var_h == other.var_h
            && self.var_s == other.var_s
            && self.var_b == other.var_b
    }
}

impl Palette {
    /// Builds a palette from explicit entries and variances.
    ///
    /// Variances must be finite and non-negative. `var_h` is in degrees,
    /// `var_s` and `var_b` are in [0, 1] units.
    pub fn new(
        entries: [PaletteEntry; PALETTE_SIZE],
        var_h: f64,
        var_s: f64,
        var_b: f64,
    ) -> Result<Self, EngineError> {
        for (name, v) in [("var_h", var_h), ("var_s", var_s), ("var_b", var_b)] {
            if !v.is_finite() || v < 0.0 {
                return Err(EngineError::InvalidPalette(format!(
                    "{name} must be finite and non-negative, got {v}"
                )));
            }
        }
        let mut palette = Self {
            entries,
            var_h,
            var_s,
            var_b,
            enabled_hsb: Vec::new(),
        };
        palette.refresh();
        Ok(palette)
    }

    /// A palette whose first slot is `color` (enabled) and whose remaining
    /// slots are disabled black, with zero variance.
    pub fn single(color: Color) -> Self {
        let mut entries = [PaletteEntry::new(Color::BLACK, false); PALETTE_SIZE];
        entries[0] = PaletteEntry::new(color, true);
        let mut palette = Self {
            entries,
            var_h: 0.0,
            var_s: 0.0,
            var_b: 0.0,
            enabled_hsb: Vec::new(),
        };
        palette.refresh();
        palette
    }

    pub fn entries(&self) -> &[PaletteEntry; PALETTE_SIZE] {
        &self.entries
    }

    /// Variances as `(hue, saturation, brightness)`.
    pub fn variance(&self) -> (f64, f64, f64) {
        (self.var_h, self.var_s, self.var_b)
    }

    /// Number of entries that can be drawn by [`Palette::select_color`].
    pub fn enabled_count(&self) -> usize {
        self.enabled_hsb.len()
    }

    /// Replaces the color in slot `index`.
    pub fn set_color(&mut self, index: usize, color: Color) -> Result<(), EngineError> {
        self.slot_mut(index)?.color = color;
        self.refresh();
        Ok(())
    }

    /// Enables or disables slot `index`.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> Result<(), EngineError> {
        self.slot_mut(index)?.enabled = enabled;
        self.refresh();
        Ok(())
    }

    /// Replaces all three variances. Same domain as [`Palette::new`].
    pub fn set_variance(&mut self, var_h: f64, var_s: f64, var_b: f64) -> Result<(), EngineError> {
        *self = Self::new(self.entries, var_h, var_s, var_b)?;
        Ok(())
    }

    /// Draws a jittered HSB value from a uniformly chosen enabled entry.
    ///
    /// Hue is wrapped to [0, 360); saturation and brightness are clamped to
    /// [0, 1]. Consumes exactly four PRNG draws per call.
    pub fn select_hsb(&self, rng: &mut Xorshift64) -> Result<Hsb, EngineError> {
        if self.enabled_hsb.is_empty() {
            return Err(EngineError::InvalidPalette(
                "no palette entries are enabled".to_string(),
            ));
        }
        let base = self.enabled_hsb[rng.next_usize(self.enabled_hsb.len())];
        let h = wrap_hue(base.h + rng.next_symmetric(self.var_h));
        let s = (base.s + rng.next_symmetric(self.var_s)).clamp(0.0, 1.0);
        let b = (base.b + rng.next_symmetric(self.var_b)).clamp(0.0, 1.0);
        Ok(Hsb::new(h, s, b))
    }

    /// [`Palette::select_hsb`] converted to an opaque color.
    pub fn select_color(&self, rng: &mut Xorshift64) -> Result<Color, EngineError> {
        self.select_hsb(rng).map(Hsb::to_color)
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut PaletteEntry, EngineError> {
        self.entries.get_mut(index).ok_or_else(|| {
            EngineError::InvalidPalette(format!(
                "slot {index} out of range (palette has {PALETTE_SIZE})"
            ))
        })
    }

    fn refresh(&mut self) {
        self.enabled_hsb = self
            .entries
            .iter()
            .filter(|e| e.enabled)
            .map(|e| Hsb::from_color(e.color))
            .collect();
    }
}

/// `rem_euclid` can round up to exactly 360 for tiny negative inputs.
fn wrap_hue(h: f64) -> f64 {
    let wrapped = h.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

impl From<PaletteDoc> for Palette {
    fn from(doc: PaletteDoc) -> Self {
        let mut palette = Self {
            entries: doc.entries,
            var_h: doc.var_h,
            var_s: doc.var_s,
            var_b: doc.var_b,
            enabled_hsb: Vec::new(),
        };
        palette.refresh();
        palette
    }
}

impl From<Palette> for PaletteDoc {
    fn from(p: Palette) -> Self {
        Self {
            entries: p.entries,
            var_h: p.var_h,
            var_s: p.var_s,
            var_b: p.var_b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_color() -> Palette {
        let mut entries = [PaletteEntry::new(Color::BLACK, false); PALETTE_SIZE];
        entries[1] = PaletteEntry::new(Color::RED, true);
        entries[3] = PaletteEntry::new(Color::BLUE, true);
        Palette::new(entries, 0.0, 0.0, 0.0).unwrap()
    }

    #[test]
    fn single_enables_only_first_slot() {
        let p = Palette::single(Color::RED);
        assert_eq!(p.enabled_count(), 1);
        assert!(p.entries()[0].enabled);
        assert!(p.entries()[1..].iter().all(|e| !e.enabled));
    }

    #[test]
    fn zero_variance_selection_returns_exact_entry() {
        let p = Palette::single(Color::rgb(255, 128, 0));
        let mut rng = Xorshift64::new(3);
        for _ in 0..20 {
            assert_eq!(p.select_color(&mut rng).unwrap(), Color::rgb(255, 128, 0));
        }
    }

    #[test]
    fn selection_draws_only_enabled_entries() {
        let p = two_color();
        let mut rng = Xorshift64::new(11);
        let mut seen_red = false;
        let mut seen_blue = false;
        for _ in 0..200 {
            let c = p.select_color(&mut rng).unwrap();
            assert!(c == Color::RED || c == Color::BLUE, "unexpected {c:?}");
            seen_red |= c == Color::RED;
            seen_blue |= c == Color::BLUE;
        }
        assert!(seen_red && seen_blue);
    }

    #[test]
    fn no_enabled_entries_is_an_error() {
        let mut p = Palette::single(Color::RED);
        p.set_enabled(0, false).unwrap();
        let mut rng = Xorshift64::new(1);
        let err = p.select_color(&mut rng).unwrap_err();
        assert!(matches!(err, EngineError::InvalidPalette(_)));
    }

    #[test]
    fn set_color_refreshes_cache() {
        let mut p = Palette::single(Color::RED);
        p.set_color(0, Color::BLUE).unwrap();
        let mut rng = Xorshift64::new(5);
        assert_eq!(p.select_color(&mut rng).unwrap(), Color::BLUE);
    }

    #[test]
    fn set_enabled_refreshes_cache() {
        let mut p = Palette::single(Color::RED);
        p.set_color(2, Color::YELLOW).unwrap();
        assert_eq!(p.enabled_count(), 1);
        p.set_enabled(2, true).unwrap();
        assert_eq!(p.enabled_count(), 2);
    }

    #[test]
    fn out_of_range_slot_is_rejected() {
        let mut p = Palette::single(Color::RED);
        assert!(p.set_color(PALETTE_SIZE, Color::BLUE).is_err());
        assert!(p.set_enabled(99, true).is_err());
    }

    #[test]
    fn negative_variance_is_rejected() {
        let entries = [PaletteEntry::new(Color::RED, true); PALETTE_SIZE];
        assert!(Palette::new(entries, -1.0, 0.0, 0.0).is_err());
        assert!(Palette::new(entries, 0.0, f64::NAN, 0.0).is_err());
    }

    #[test]
    fn set_variance_keeps_entries_and_validates() {
        let mut p = two_color();
        p.set_variance(10.0, 0.1, 0.2).unwrap();
        assert_eq!(p.variance(), (10.0, 0.1, 0.2));
        assert_eq!(p.enabled_count(), 2);
        assert!(p.set_variance(-1.0, 0.0, 0.0).is_err());
        assert_eq!(p.variance(), (10.0, 0.1, 0.2));
    }

    #[test]
    fn deserialization_rebuilds_cache() {
        let p = two_color();
        let json = serde_json::to_string(&p).unwrap();
        assert!(!json.contains("enabled_hsb"));
        let back: Palette = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
        assert_eq!(back.enabled_count(), 2);
    }

    #[test]
    fn deserialization_requires_every_field() {
        let result = serde_json::from_str::<Palette>(r#"{"var_h": 0, "var_s": 0, "var_b": 0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn wrap_hue_never_returns_360() {
        assert_eq!(wrap_hue(-1e-20), 0.0);
        assert!((wrap_hue(365.0) - 5.0).abs() < 1e-12);
        assert!((wrap_hue(-10.0) - 350.0).abs() < 1e-12);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn selection_stays_in_hsb_bounds(
                seed: u64,
                var_h in 0.0f64..720.0,
                var_s in 0.0f64..2.0,
                var_b in 0.0f64..2.0,
            ) {
                let entries = [
                    PaletteEntry::new(Color::RED, true),
                    PaletteEntry::new(Color::YELLOW, false),
                    PaletteEntry::new(Color::rgb(10, 200, 40), true),
                    PaletteEntry::new(Color::BLACK, true),
                    PaletteEntry::new(Color::WHITE, true),
                ];
                let p = Palette::new(entries, var_h, var_s, var_b).unwrap();
                let mut rng = Xorshift64::new(seed);
                for _ in 0..50 {
                    let hsb = p.select_hsb(&mut rng).unwrap();
                    prop_assert!((0.0..360.0).contains(&hsb.h), "h = {}", hsb.h);
                    prop_assert!((0.0..=1.0).contains(&hsb.s), "s = {}", hsb.s);
                    prop_assert!((0.0..=1.0).contains(&hsb.b), "b = {}", hsb.b);
                }
            }
        }
    }
}
