//! 8-bit color and the HSB (hue/saturation/brightness) model.
//!
//! [`Color`] is the unit every generator emits: straight (non-premultiplied)
//! RGBA bytes. [`Hsb`] is used by palette jitter. Conversions follow the
//! classic sextant formulas: hue in degrees [0, 360), saturation and
//! brightness in [0, 1].

use crate::error::EngineError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Straight-alpha RGBA color with 8-bit channels.
///
/// Serializes as `"#rrggbb"` when opaque and `"#rrggbbaa"` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    /// The web "green" (`#008000`), not full-intensity lime.
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);

    /// Opaque color from channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with alpha replaced.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parses `"#rrggbb"`, `"rrggbb"`, `"#rrggbbaa"` or `"rrggbbaa"` (case insensitive).
    pub fn from_hex(hex: &str) -> Result<Color, EngineError> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 && hex.len() != 8 {
            return Err(EngineError::InvalidColor(format!(
                "expected 6 or 8 hex digits, got {}",
                hex.len()
            )));
        }
        let channel = |range: std::ops::Range<usize>, name: &str| {
            hex.get(range)
                .ok_or_else(|| EngineError::InvalidColor(format!("non-ascii {name} component")))
                .and_then(|s| {
                    u8::from_str_radix(s, 16).map_err(|e| {
                        EngineError::InvalidColor(format!("invalid {name} component: {e}"))
                    })
                })
        };
        let r = channel(0..2, "red")?;
        let g = channel(2..4, "green")?;
        let b = channel(4..6, "blue")?;
        let a = if hex.len() == 8 {
            channel(6..8, "alpha")?
        } else {
            255
        };
        Ok(Color { r, g, b, a })
    }

    /// Hex string; the alpha pair is only emitted when not fully opaque.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Looks up one of the named constants (case insensitive) or parses hex.
    pub fn from_name(name: &str) -> Result<Color, EngineError> {
        match name.to_ascii_lowercase().as_str() {
            "black" => Ok(Color::BLACK),
            "white" => Ok(Color::WHITE),
            "red" => Ok(Color::RED),
            "green" => Ok(Color::GREEN),
            "blue" => Ok(Color::BLUE),
            "yellow" => Ok(Color::YELLOW),
            _ => Color::from_hex(name),
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_name(&s).map_err(serde::de::Error::custom)
    }
}

/// Channel-wise linear interpolation of RGB, truncating to bytes.
///
/// The result is opaque; callers set alpha separately.
pub fn lerp_color(c1: Color, c2: Color, t: f64) -> Color {
    let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t).clamp(0.0, 255.0) as u8;
    Color::rgb(mix(c1.r, c2.r), mix(c1.g, c2.g), mix(c1.b, c2.b))
}

/// Hue in degrees [0, 360), saturation and brightness in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsb {
    pub h: f64,
    pub s: f64,
    pub b: f64,
}

impl Hsb {
    pub fn new(h: f64, s: f64, b: f64) -> Self {
        Self { h, s, b }
    }

    /// Converts an RGB color (alpha ignored).
    pub fn from_color(color: Color) -> Self {
        let max = color.r.max(color.g).max(color.b);
        let min = color.r.min(color.g).min(color.b);
        let s = if max == 0 {
            0.0
        } else {
            1.0 - min as f64 / max as f64
        };
        Self {
            h: hue(color),
            s,
            b: max as f64 / 255.0,
        }
    }

    /// Converts back to an opaque RGB color.
    pub fn to_color(self) -> Color {
        let h = self.h.rem_euclid(360.0);
        let sector = (h / 60.0).floor();
        let f = h / 60.0 - sector;

        let brightness = self.b.clamp(0.0, 1.0) * 255.0;
        let s = self.s.clamp(0.0, 1.0);
        let byte = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        let v = byte(brightness);
        let p = byte(brightness * (1.0 - s));
        let q = byte(brightness * (1.0 - f * s));
        let t = byte(brightness * (1.0 - (1.0 - f) * s));

        match sector as u32 % 6 {
            0 => Color::rgb(v, t, p),
            1 => Color::rgb(q, v, p),
            2 => Color::rgb(p, v, t),
            3 => Color::rgb(p, q, v),
            4 => Color::rgb(t, p, v),
            _ => Color::rgb(v, p, q),
        }
    }
}

/// Hue from whichever channel is maximal; gray has hue 0.
fn hue(color: Color) -> f64 {
    let (r, g, b) = (color.r as f64, color.g as f64, color.b as f64);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max == min {
        return 0.0;
    }
    let sextant = if max == r {
        (g - b) / (max - min)
    } else if max == g {
        2.0 + (b - r) / (max - min)
    } else {
        4.0 + (r - g) / (max - min)
    };
    (sextant * 60.0).rem_euclid(360.0)
}
