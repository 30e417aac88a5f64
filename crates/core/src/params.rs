//! Lenient typed lookups into a JSON parameter object.
//!
//! Each helper takes a JSON value, a key name, and a default. If the key is
//! missing or the value has the wrong type, the default is returned. These
//! back the `from_json` constructors used for partial overrides on the
//! command line; saved documents go through strict serde instead.
//!
//! The `check_*` helpers enforce the ranges each generator advertises in its
//! schema, whichever way the parameters arrived.

use crate::color::Color;
use crate::error::EngineError;
use crate::palette::Palette;
use serde_json::Value;

/// Extracts an `f64` from `params[name]`. Integers are accepted.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a non-negative integer as `usize`.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

/// Extracts a non-negative integer that fits in `u32`.
pub fn param_u32(params: &Value, name: &str, default: u32) -> u32 {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(default)
}

pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

/// Extracts a color given as hex (`"#rrggbb"`, `"#rrggbbaa"`) or a named constant.
pub fn param_color(params: &Value, name: &str, default: Color) -> Color {
    params
        .get(name)
        .and_then(Value::as_str)
        .and_then(|s| Color::from_name(s).ok())
        .unwrap_or(default)
}

/// Extracts a full palette object; any malformed palette yields `default`.
pub fn param_palette(params: &Value, name: &str, default: &Palette) -> Palette {
    params
        .get(name)
        .and_then(|v| serde_json::from_value::<Palette>(v.clone()).ok())
        .unwrap_or_else(|| default.clone())
}

/// Rejects a non-finite `value` or one outside `[min, max]`.
pub fn check_range(name: &str, value: f64, min: f64, max: f64) -> Result<(), EngineError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::invalid_param(
            name,
            format!("must be within [{min}, {max}], got {value}"),
        ))
    }
}

/// Rejects an integer `value` outside `[min, max]`.
pub fn check_count(name: &str, value: usize, min: usize, max: usize) -> Result<(), EngineError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::invalid_param(
            name,
            format!("must be within [{min}, {max}], got {value}"),
        ))
    }
}
