//! Reproducible description of one artwork.
//!
//! A [`Seed`] captures everything needed to recreate an artwork: generator
//! name, canvas dimensions, PRNG seed and the full parameter object. It is
//! the saved-document format; files carry the generator's extension.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Saved artwork document.
///
/// Two identical `Seed` values fed to the same generator produce
/// bit-identical output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seed {
    pub generator: String,
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    pub params: serde_json::Value,
}

impl Seed {
    /// Creates a document with an empty parameter object.
    pub fn new(generator: &str, width: usize, height: usize, seed: u64) -> Self {
        Self {
            generator: generator.to_string(),
            width,
            height,
            seed,
            params: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    /// Validates that the seed has non-zero dimensions and that
    /// `width * height` does not overflow.
    pub fn validate(&self) -> Result<(), EngineError> {
        crate::grid::checked_len(self.width, self.height).map(|_| ())
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses and validates a document.
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        let seed: Seed = serde_json::from_str(text)?;
        seed.validate()?;
        Ok(seed)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), EngineError> {
        std::fs::write(path, self.to_json()?)?;
        log::debug!("wrote {} document to {}", self.generator, path.display());
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path)?;
        let seed = Self::from_json(&text)?;
        log::debug!("read {} document from {}", seed.generator, path.display());
        Ok(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_seed_with_empty_params() {
        let s = Seed::new("nebula", 512, 256, 42);
        assert_eq!(s.generator, "nebula");
        assert_eq!((s.width, s.height, s.seed), (512, 256, 42));
        assert_eq!(s.params, serde_json::json!({}));
    }

    #[test]
    fn json_round_trip_with_custom_params() {
        let mut s = Seed::new("flow", 800, 600, 8675309);
        s.params = serde_json::json!({"line_count": 300, "dotted": true});
        let restored = Seed::from_json(&s.to_json().unwrap()).unwrap();
        assert_eq!(s, restored);
    }

    #[test]
    fn json_contains_expected_keys() {
        let v = serde_json::to_value(Seed::new("shapes", 128, 128, 1)).unwrap();
        for key in ["generator", "width", "height", "seed", "params"] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn from_json_rejects_missing_field() {
        let err = Seed::from_json(r#"{"generator":"flow","width":10,"height":10,"params":{}}"#)
            .unwrap_err();
        assert!(matches!(err, EngineError::SerializationMismatch(_)));
    }

    #[test]
    fn from_json_rejects_zero_dimensions() {
        let err = Seed::from_json(
            r#"{"generator":"flow","width":0,"height":10,"seed":1,"params":{}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidDimensions));
    }

    #[test]
    fn validate_checks_dimensions() {
        assert!(Seed::new("noise", 512, 512, 42).validate().is_ok());
        assert!(Seed::new("noise", 0, 512, 42).validate().is_err());
        assert!(Seed::new("noise", 512, 0, 42).validate().is_err());
        assert!(Seed::new("noise", usize::MAX, 2, 42).validate().is_err());
    }

    #[test]
    fn reading_missing_file_is_io_error() {
        let err = Seed::read_from(Path::new("/definitely/not/here.flw")).unwrap_err();
        assert!(matches!(err, EngineError::Io(_)));
    }
}
