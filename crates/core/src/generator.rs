//! The `Generator` trait shared by every artwork algorithm.
//!
//! The trait is object-safe so the registry and CLI can hold a
//! `Box<dyn Generator>` and switch algorithms at runtime.

use crate::cancel::CancelToken;
use crate::canvas::PixelBuffer;
use crate::draw::Drawing;
use crate::error::EngineError;
use serde_json::Value;

/// Finished output of a generator run.
#[derive(Debug, Clone, PartialEq)]
pub enum Artwork {
    /// BGRA raster (density and noise generators).
    Pixels(PixelBuffer),
    /// Ordered vector draw list (flow and shapes generators).
    Drawing(Drawing),
}

impl Artwork {
    pub fn width(&self) -> usize {
        match self {
            Artwork::Pixels(p) => p.width(),
            Artwork::Drawing(d) => d.width,
        }
    }

    pub fn height(&self) -> usize {
        match self {
            Artwork::Pixels(p) => p.height(),
            Artwork::Drawing(d) => d.height,
        }
    }

    pub fn as_pixels(&self) -> Option<&PixelBuffer> {
        match self {
            Artwork::Pixels(p) => Some(p),
            Artwork::Drawing(_) => None,
        }
    }

    pub fn as_drawing(&self) -> Option<&Drawing> {
        match self {
            Artwork::Drawing(d) => Some(d),
            Artwork::Pixels(_) => None,
        }
    }
}

/// Core trait for artwork generators.
///
/// A generator owns its parameter bundle. [`Generator::generate`] reads it
/// immutably, so one configured generator can render many seeds and sizes.
/// The same `(width, height, seed, params)` always produces identical output.
pub trait Generator {
    /// Registry name, e.g. `"nebula"`.
    fn name(&self) -> &'static str;

    /// File extension (without the dot) for saved documents.
    fn extension(&self) -> &'static str;

    /// Renders a complete artwork.
    ///
    /// Returns `InvalidDimensions` for zero sizes and `CancellationRequested`
    /// if `cancel` fires mid-run; no partial output is ever returned.
    fn generate(
        &self,
        width: usize,
        height: usize,
        seed: u64,
        cancel: &CancelToken,
    ) -> Result<Artwork, EngineError>;

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all available parameters, their types, ranges, and defaults.
    fn param_schema(&self) -> Value;

    /// Replaces the parameters wholesale from a saved JSON object.
    ///
    /// Every field must be present. On failure the current parameters are
    /// left untouched.
    fn load_params(&mut self, params: &Value) -> Result<(), EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Minimal generator used to verify trait object safety.
    struct MockGenerator {
        shade: u64,
    }

    impl Generator for MockGenerator {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn extension(&self) -> &'static str {
            "mck"
        }

        fn generate(
            &self,
            width: usize,
            height: usize,
            _seed: u64,
            cancel: &CancelToken,
        ) -> Result<Artwork, EngineError> {
            cancel.check()?;
            Ok(Artwork::Pixels(PixelBuffer::new(width, height)?))
        }

        fn params(&self) -> Value {
            json!({"shade": self.shade})
        }

        fn param_schema(&self) -> Value {
            json!({"shade": {"type": "integer", "default": 0}})
        }

        fn load_params(&mut self, params: &Value) -> Result<(), EngineError> {
            let shade = params
                .get("shade")
                .and_then(Value::as_u64)
                .ok_or_else(|| EngineError::SerializationMismatch("missing shade".into()))?;
            self.shade = shade;
            Ok(())
        }
    }

    #[test]
    fn generator_trait_is_object_safe() {
        let g: Box<dyn Generator> = Box::new(MockGenerator { shade: 0 });
        let art = g.generate(4, 3, 1, &CancelToken::new()).unwrap();
        assert_eq!((art.width(), art.height()), (4, 3));
        assert!(art.as_pixels().is_some());
        assert!(art.as_drawing().is_none());
    }

    #[test]
    fn cancelled_token_aborts_generation() {
        let g = MockGenerator { shade: 0 };
        let token = CancelToken::new();
        token.cancel();
        let err = g.generate(4, 4, 1, &token).unwrap_err();
        assert!(err.is_cancellation());
    }

    #[test]
    fn failed_load_keeps_previous_params() {
        let mut g = MockGenerator { shade: 7 };
        assert!(g.load_params(&json!({"other": 1})).is_err());
        assert_eq!(g.params()["shade"], 7);
        g.load_params(&json!({"shade": 9})).unwrap();
        assert_eq!(g.params()["shade"], 9);
    }

    #[test]
    fn drawing_artwork_reports_dimensions() {
        let art = Artwork::Drawing(Drawing::new(5, 6, crate::color::Color::WHITE));
        assert_eq!((art.width(), art.height()), (5, 6));
        assert!(art.as_drawing().is_some());
    }
}
