#![deny(unsafe_code)]
//! Generator registry: maps generator names to implementations, handles saved
//! documents and turns any artwork into pixels.
//!
//! This crate sits between `genart-core` (which defines the `Generator`
//! trait) and the individual generator crates. Front ends depend on it to
//! avoid duplicating dispatch logic.

pub mod pixel;
pub mod raster;

#[cfg(feature = "png")]
pub mod snapshot;

use genart_core::canvas::PixelBuffer;
use genart_core::error::EngineError;
use genart_core::generator::{Artwork, Generator};
use genart_core::seed::Seed;
use genart_core::CancelToken;
use genart_flow::FlowGenerator;
use genart_nebula::Nebula;
use genart_noise_image::NoiseImage;
use genart_shapes::ShapesGenerator;
use log::{debug, warn};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// All available generator names.
const GENERATOR_NAMES: &[&str] = &["nebula", "flow", "shapes", "noise"];

/// Enumeration of all available generators.
///
/// Wraps each implementation and delegates `Generator` trait methods.
/// Use [`GeneratorKind::from_name`] for string-based construction.
#[derive(Debug, Clone)]
pub enum GeneratorKind {
    /// Monte-Carlo density field.
    Nebula(Nebula),
    /// Evenly spaced streamlines.
    Flow(FlowGenerator),
    /// Jittered-grid circle/square mosaic.
    Shapes(ShapesGenerator),
    /// Grayscale noise preview.
    Noise(NoiseImage),
}

impl GeneratorKind {
    /// Constructs a generator by name from a lenient params object; missing
    /// keys take their defaults.
    ///
    /// Returns `EngineError::UnknownGenerator` if the name is not recognized.
    pub fn from_name(name: &str, params: &Value) -> Result<Self, EngineError> {
        match name {
            "nebula" => Ok(GeneratorKind::Nebula(Nebula::from_json(params)?)),
            "flow" => Ok(GeneratorKind::Flow(FlowGenerator::from_json(params)?)),
            "shapes" => Ok(GeneratorKind::Shapes(ShapesGenerator::from_json(params)?)),
            "noise" => Ok(GeneratorKind::Noise(NoiseImage::from_json(params)?)),
            _ => Err(EngineError::UnknownGenerator(name.to_string())),
        }
    }

    /// Returns a slice of all recognized generator names.
    pub fn list_generators() -> &'static [&'static str] {
        GENERATOR_NAMES
    }

    /// Finds the generator saving documents with `extension`.
    pub fn name_for_extension(extension: &str) -> Option<&'static str> {
        GENERATOR_NAMES.iter().copied().find(|name| {
            GeneratorKind::from_name(name, &Value::Null)
                .map(|g| g.extension() == extension)
                .unwrap_or(false)
        })
    }

    /// Replaces this generator's parameters from a saved document.
    ///
    /// The document must name this generator and carry every parameter.
    /// On any failure the current parameters are left untouched.
    pub fn load(&mut self, doc: &Seed) -> Result<(), EngineError> {
        doc.validate()?;
        if doc.generator != self.name() {
            return Err(EngineError::SerializationMismatch(format!(
                "document is for '{}', not '{}'",
                doc.generator,
                self.name()
            )));
        }
        self.load_params(&doc.params)
    }

    /// Builds a generator configured from a saved document.
    pub fn from_document(doc: &Seed) -> Result<Self, EngineError> {
        let mut generator = GeneratorKind::from_name(&doc.generator, &Value::Null)?;
        generator.load(doc)?;
        Ok(generator)
    }

    /// Captures the current parameters as a document.
    pub fn document(&self, width: usize, height: usize, seed: u64) -> Seed {
        Seed {
            params: self.params(),
            ..Seed::new(self.name(), width, height, seed)
        }
    }

    /// Generates and flattens to pixels in one go.
    pub fn render(
        &self,
        width: usize,
        height: usize,
        seed: u64,
        cancel: &CancelToken,
    ) -> Result<PixelBuffer, EngineError> {
        let art = self.generate(width, height, seed, cancel)?;
        pixel::artwork_pixels(art, cancel)
    }
}

impl Generator for GeneratorKind {
    fn name(&self) -> &'static str {
        match self {
            GeneratorKind::Nebula(g) => g.name(),
            GeneratorKind::Flow(g) => g.name(),
            GeneratorKind::Shapes(g) => g.name(),
            GeneratorKind::Noise(g) => g.name(),
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            GeneratorKind::Nebula(g) => g.extension(),
            GeneratorKind::Flow(g) => g.extension(),
            GeneratorKind::Shapes(g) => g.extension(),
            GeneratorKind::Noise(g) => g.extension(),
        }
    }

    fn generate(
        &self,
        width: usize,
        height: usize,
        seed: u64,
        cancel: &CancelToken,
    ) -> Result<Artwork, EngineError> {
        match self {
            GeneratorKind::Nebula(g) => g.generate(width, height, seed, cancel),
            GeneratorKind::Flow(g) => g.generate(width, height, seed, cancel),
            GeneratorKind::Shapes(g) => g.generate(width, height, seed, cancel),
            GeneratorKind::Noise(g) => g.generate(width, height, seed, cancel),
        }
    }

    fn params(&self) -> Value {
        match self {
            GeneratorKind::Nebula(g) => g.params(),
            GeneratorKind::Flow(g) => g.params(),
            GeneratorKind::Shapes(g) => g.params(),
            GeneratorKind::Noise(g) => g.params(),
        }
    }

    fn param_schema(&self) -> Value {
        match self {
            GeneratorKind::Nebula(g) => g.param_schema(),
            GeneratorKind::Flow(g) => g.param_schema(),
            GeneratorKind::Shapes(g) => g.param_schema(),
            GeneratorKind::Noise(g) => g.param_schema(),
        }
    }

    fn load_params(&mut self, params: &Value) -> Result<(), EngineError> {
        match self {
            GeneratorKind::Nebula(g) => g.load_params(params),
            GeneratorKind::Flow(g) => g.load_params(params),
            GeneratorKind::Shapes(g) => g.load_params(params),
            GeneratorKind::Noise(g) => g.load_params(params),
        }
    }
}

/// Writes `doc` next to `path` with the generator's extension and returns
/// the path actually written.
pub fn save_document(generator: &dyn Generator, doc: &Seed, path: &Path) -> Result<PathBuf, EngineError> {
    let path = path.with_extension(generator.extension());
    doc.write_to(&path)?;
    Ok(path)
}

/// Reads a document and builds the generator it describes.
pub fn load_document(path: &Path) -> Result<(GeneratorKind, Seed), EngineError> {
    let doc = Seed::read_from(path)?;
    let generator = GeneratorKind::from_document(&doc)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext == generator.extension() => {}
        other => warn!(
            "{} has extension {:?}, expected .{} for {}",
            path.display(),
            other,
            generator.extension(),
            generator.name()
        ),
    }
    debug!(
        "loaded {} document ({}x{}, seed {})",
        doc.generator, doc.width, doc.height, doc.seed
    );
    Ok((generator, doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quick(name: &str) -> GeneratorKind {
        let params = match name {
            "nebula" => json!({"samples": 2000, "batches": 4, "workers": 2}),
            "flow" => json!({"line_count": 20}),
            _ => json!({}),
        };
        GeneratorKind::from_name(name, &params).unwrap()
    }

    #[test]
    fn from_name_builds_every_listed_generator() {
        for name in GeneratorKind::list_generators() {
            let generator = GeneratorKind::from_name(name, &json!({})).unwrap();
            assert_eq!(generator.name(), *name);
        }
    }

    #[test]
    fn from_name_unknown_returns_error() {
        let result = GeneratorKind::from_name("nonexistent", &json!({}));
        assert!(matches!(result, Err(EngineError::UnknownGenerator(_))));
    }

    #[test]
    fn extensions_are_distinct_and_resolvable() {
        let expected = [("nebula", "neb"), ("flow", "flw"), ("shapes", "shp"), ("noise", "nse")];
        for (name, ext) in expected {
            assert_eq!(quick(name).extension(), ext);
            assert_eq!(GeneratorKind::name_for_extension(ext), Some(name));
        }
        assert_eq!(GeneratorKind::name_for_extension("png"), None);
    }

    #[test]
    fn params_and_schema_are_delegated() {
        let flow = quick("flow");
        assert_eq!(flow.params()["line_count"], json!(20));
        assert!(flow.param_schema().get("interline_distance").is_some());
    }

    #[test]
    fn every_generator_renders_at_the_requested_size() {
        for name in GeneratorKind::list_generators() {
            let px = quick(name).render(40, 30, 7, &CancelToken::new()).unwrap();
            assert_eq!((px.width(), px.height()), (40, 30), "{name}");
        }
    }

    #[test]
    fn load_rejects_a_document_for_another_generator() {
        let mut shapes = quick("shapes");
        let before = shapes.params();
        let doc = quick("flow").document(64, 64, 1);
        let err = shapes.load(&doc).unwrap_err();
        assert!(matches!(err, EngineError::SerializationMismatch(_)));
        assert_eq!(shapes.params(), before);
    }

    #[test]
    fn load_rejects_partial_params_and_keeps_current_ones() {
        let mut flow = quick("flow");
        let before = flow.params();
        let mut doc = flow.document(64, 64, 1);
        doc.params = json!({"line_count": 5});
        assert!(flow.load(&doc).is_err());
        assert_eq!(flow.params(), before);
    }

    #[test]
    fn document_round_trip_restores_identical_output() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancelToken::new();
        for name in GeneratorKind::list_generators() {
            let original = quick(name);
            let doc = original.document(48, 40, 99);
            let path = save_document(&original, &doc, &dir.path().join("art")).unwrap();
            assert_eq!(
                path.extension().and_then(|e| e.to_str()),
                Some(original.extension())
            );

            let (restored, loaded) = load_document(&path).unwrap();
            assert_eq!(loaded, doc);
            assert_eq!(
                restored.generate(loaded.width, loaded.height, loaded.seed, &cancel).unwrap(),
                original.generate(48, 40, 99, &cancel).unwrap(),
                "{name}"
            );
        }
    }

    #[test]
    fn load_document_reports_missing_files_as_io() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_document(&dir.path().join("absent.neb")).unwrap_err();
        assert!(matches!(err, EngineError::Io(_)));
    }

    #[test]
    fn cancelled_render_propagates() {
        let token = CancelToken::new();
        token.cancel();
        for name in GeneratorKind::list_generators() {
            let err = quick(name).render(16, 16, 1, &token).unwrap_err();
            assert!(err.is_cancellation(), "{name}");
        }
    }

    #[test]
    fn object_safety() {
        let generator = quick("noise");
        let boxed: Box<dyn Generator> = Box::new(generator);
        assert_eq!(boxed.name(), "noise");
    }
}
