#![deny(unsafe_code)]
//! Grayscale preview of the Perlin noise field.
//!
//! Each pixel is `value(x / width, y / height) · 255`, so the whole canvas
//! spans one unit of noise space scaled by `frequency`. Useful for tuning the
//! noise settings the other generators consume.

use genart_core::canvas::PixelBuffer;
use genart_core::color::Color;
use genart_core::error::EngineError;
use genart_core::generator::{Artwork, Generator};
use genart_core::noise::Perlin;
use genart_core::params::{param_f64, param_u32};
use genart_core::CancelToken;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const DEFAULT_FREQUENCY: f64 = 7.0;
const DEFAULT_PERSISTENCE: f64 = 0.5;
const DEFAULT_OCTAVES: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    pub frequency: f64,
    pub persistence: f64,
    pub octaves: u32,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_FREQUENCY,
            persistence: DEFAULT_PERSISTENCE,
            octaves: DEFAULT_OCTAVES,
        }
    }
}

impl NoiseParams {
    pub fn from_json(params: &Value) -> Self {
        Self {
            frequency: param_f64(params, "frequency", DEFAULT_FREQUENCY),
            persistence: param_f64(params, "persistence", DEFAULT_PERSISTENCE),
            octaves: param_u32(params, "octaves", DEFAULT_OCTAVES),
        }
    }

    fn field(&self, seed: u64) -> Result<Perlin, EngineError> {
        Perlin::with_octaves(seed, self.octaves, self.persistence, self.frequency)
    }
}

/// Noise preview generator.
#[derive(Debug, Clone, Default)]
pub struct NoiseImage {
    params: NoiseParams,
}

impl NoiseImage {
    pub fn new(params: NoiseParams) -> Result<Self, EngineError> {
        params.field(0)?;
        Ok(Self { params })
    }

    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        Self::new(NoiseParams::from_json(params))
    }

    pub fn noise_params(&self) -> &NoiseParams {
        &self.params
    }
}

impl Generator for NoiseImage {
    fn name(&self) -> &'static str {
        "noise"
    }

    fn extension(&self) -> &'static str {
        "nse"
    }

    fn generate(
        &self,
        width: usize,
        height: usize,
        seed: u64,
        cancel: &CancelToken,
    ) -> Result<Artwork, EngineError> {
        let mut pixels = PixelBuffer::new(width, height)?;
        let noise = self.params.field(seed)?;
        let (w, h) = (width as f64, height as f64);
        for y in 0..height {
            cancel.check()?;
            for x in 0..width {
                let gray = (noise.value2(x as f64 / w, y as f64 / h) * 255.0) as u8;
                pixels.set_pixel(x, y, Color::rgb(gray, gray, gray));
            }
        }
        info!("noise: {width}x{height} preview, {} octaves", self.params.octaves);
        Ok(Artwork::Pixels(pixels))
    }

    fn params(&self) -> Value {
        json!({
            "frequency": self.params.frequency,
            "persistence": self.params.persistence,
            "octaves": self.params.octaves,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "frequency": {
                "type": "number", "default": DEFAULT_FREQUENCY, "min": 0.1, "max": 50.0,
                "description": "Noise cycles across the canvas"
            },
            "persistence": {
                "type": "number", "default": DEFAULT_PERSISTENCE, "min": 0.05, "max": 10.0,
                "description": "Amplitude factor per octave"
            },
            "octaves": {
                "type": "integer", "default": DEFAULT_OCTAVES, "min": 1, "max": 8,
                "description": "Number of noise layers"
            }
        })
    }

    fn load_params(&mut self, params: &Value) -> Result<(), EngineError> {
        let loaded: NoiseParams = serde_json::from_value(params.clone())?;
        loaded.field(0)?;
        self.params = loaded;
        Ok(())
    }
}
