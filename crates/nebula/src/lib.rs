#![deny(unsafe_code)]
//! Monte-Carlo density-field ("nebula") generator.
//!
//! Millions of samples are drawn from a 2-D normal distribution centred on
//! the canvas, coloured by alternating radial bands, displaced by Perlin
//! noise and accumulated into per-pixel hit counts and colour sums. The
//! consolidated buffer is gamma-normalized into a BGRA pixel buffer.
//!
//! Work is split into a fixed number of batches, each with its own sub-seed
//! drawn from the master seed. Batches are distributed over rayon workers
//! that each own a private [`AccumulationBuffer`]; because all sums are
//! integers the result is identical for any worker count.

pub mod accumulation;

pub use accumulation::{consolidate, normalize, AccumulationBuffer};

use genart_core::color::{lerp_color, Color};
use genart_core::error::EngineError;
use genart_core::generator::{Artwork, Generator};
use genart_core::grid::checked_len;
use genart_core::noise::Perlin;
use genart_core::params::{
    check_count, check_range, param_bool, param_color, param_f64, param_u32, param_usize,
};
use genart_core::prng::Xorshift64;
use genart_core::CancelToken;
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::f64::consts::SQRT_2;

const DEFAULT_SAMPLES: u64 = 6_000_000;
const DEFAULT_NOISE_SCALE: f64 = 800.0;
const DEFAULT_STD_DEV: f64 = 0.15;
const DEFAULT_BANDS: u32 = 8;
const DEFAULT_FREQUENCY: f64 = 1.5;
const DEFAULT_PERSISTENCE: f64 = 5.0;
const DEFAULT_OCTAVES: u32 = 3;
const DEFAULT_HARD_EDGED: bool = false;
const DEFAULT_BLEND1: Color = Color::YELLOW;
const DEFAULT_BLEND2: Color = Color::RED;
/// 0 = one worker per hardware thread.
const DEFAULT_WORKERS: usize = 0;
const DEFAULT_BATCHES: usize = 64;

const MAX_NOISE_SCALE: f64 = 4000.0;
const MAX_STD_DEV: f64 = 1.0;
const MAX_BANDS: usize = 64;
const MAX_FREQUENCY: f64 = 20.0;
const MIN_PERSISTENCE: f64 = 0.01;
const MAX_PERSISTENCE: f64 = 10.0;
const MAX_OCTAVES: usize = 8;
/// Upper bound on the rayon pool size.
pub const MAX_WORKERS: usize = 256;
/// Upper bound on deterministic work units; each one owns a histogram.
pub const MAX_BATCHES: usize = 4096;

/// Noise z-slices used for the x and y displacement channels.
const Z_OFFSET_X: f64 = 0.75;
const Z_OFFSET_Y: f64 = 0.25;

/// Parameters for the nebula generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NebulaParams {
    /// Total samples drawn across all workers.
    pub samples: u64,
    /// Displacement in pixels for a full-swing noise value.
    pub noise_scale: f64,
    /// Standard deviation of the normal sample distribution, in canvas units.
    pub std_dev: f64,
    /// Number of alternating colour bands between the centre and a corner.
    pub bands: u32,
    pub frequency: f64,
    pub persistence: f64,
    pub octaves: u32,
    /// Sharp band edges instead of linear blending inside each band.
    pub hard_edged: bool,
    pub blend1: Color,
    pub blend2: Color,
    /// Worker threads; 0 uses the hardware concurrency.
    pub workers: usize,
    /// Deterministic work units, each with its own sub-seed.
    pub batches: usize,
}

impl Default for NebulaParams {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            noise_scale: DEFAULT_NOISE_SCALE,
            std_dev: DEFAULT_STD_DEV,
            bands: DEFAULT_BANDS,
            frequency: DEFAULT_FREQUENCY,
            persistence: DEFAULT_PERSISTENCE,
            octaves: DEFAULT_OCTAVES,
            hard_edged: DEFAULT_HARD_EDGED,
            blend1: DEFAULT_BLEND1,
            blend2: DEFAULT_BLEND2,
            workers: DEFAULT_WORKERS,
            batches: DEFAULT_BATCHES,
        }
    }
}

impl NebulaParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        Self {
            samples: params
                .get("samples")
                .and_then(Value::as_u64)
                .unwrap_or(DEFAULT_SAMPLES),
            noise_scale: param_f64(params, "noise_scale", DEFAULT_NOISE_SCALE),
            std_dev: param_f64(params, "std_dev", DEFAULT_STD_DEV),
            bands: param_u32(params, "bands", DEFAULT_BANDS),
            frequency: param_f64(params, "frequency", DEFAULT_FREQUENCY),
            persistence: param_f64(params, "persistence", DEFAULT_PERSISTENCE),
            octaves: param_u32(params, "octaves", DEFAULT_OCTAVES),
            hard_edged: param_bool(params, "hard_edged", DEFAULT_HARD_EDGED),
            blend1: param_color(params, "blend1", DEFAULT_BLEND1),
            blend2: param_color(params, "blend2", DEFAULT_BLEND2),
            workers: param_usize(params, "workers", DEFAULT_WORKERS),
            batches: param_usize(params, "batches", DEFAULT_BATCHES),
        }
    }

    /// Checks every field against the bounds published by the schema.
    ///
    /// `samples` above `u32::MAX` is a `NumericOverflow`: a single pixel
    /// could otherwise exceed its hit counter.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.samples > u32::MAX as u64 {
            return Err(EngineError::NumericOverflow(format!(
                "{} samples exceeds the per-pixel hit counter range ({})",
                self.samples,
                u32::MAX
            )));
        }
        check_count("bands", self.bands as usize, 1, MAX_BANDS)?;
        check_count("octaves", self.octaves as usize, 1, MAX_OCTAVES)?;
        check_count("workers", self.workers, 0, MAX_WORKERS)?;
        check_count("batches", self.batches, 1, MAX_BATCHES)?;
        check_range("std_dev", self.std_dev, 0.0, MAX_STD_DEV)?;
        check_range("noise_scale", self.noise_scale, 0.0, MAX_NOISE_SCALE)?;
        check_range("frequency", self.frequency, 0.0, MAX_FREQUENCY)?;
        check_range("persistence", self.persistence, MIN_PERSISTENCE, MAX_PERSISTENCE)?;
        Perlin::with_octaves(0, self.octaves, self.persistence, self.frequency).map(|_| ())
    }
}

/// Observable stages of a nebula run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NebulaPhase {
    Idle,
    Accumulating,
    Consolidating,
    Normalizing,
    Done,
    Cancelled,
}

/// One unit of accumulation work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    pub seed: u64,
    pub samples: u64,
}

/// Splits `total` samples into `count` batches whose sizes differ by at most
/// one, each with a sub-seed drawn from `rng`.
pub fn plan_batches(total: u64, count: usize, rng: &mut Xorshift64) -> Vec<Batch> {
    let count = count.max(1) as u64;
    let base = total / count;
    let extra = total % count;
    (0..count)
        .map(|i| Batch {
            seed: rng.next_seed(),
            samples: base + u64::from(i < extra),
        })
        .collect()
}

/// Colour of a normalized sample point from its radial band.
pub fn band_color(xn: f64, yn: f64, params: &NebulaParams) -> Color {
    let dist = ((xn - 0.5).powi(2) + (yn - 0.5).powi(2)).sqrt();
    let band = params.bands as f64 * dist / SQRT_2;
    let index = band.floor();
    let frac = band - index;
    let even = (index as u64) % 2 == 0;

    match (params.hard_edged, even) {
        (true, true) => params.blend1,
        (true, false) => params.blend2,
        (false, true) => lerp_color(params.blend2, params.blend1, frac),
        (false, false) => lerp_color(params.blend1, params.blend2, frac),
    }
}

/// Pixel hit by a normalized sample, or `None` when it lands off-canvas.
pub fn sample_pixel(
    xn: f64,
    yn: f64,
    width: usize,
    height: usize,
    noise: &Perlin,
    noise_scale: f64,
) -> Option<(usize, usize)> {
    let px = xn * width as f64 + noise_scale * (noise.value(xn, yn, Z_OFFSET_X) - 0.5);
    let py = yn * height as f64 + noise_scale * (noise.value(xn, yn, Z_OFFSET_Y) - 0.5);
    let x = (px + 0.5).floor();
    let y = (py + 0.5).floor();
    if x < 0.0 || y < 0.0 || x >= width as f64 || y >= height as f64 {
        return None;
    }
    Some((x as usize, y as usize))
}

/// Draws one batch into `buffer`, polling `cancel` per sample.
fn run_batch(
    buffer: &mut AccumulationBuffer,
    batch: Batch,
    noise: &Perlin,
    params: &NebulaParams,
    cancel: &CancelToken,
) -> Result<(), EngineError> {
    let (width, height) = (buffer.width(), buffer.height());
    let mut rng = Xorshift64::new(batch.seed);
    for _ in 0..batch.samples {
        cancel.check()?;
        let xn = rng.next_gaussian(0.5, params.std_dev);
        let yn = rng.next_gaussian(0.5, params.std_dev);
        let color = band_color(xn, yn, params);
        if let Some((x, y)) = sample_pixel(xn, yn, width, height, noise, params.noise_scale) {
            buffer.record(x, y, color);
        }
    }
    Ok(())
}

/// Nebula generator.
#[derive(Debug, Clone, Default)]
pub struct Nebula {
    params: NebulaParams,
}

impl Nebula {
    /// Creates a generator after validating `params`.
    pub fn new(params: NebulaParams) -> Result<Self, EngineError> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Creates a generator from a lenient JSON params object.
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        Self::new(NebulaParams::from_json(params))
    }

    pub fn nebula_params(&self) -> &NebulaParams {
        &self.params
    }

    /// Runs the accumulation phase on the configured worker pool and returns
    /// one buffer per worker.
    pub fn accumulate(
        &self,
        width: usize,
        height: usize,
        seed: u64,
        cancel: &CancelToken,
    ) -> Result<Vec<AccumulationBuffer>, EngineError> {
        checked_len(width, height)?;
        let params = self.params;
        let mut rng = Xorshift64::new(seed);
        let noise = Perlin::with_octaves(
            seed.wrapping_add(1),
            params.octaves,
            params.persistence,
            params.frequency,
        )?;
        let batches = plan_batches(params.samples, params.batches, &mut rng);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(params.workers)
            .build()
            .map_err(|e| EngineError::invalid_param("workers", e.to_string()))?;
        let workers = pool.current_num_threads().max(1);
        debug!(
            "nebula: {} samples in {} batches over {workers} workers",
            params.samples,
            batches.len()
        );

        pool.install(|| {
            (0..workers)
                .into_par_iter()
                .map(|worker| -> Result<AccumulationBuffer, EngineError> {
                    let mut buffer = AccumulationBuffer::new(width, height)?;
                    for batch in batches.iter().skip(worker).step_by(workers) {
                        run_batch(&mut buffer, *batch, &noise, &params, cancel)?;
                    }
                    Ok(buffer)
                })
                .collect::<Result<Vec<_>, EngineError>>()
        })
    }

    /// Full run, reporting each phase transition to `observer`.
    pub fn render(
        &self,
        width: usize,
        height: usize,
        seed: u64,
        cancel: &CancelToken,
        observer: &mut dyn FnMut(NebulaPhase),
    ) -> Result<genart_core::PixelBuffer, EngineError> {
        observer(NebulaPhase::Idle);
        let result = self.render_phases(width, height, seed, cancel, observer);
        match &result {
            Ok(_) => observer(NebulaPhase::Done),
            Err(e) if e.is_cancellation() => observer(NebulaPhase::Cancelled),
            Err(_) => {}
        }
        result
    }

    fn render_phases(
        &self,
        width: usize,
        height: usize,
        seed: u64,
        cancel: &CancelToken,
        observer: &mut dyn FnMut(NebulaPhase),
    ) -> Result<genart_core::PixelBuffer, EngineError> {
        observer(NebulaPhase::Accumulating);
        let parts = self.accumulate(width, height, seed, cancel)?;

        observer(NebulaPhase::Consolidating);
        let total = consolidate(parts)?;
        debug!(
            "nebula: {} hits on canvas, max {} per pixel",
            total.total_hits(),
            total.max_hits()
        );

        observer(NebulaPhase::Normalizing);
        normalize(&total, cancel)
    }
}

impl Generator for Nebula {
    fn name(&self) -> &'static str {
        "nebula"
    }

    fn extension(&self) -> &'static str {
        "neb"
    }

    fn generate(
        &self,
        width: usize,
        height: usize,
        seed: u64,
        cancel: &CancelToken,
    ) -> Result<Artwork, EngineError> {
        let pixels = self.render(width, height, seed, cancel, &mut |phase| {
            debug!("nebula phase: {phase:?}");
        })?;
        info!("nebula: rendered {width}x{height} (seed {seed})");
        Ok(Artwork::Pixels(pixels))
    }

    fn params(&self) -> Value {
        json!({
            "samples": self.params.samples,
            "noise_scale": self.params.noise_scale,
            "std_dev": self.params.std_dev,
            "bands": self.params.bands,
            "frequency": self.params.frequency,
            "persistence": self.params.persistence,
            "octaves": self.params.octaves,
            "hard_edged": self.params.hard_edged,
            "blend1": self.params.blend1,
            "blend2": self.params.blend2,
            "workers": self.params.workers,
            "batches": self.params.batches,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "samples": {
                "type": "integer",
                "default": DEFAULT_SAMPLES,
                "min": 0,
                "max": u32::MAX,
                "description": "Total samples scattered across all workers"
            },
            "noise_scale": {
                "type": "number",
                "default": DEFAULT_NOISE_SCALE,
                "min": 0.0,
                "max": MAX_NOISE_SCALE,
                "description": "Noise displacement in pixels"
            },
            "std_dev": {
                "type": "number",
                "default": DEFAULT_STD_DEV,
                "min": 0.0,
                "max": MAX_STD_DEV,
                "description": "Spread of the normal sample distribution (canvas units)"
            },
            "bands": {
                "type": "integer",
                "default": DEFAULT_BANDS,
                "min": 1,
                "max": MAX_BANDS,
                "description": "Alternating radial colour bands"
            },
            "frequency": {
                "type": "number",
                "default": DEFAULT_FREQUENCY,
                "min": 0.0,
                "max": MAX_FREQUENCY,
                "description": "Base noise frequency"
            },
            "persistence": {
                "type": "number",
                "default": DEFAULT_PERSISTENCE,
                "min": MIN_PERSISTENCE,
                "max": MAX_PERSISTENCE,
                "description": "Amplitude factor between noise octaves"
            },
            "octaves": {
                "type": "integer",
                "default": DEFAULT_OCTAVES,
                "min": 1,
                "max": MAX_OCTAVES,
                "description": "Noise octaves"
            },
            "hard_edged": {
                "type": "boolean",
                "default": DEFAULT_HARD_EDGED,
                "description": "Sharp band edges instead of blended bands"
            },
            "blend1": {
                "type": "color",
                "default": DEFAULT_BLEND1,
                "description": "Colour of even bands"
            },
            "blend2": {
                "type": "color",
                "default": DEFAULT_BLEND2,
                "description": "Colour of odd bands"
            },
            "workers": {
                "type": "integer",
                "default": DEFAULT_WORKERS,
                "min": 0,
                "max": MAX_WORKERS,
                "description": "Worker threads (0 = hardware concurrency); does not affect output"
            },
            "batches": {
                "type": "integer",
                "default": DEFAULT_BATCHES,
                "min": 1,
                "max": MAX_BATCHES,
                "description": "Deterministic work units, each with its own sub-seed"
            }
        })
    }

    fn load_params(&mut self, params: &Value) -> Result<(), EngineError> {
        let loaded: NebulaParams = serde_json::from_value(params.clone())?;
        loaded.validate()?;
        self.params = loaded;
        Ok(())
    }
}
