//! Per-worker hit/colour accumulators and their consolidation.
//!
//! Hit counts are `u32` and channel sums `u64`, both added with saturation.
//! The generator caps total samples at `u32::MAX`, so saturation is never
//! reached in practice.

use genart_core::canvas::PixelBuffer;
use genart_core::color::Color;
use genart_core::error::EngineError;
use genart_core::grid::Grid;
use genart_core::CancelToken;

/// Exponent of the gamma curve applied to `hits / max_hits`.
pub const GAMMA_EXPONENT: f64 = 1.0 / 5.0;

/// Summed colour and hit counts for one canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccumulationBuffer {
    hits: Grid<u32>,
    red: Grid<u64>,
    green: Grid<u64>,
    blue: Grid<u64>,
    max_hits: u32,
}

impl AccumulationBuffer {
    /// Returns `EngineError::InvalidDimensions` for zero or overflowing sizes.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        Ok(Self {
            hits: Grid::new(width, height)?,
            red: Grid::new(width, height)?,
            green: Grid::new(width, height)?,
            blue: Grid::new(width, height)?,
            max_hits: 0,
        })
    }

    pub fn width(&self) -> usize {
        self.hits.width()
    }

    pub fn height(&self) -> usize {
        self.hits.height()
    }

    pub fn hits(&self) -> &Grid<u32> {
        &self.hits
    }

    pub fn max_hits(&self) -> u32 {
        self.max_hits
    }

    /// Sum of every pixel's hit count.
    pub fn total_hits(&self) -> u64 {
        self.hits.data().iter().map(|&h| h as u64).sum()
    }

    /// Summed `(r, g, b)` at `(x, y)`.
    pub fn channel_sums(&self, x: usize, y: usize) -> Option<(u64, u64, u64)> {
        let i = self.hits.index(x, y)?;
        Some((
            self.red.data()[i],
            self.green.data()[i],
            self.blue.data()[i],
        ))
    }

    /// Adds one sample of `color` at `(x, y)`; out-of-range coordinates are ignored.
    pub fn record(&mut self, x: usize, y: usize, color: Color) {
        let Some(i) = self.hits.index(x, y) else {
            return;
        };
        let hits = &mut self.hits.data_mut()[i];
        *hits = hits.saturating_add(1);
        let h = *hits;
        add_channel(&mut self.red, i, color.r);
        add_channel(&mut self.green, i, color.g);
        add_channel(&mut self.blue, i, color.b);
        self.max_hits = self.max_hits.max(h);
    }

    /// Adds `other` element-wise into `self` and recomputes `max_hits` from
    /// the summed grid.
    pub fn merge(&mut self, other: &AccumulationBuffer) -> Result<(), EngineError> {
        self.hits.merge_with(&other.hits, u32::saturating_add)?;
        self.red.merge_with(&other.red, u64::saturating_add)?;
        self.green.merge_with(&other.green, u64::saturating_add)?;
        self.blue.merge_with(&other.blue, u64::saturating_add)?;
        self.max_hits = self.hits.data().iter().copied().max().unwrap_or(0);
        Ok(())
    }
}

fn add_channel(grid: &mut Grid<u64>, i: usize, value: u8) {
    let slot = &mut grid.data_mut()[i];
    *slot = slot.saturating_add(value as u64);
}

/// Sums every worker's buffer into one.
///
/// The global maximum is taken from the summed grid, never from the
/// per-worker maxima. Returns `InvalidParameter` for an empty list and
/// `DimensionMismatch` if the buffers disagree in size.
pub fn consolidate(parts: Vec<AccumulationBuffer>) -> Result<AccumulationBuffer, EngineError> {
    let mut parts = parts.into_iter();
    let mut total = parts
        .next()
        .ok_or_else(|| EngineError::invalid_param("workers", "nothing to consolidate"))?;
    for part in parts {
        total.merge(&part)?;
    }
    Ok(total)
}

/// Gamma-normalizes a consolidated buffer into BGRA pixels.
///
/// For `hits > 0`: `g = (hits / max_hits)^(1/5)` and each channel is
/// `trunc(sum * g / hits)`. Pixels with no hits are opaque black. Alpha is
/// always 255. Polls `cancel` once per pixel.
pub fn normalize(
    buffer: &AccumulationBuffer,
    cancel: &CancelToken,
) -> Result<PixelBuffer, EngineError> {
    let (width, height) = (buffer.width(), buffer.height());
    let mut out = PixelBuffer::new(width, height)?;
    let max = buffer.max_hits as f64;

    for y in 0..height {
        for x in 0..width {
            cancel.check()?;
            let i = y * width + x;
            let hits = buffer.hits.data()[i];
            if hits == 0 {
                continue;
            }
            let gamma = (hits as f64 / max).powf(GAMMA_EXPONENT);
            let mult = gamma / hits as f64;
            let channel = |sum: u64| (sum as f64 * mult).clamp(0.0, 255.0) as u8;
            out.set_pixel(
                x,
                y,
                Color::rgb(
                    channel(buffer.red.data()[i]),
                    channel(buffer.green.data()[i]),
                    channel(buffer.blue.data()[i]),
                ),
            );
        }
    }
    Ok(out)
}
