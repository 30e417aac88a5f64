//! Raster output of the pixel generators.
//!
//! A [`PixelBuffer`] is `width * height * 4` bytes in BGRA order, which is
//! the layout display surfaces expect. [`PixelBuffer::to_rgba`] converts for
//! image encoders.

use crate::color::Color;
use crate::error::EngineError;
use crate::grid::checked_len;

/// Fixed-size BGRA pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Buffer filled with opaque black.
    ///
    /// Returns `EngineError::InvalidDimensions` for zero or overflowing sizes.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        Self::filled(width, height, Color::BLACK)
    }

    /// Buffer filled with `color`.
    pub fn filled(width: usize, height: usize, color: Color) -> Result<Self, EngineError> {
        let len = checked_len(width, height)?
            .checked_mul(4)
            .ok_or(EngineError::InvalidDimensions)?;
        let mut data = Vec::with_capacity(len);
        for _ in 0..len / 4 {
            data.extend_from_slice(&[color.b, color.g, color.r, color.a]);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw BGRA bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Color at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        let px = &self.data[i..i + 4];
        Some(Color::rgba(px[2], px[1], px[0], px[3]))
    }

    /// Writes `color` at `(x, y)`; silently ignores out-of-range coordinates.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y * self.width + x) * 4;
        self.data[i..i + 4].copy_from_slice(&[color.b, color.g, color.r, color.a]);
    }

    /// Same pixels reordered as RGBA.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(4) {
            out.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
        }
        out
    }
}
