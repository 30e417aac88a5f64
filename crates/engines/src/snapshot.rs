//! PNG output of a [`PixelBuffer`].
//!
//! Feature-gated behind `png` (default on) so that embedders can depend on
//! the registry without pulling in the `image` crate.

use genart_core::canvas::PixelBuffer;
use genart_core::error::EngineError;
use log::info;
use std::path::Path;

/// Writes `pixels` as an RGBA PNG.
///
/// Returns `EngineError::InvalidDimensions` if the buffer dimensions overflow
/// `u32`, or `EngineError::Io` on write failure.
pub fn write_png(pixels: &PixelBuffer, path: &Path) -> Result<(), EngineError> {
    let w = u32::try_from(pixels.width()).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(pixels.height()).map_err(|_| EngineError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, pixels.to_rgba())
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))?;
    info!("wrote {w}x{h} PNG to {}", path.display());
    Ok(())
}
