//! Conversion of any [`Artwork`] into pixels.
//!
//! Always available (no feature gate): the `png` snapshot path and any other
//! display surface share the same conversion. Drawings go through the
//! rasterizer; pixel artworks pass through untouched.

use genart_core::canvas::PixelBuffer;
use genart_core::error::EngineError;
use genart_core::generator::Artwork;
use genart_core::CancelToken;

use crate::raster::rasterize;

/// Flattens an artwork into a BGRA buffer.
pub fn artwork_pixels(art: Artwork, cancel: &CancelToken) -> Result<PixelBuffer, EngineError> {
    match art {
        Artwork::Pixels(pixels) => Ok(pixels),
        Artwork::Drawing(drawing) => rasterize(&drawing, cancel),
    }
}

/// Flattens an artwork into RGBA8 bytes, `width * height * 4` long.
pub fn artwork_to_rgba(art: Artwork, cancel: &CancelToken) -> Result<Vec<u8>, EngineError> {
    artwork_pixels(art, cancel).map(|p| p.to_rgba())
}

#[cfg(test)]
mod tests {
    use super::*;
    use genart_core::color::Color;
    use genart_core::draw::{DrawPrimitive, Drawing};
    use glam::DVec2;

    #[test]
    fn pixel_artworks_pass_through() {
        let pixels = PixelBuffer::filled(3, 2, Color::rgb(1, 2, 3)).unwrap();
        let out = artwork_pixels(Artwork::Pixels(pixels.clone()), &CancelToken::new()).unwrap();
        assert_eq!(out, pixels);
    }

    #[test]
    fn drawings_are_rasterized_at_their_size() {
        let mut drawing = Drawing::new(12, 8, Color::BLACK);
        drawing.push(DrawPrimitive::Dot {
            center: DVec2::new(6.5, 4.5),
            radius: 2.0,
            fill: Color::RED,
            outline: None,
        });
        let out = artwork_pixels(Artwork::Drawing(drawing), &CancelToken::new()).unwrap();
        assert_eq!((out.width(), out.height()), (12, 8));
        assert_eq!(out.pixel(6, 4), Some(Color::RED));
    }

    #[test]
    fn rgba_output_reorders_channels() {
        let pixels = PixelBuffer::filled(2, 2, Color::rgb(10, 20, 30)).unwrap();
        let rgba = artwork_to_rgba(Artwork::Pixels(pixels), &CancelToken::new()).unwrap();
        assert_eq!(rgba.len(), 2 * 2 * 4);
        assert_eq!(&rgba[..4], &[10, 20, 30, 255]);
    }
}
