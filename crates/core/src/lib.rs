#![deny(unsafe_code)]
//! Core types and traits for the genart generators.
//!
//! Provides the `Generator` trait, seeded `Perlin` noise, the `Xorshift64`
//! PRNG, `Color`/`Hsb` and the five-slot `Palette`, output types
//! (`PixelBuffer`, `Drawing`), cooperative cancellation, `Seed` documents
//! and parameter helpers.

pub mod cancel;
pub mod canvas;
pub mod color;
pub mod draw;
pub mod error;
pub mod generator;
pub mod grid;
pub mod math;
pub mod noise;
pub mod palette;
pub mod params;
pub mod prng;
pub mod seed;

pub use cancel::CancelToken;
pub use canvas::PixelBuffer;
pub use color::{lerp_color, Color, Hsb};
pub use draw::{DrawPrimitive, Drawing, Outline};
pub use error::EngineError;
pub use generator::{Artwork, Generator};
pub use grid::Grid;
pub use self::noise::Perlin;
pub use palette::{Palette, PaletteEntry, PALETTE_SIZE};
pub use prng::Xorshift64;
pub use seed::Seed;
