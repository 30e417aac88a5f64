#![deny(unsafe_code)]
//! Jittered-grid mosaic of circles and squares.
//!
//! The canvas is split into `grid_count × grid_count` square cells. Cells are
//! visited in a shuffled order and each gets one shape: a circle or a rotated
//! square, drawn as a stack of concentric copies that shrink toward the
//! centre, each with its own palette colour.

use genart_core::color::Color;
use genart_core::draw::{DrawPrimitive, Drawing, Outline};
use genart_core::error::EngineError;
use genart_core::generator::{Artwork, Generator};
use genart_core::grid::checked_len;
use genart_core::palette::Palette;
use genart_core::params::{
    check_count, check_range, param_bool, param_color, param_f64, param_palette, param_u32,
    param_usize,
};
use genart_core::prng::Xorshift64;
use genart_core::CancelToken;
use glam::DVec2;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::f64::consts::PI;

const DEFAULT_GRID_COUNT: usize = 20;
const DEFAULT_BASE_SCALE: f64 = 0.5;
const DEFAULT_MAX_SCALE: f64 = 100.1;
const DEFAULT_POS_OFFSET: f64 = 0.1;
const DEFAULT_PCT_CIRCLES: f64 = 50.0;
const DEFAULT_ANGLE_VARIANCE: f64 = 0.01;
const DEFAULT_INSETS_MEAN: f64 = 1.0;
const DEFAULT_RANDOM_INSETS: bool = false;
const DEFAULT_ALPHA: u8 = 255;
const DEFAULT_BORDER_WIDTH: f64 = 0.0;
const DEFAULT_BORDER_COLOR: Color = Color::BLACK;
const DEFAULT_USE_CIRCLE_COLORS: bool = false;

/// Upper bound on insets per shape, fixed or drawn.
pub const MAX_INSETS: usize = 64;

const MAX_GRID_COUNT: usize = 200;
const MAX_BASE_SCALE: f64 = 2.0;
const MIN_MAX_SCALE: f64 = 100.0;
const MAX_MAX_SCALE: f64 = 400.0;
const MAX_POS_OFFSET: f64 = 100.0;
const MAX_ANGLE_VARIANCE: f64 = 180.0;
const MAX_BORDER_WIDTH: f64 = 20.0;

/// Parameters for the shapes generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapesParams {
    /// Cells per side.
    pub grid_count: usize,
    /// Shape diameter as a fraction of the cell size.
    pub base_scale: f64,
    /// Upper bound of the per-shape scale, in percent of the base size.
    pub max_scale: f64,
    /// Centre jitter per axis, in percent of the cell size.
    pub pos_offset: f64,
    /// Probability of a circle, in percent.
    pub pct_circles: f64,
    /// Square rotation range, in degrees either way.
    pub angle_variance: f64,
    /// Inset count, or the mean of the half-normal draw with `random_insets`.
    pub insets_mean: f64,
    pub random_insets: bool,
    /// Alpha shared by every fill.
    pub alpha: u8,
    /// Outline width of the outermost copy; 0 disables outlines.
    pub border_width: f64,
    pub border_color: Color,
    pub circle_palette: Palette,
    pub square_palette: Palette,
    /// Colour squares from the circle palette.
    pub use_circle_colors: bool,
}

impl Default for ShapesParams {
    fn default() -> Self {
        Self {
            grid_count: DEFAULT_GRID_COUNT,
            base_scale: DEFAULT_BASE_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            pos_offset: DEFAULT_POS_OFFSET,
            pct_circles: DEFAULT_PCT_CIRCLES,
            angle_variance: DEFAULT_ANGLE_VARIANCE,
            insets_mean: DEFAULT_INSETS_MEAN,
            random_insets: DEFAULT_RANDOM_INSETS,
            alpha: DEFAULT_ALPHA,
            border_width: DEFAULT_BORDER_WIDTH,
            border_color: DEFAULT_BORDER_COLOR,
            circle_palette: Palette::single(Color::RED),
            square_palette: Palette::single(Color::BLUE),
            use_circle_colors: DEFAULT_USE_CIRCLE_COLORS,
        }
    }
}

impl ShapesParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    /// Malformed palettes fall back whole.
    pub fn from_json(params: &Value) -> Self {
        let defaults = Self::default();
        Self {
            grid_count: param_usize(params, "grid_count", DEFAULT_GRID_COUNT),
            base_scale: param_f64(params, "base_scale", DEFAULT_BASE_SCALE),
            max_scale: param_f64(params, "max_scale", DEFAULT_MAX_SCALE),
            pos_offset: param_f64(params, "pos_offset", DEFAULT_POS_OFFSET),
            pct_circles: param_f64(params, "pct_circles", DEFAULT_PCT_CIRCLES),
            angle_variance: param_f64(params, "angle_variance", DEFAULT_ANGLE_VARIANCE),
            insets_mean: param_f64(params, "insets_mean", DEFAULT_INSETS_MEAN),
            random_insets: param_bool(params, "random_insets", DEFAULT_RANDOM_INSETS),
            alpha: param_u32(params, "alpha", DEFAULT_ALPHA as u32).min(255) as u8,
            border_width: param_f64(params, "border_width", DEFAULT_BORDER_WIDTH),
            border_color: param_color(params, "border_color", DEFAULT_BORDER_COLOR),
            circle_palette: param_palette(params, "circle_palette", &defaults.circle_palette),
            square_palette: param_palette(params, "square_palette", &defaults.square_palette),
            use_circle_colors: param_bool(params, "use_circle_colors", DEFAULT_USE_CIRCLE_COLORS),
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        check_count("grid_count", self.grid_count, 1, MAX_GRID_COUNT)?;
        check_range("base_scale", self.base_scale, 0.0, MAX_BASE_SCALE)?;
        check_range("max_scale", self.max_scale, MIN_MAX_SCALE, MAX_MAX_SCALE)?;
        check_range("pos_offset", self.pos_offset, 0.0, MAX_POS_OFFSET)?;
        check_range("pct_circles", self.pct_circles, 0.0, 100.0)?;
        check_range("angle_variance", self.angle_variance, 0.0, MAX_ANGLE_VARIANCE)?;
        check_range("insets_mean", self.insets_mean, 0.0, MAX_INSETS as f64)?;
        check_range("border_width", self.border_width, 0.0, MAX_BORDER_WIDTH)?;
        if self.pct_circles > 0.0 || self.use_circle_colors {
            require_enabled(&self.circle_palette, "circle_palette")?;
        }
        if self.pct_circles < 100.0 && !self.use_circle_colors {
            require_enabled(&self.square_palette, "square_palette")?;
        }
        Ok(())
    }

    fn square_colors(&self) -> &Palette {
        if self.use_circle_colors {
            &self.circle_palette
        } else {
            &self.square_palette
        }
    }
}

fn require_enabled(palette: &Palette, name: &str) -> Result<(), EngineError> {
    if palette.enabled_count() == 0 {
        return Err(EngineError::InvalidPalette(format!(
            "{name} has no enabled entries"
        )));
    }
    Ok(())
}

/// Geometry chosen for one cell before colouring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub center: DVec2,
    /// Radius of the outermost copy (half side for squares).
    pub radius: f64,
    pub circle: bool,
    pub insets: usize,
    /// Rotation in radians; zero for circles.
    pub angle: f64,
}

/// Shapes generator.
#[derive(Debug, Clone, Default)]
pub struct ShapesGenerator {
    params: ShapesParams,
}

impl ShapesGenerator {
    pub fn new(params: ShapesParams) -> Result<Self, EngineError> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Creates a generator from a lenient JSON params object.
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        Self::new(ShapesParams::from_json(params))
    }

    pub fn shapes_params(&self) -> &ShapesParams {
        &self.params
    }

    /// Whole-percent scale in `[100, max_scale)`, or exactly 100 when that
    /// range holds no integer above 100.
    fn scale_percent(&self, rng: &mut Xorshift64) -> f64 {
        let span = (self.params.max_scale.floor() as i64 - 100).max(1) as usize;
        (100 + rng.next_usize(span)) as f64
    }

    fn inset_count(&self, rng: &mut Xorshift64) -> usize {
        let mean = self.params.insets_mean;
        if !self.params.random_insets {
            return mean.round() as usize;
        }
        // Half-normal with this sigma has expectation `mean`.
        let sigma = mean * (PI / 2.0).sqrt();
        (rng.next_gaussian(0.0, sigma).abs().round() as usize).min(MAX_INSETS)
    }

    /// Draws the geometry for cell `(ix, iy)`.
    pub fn place(&self, ix: usize, iy: usize, cell: f64, rng: &mut Xorshift64) -> Placement {
        let p = &self.params;
        let jitter = p.pos_offset / 100.0;
        let center = DVec2::new(
            cell * (ix as f64 + 0.5 + rng.next_symmetric(1.0) * jitter),
            cell * (iy as f64 + 0.5 + rng.next_symmetric(1.0) * jitter),
        );
        let base_radius = cell * p.base_scale / 2.0;
        let radius = base_radius * self.scale_percent(rng) / 100.0;
        let circle = rng.next_bool(p.pct_circles / 100.0);
        let insets = self.inset_count(rng);
        let angle = if circle {
            0.0
        } else {
            rng.next_symmetric(p.angle_variance).to_radians()
        };
        Placement {
            center,
            radius,
            circle,
            insets,
            angle,
        }
    }

    /// Appends the concentric copies of one placement, outermost first.
    fn emit(
        &self,
        shape: &Placement,
        rng: &mut Xorshift64,
        out: &mut Drawing,
    ) -> Result<(), EngineError> {
        let p = &self.params;
        let palette = if shape.circle {
            &p.circle_palette
        } else {
            p.square_colors()
        };
        let copies = shape.insets + 1;
        for k in 0..copies {
            let r = shape.radius * (copies - k) as f64 / copies as f64;
            let fill = palette.select_color(rng)?.with_alpha(p.alpha);
            let outline = (k == 0 && p.border_width > 0.0).then_some(Outline {
                color: p.border_color,
                width: p.border_width,
            });
            out.push(if shape.circle {
                DrawPrimitive::Ellipse {
                    center: shape.center,
                    rx: r,
                    ry: r,
                    fill,
                    outline,
                }
            } else {
                DrawPrimitive::RotatedRect {
                    center: shape.center,
                    half_width: r,
                    half_height: r,
                    angle_radians: shape.angle,
                    fill,
                    outline,
                }
            });
        }
        Ok(())
    }
}

impl Generator for ShapesGenerator {
    fn name(&self) -> &'static str {
        "shapes"
    }

    fn extension(&self) -> &'static str {
        "shp"
    }

    fn generate(
        &self,
        width: usize,
        height: usize,
        seed: u64,
        cancel: &CancelToken,
    ) -> Result<Artwork, EngineError> {
        checked_len(width, height)?;
        let n = self.params.grid_count;
        if width != height {
            warn!("shapes: cells are sized from the width; {width}x{height} leaves rows uncovered or clipped");
        }
        let cell = width as f64 / n as f64;
        let mut rng = Xorshift64::new(seed);

        let mut cells: Vec<(usize, usize)> = (0..n)
            .flat_map(|ix| (0..n).map(move |iy| (ix, iy)))
            .collect();
        rng.shuffle(&mut cells);
        debug!("shapes: {} cells of {cell:.2}px", cells.len());

        let mut drawing = Drawing::new(width, height, Color::BLACK);
        let mut circles = 0usize;
        for (ix, iy) in cells {
            cancel.check()?;
            let shape = self.place(ix, iy, cell, &mut rng);
            circles += shape.circle as usize;
            self.emit(&shape, &mut rng, &mut drawing)?;
        }
        info!(
            "shapes: {} cells, {circles} circles, {} primitives ({width}x{height}, seed {seed})",
            n * n,
            drawing.len()
        );
        Ok(Artwork::Drawing(drawing))
    }

    fn params(&self) -> Value {
        let p = &self.params;
        json!({
            "grid_count": p.grid_count,
            "base_scale": p.base_scale,
            "max_scale": p.max_scale,
            "pos_offset": p.pos_offset,
            "pct_circles": p.pct_circles,
            "angle_variance": p.angle_variance,
            "insets_mean": p.insets_mean,
            "random_insets": p.random_insets,
            "alpha": p.alpha,
            "border_width": p.border_width,
            "border_color": p.border_color,
            "circle_palette": p.circle_palette,
            "square_palette": p.square_palette,
            "use_circle_colors": p.use_circle_colors,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "grid_count": {
                "type": "integer", "default": DEFAULT_GRID_COUNT, "min": 1, "max": MAX_GRID_COUNT,
                "description": "Cells per side"
            },
            "base_scale": {
                "type": "number", "default": DEFAULT_BASE_SCALE, "min": 0.0, "max": MAX_BASE_SCALE,
                "description": "Shape diameter as a fraction of the cell"
            },
            "max_scale": {
                "type": "number", "default": DEFAULT_MAX_SCALE, "min": MIN_MAX_SCALE, "max": MAX_MAX_SCALE,
                "description": "Largest random scale in percent"
            },
            "pos_offset": {
                "type": "number", "default": DEFAULT_POS_OFFSET, "min": 0.0, "max": MAX_POS_OFFSET,
                "description": "Centre jitter in percent of the cell"
            },
            "pct_circles": {
                "type": "number", "default": DEFAULT_PCT_CIRCLES, "min": 0.0, "max": 100.0,
                "description": "Percentage of cells holding circles"
            },
            "angle_variance": {
                "type": "number", "default": DEFAULT_ANGLE_VARIANCE, "min": 0.0, "max": MAX_ANGLE_VARIANCE,
                "description": "Square rotation range in degrees"
            },
            "insets_mean": {
                "type": "number", "default": DEFAULT_INSETS_MEAN, "min": 0.0, "max": MAX_INSETS,
                "description": "Concentric insets per shape"
            },
            "random_insets": {
                "type": "boolean", "default": DEFAULT_RANDOM_INSETS,
                "description": "Draw inset counts from a half-normal around insets_mean"
            },
            "alpha": {
                "type": "integer", "default": DEFAULT_ALPHA, "min": 0, "max": 255,
                "description": "Fill alpha"
            },
            "border_width": {
                "type": "number", "default": DEFAULT_BORDER_WIDTH, "min": 0.0, "max": MAX_BORDER_WIDTH,
                "description": "Outline width of the outermost copy; 0 disables"
            },
            "border_color": {
                "type": "color", "default": DEFAULT_BORDER_COLOR,
                "description": "Outline colour"
            },
            "circle_palette": {
                "type": "palette", "default": Palette::single(Color::RED),
                "description": "Circle colours"
            },
            "square_palette": {
                "type": "palette", "default": Palette::single(Color::BLUE),
                "description": "Square colours"
            },
            "use_circle_colors": {
                "type": "boolean", "default": DEFAULT_USE_CIRCLE_COLORS,
                "description": "Colour squares from the circle palette"
            }
        })
    }

    fn load_params(&mut self, params: &Value) -> Result<(), EngineError> {
        let loaded: ShapesParams = serde_json::from_value(params.clone())?;
        loaded.validate()?;
        self.params = loaded;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genart_core::palette::{PaletteEntry, PALETTE_SIZE};

    fn generator(params: ShapesParams) -> ShapesGenerator {
        ShapesGenerator::new(params).unwrap()
    }

    fn draw(gen: &ShapesGenerator, size: usize, seed: u64) -> Drawing {
        match gen.generate(size, size, seed, &CancelToken::new()).unwrap() {
            Artwork::Drawing(d) => d,
            other => panic!("expected a drawing, got {other:?}"),
        }
    }

    fn center_of(p: &DrawPrimitive) -> DVec2 {
        match p {
            DrawPrimitive::Ellipse { center, .. } | DrawPrimitive::RotatedRect { center, .. } => {
                *center
            }
            other => panic!("unexpected primitive {other:?}"),
        }
    }

    fn radius_of(p: &DrawPrimitive) -> f64 {
        match p {
            DrawPrimitive::Ellipse { rx, ry, .. } => {
                assert_eq!(rx, ry);
                *rx
            }
            DrawPrimitive::RotatedRect {
                half_width,
                half_height,
                ..
            } => {
                assert_eq!(half_width, half_height);
                *half_width
            }
            other => panic!("unexpected primitive {other:?}"),
        }
    }

    #[test]
    fn default_params_match_documented_values() {
        let p = ShapesParams::default();
        assert_eq!(p.grid_count, 20);
        assert_eq!(p.base_scale, 0.5);
        assert_eq!(p.max_scale, 100.1);
        assert_eq!(p.pos_offset, 0.1);
        assert_eq!(p.pct_circles, 50.0);
        assert_eq!(p.angle_variance, 0.01);
        assert_eq!(p.insets_mean, 1.0);
        assert_eq!(p.alpha, 255);
        assert_eq!(p.border_width, 0.0);
        assert_eq!(p.circle_palette, Palette::single(Color::RED));
        assert_eq!(p.square_palette, Palette::single(Color::BLUE));
    }

    #[test]
    fn same_seed_produces_identical_primitives() {
        let gen = ShapesGenerator::default();
        assert_eq!(draw(&gen, 200, 42), draw(&gen, 200, 42));
    }

    #[test]
    fn different_seeds_produce_different_primitives() {
        let gen = ShapesGenerator::default();
        assert_ne!(draw(&gen, 200, 1), draw(&gen, 200, 2));
    }

    #[test]
    fn fixed_insets_give_insets_plus_one_copies_per_cell() {
        let gen = generator(ShapesParams {
            grid_count: 4,
            insets_mean: 2.0,
            ..ShapesParams::default()
        });
        assert_eq!(draw(&gen, 100, 3).len(), 16 * 3);
    }

    #[test]
    fn copies_shrink_linearly_toward_the_centre() {
        let gen = generator(ShapesParams {
            grid_count: 3,
            insets_mean: 3.0,
            ..ShapesParams::default()
        });
        let drawing = draw(&gen, 90, 8);
        for group in drawing.primitives.chunks(4) {
            let outer = radius_of(&group[0]);
            let center = center_of(&group[0]);
            for (k, p) in group.iter().enumerate() {
                assert_eq!(center_of(p), center);
                let expected = outer * (4 - k) as f64 / 4.0;
                assert!((radius_of(p) - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn default_scale_uses_exactly_the_base_radius() {
        // max_scale 100.1 leaves no whole percent above 100.
        let gen = generator(ShapesParams {
            grid_count: 5,
            insets_mean: 0.0,
            ..ShapesParams::default()
        });
        let drawing = draw(&gen, 100, 4);
        for p in &drawing.primitives {
            assert!((radius_of(p) - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn all_circles_or_all_squares() {
        let circles = generator(ShapesParams {
            pct_circles: 100.0,
            ..ShapesParams::default()
        });
        assert!(draw(&circles, 100, 5)
            .primitives
            .iter()
            .all(|p| matches!(p, DrawPrimitive::Ellipse { .. })));

        let squares = generator(ShapesParams {
            pct_circles: 0.0,
            angle_variance: 30.0,
            ..ShapesParams::default()
        });
        let limit = 30f64.to_radians();
        for p in &draw(&squares, 100, 5).primitives {
            match p {
                DrawPrimitive::RotatedRect { angle_radians, .. } => {
                    assert!(angle_radians.abs() <= limit)
                }
                other => panic!("expected a square, got {other:?}"),
            }
        }
    }

    #[test]
    fn centres_stay_within_jitter_of_their_cell() {
        let gen = generator(ShapesParams {
            grid_count: 10,
            pos_offset: 10.0,
            insets_mean: 0.0,
            ..ShapesParams::default()
        });
        let cell = 20.0;
        let drawing = draw(&gen, 200, 6);
        let mut seen = std::collections::HashSet::new();
        for p in &drawing.primitives {
            let c = center_of(p) / cell - DVec2::splat(0.5);
            let (ix, iy) = (c.x.round(), c.y.round());
            assert!((c.x - ix).abs() <= 0.1 + 1e-9 && (c.y - iy).abs() <= 0.1 + 1e-9);
            seen.insert((ix as i64, iy as i64));
        }
        assert_eq!(seen.len(), 100);
    }

    #[test]
    fn cells_are_visited_in_shuffled_order() {
        let gen = generator(ShapesParams {
            grid_count: 6,
            insets_mean: 0.0,
            ..ShapesParams::default()
        });
        let centres: Vec<DVec2> = draw(&gen, 60, 12).primitives.iter().map(center_of).collect();
        let mut row_major = centres.clone();
        row_major.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        assert_ne!(centres, row_major);
    }

    #[test]
    fn only_the_outermost_copy_is_outlined() {
        let gen = generator(ShapesParams {
            grid_count: 3,
            insets_mean: 2.0,
            border_width: 1.5,
            border_color: Color::WHITE,
            ..ShapesParams::default()
        });
        for group in draw(&gen, 90, 2).primitives.chunks(3) {
            assert_eq!(
                group[0].outline(),
                Some(Outline {
                    color: Color::WHITE,
                    width: 1.5
                })
            );
            assert!(group[1..].iter().all(|p| p.outline().is_none()));
        }
    }

    #[test]
    fn zero_border_width_draws_no_outlines() {
        let drawing = draw(&ShapesGenerator::default(), 100, 2);
        assert!(drawing.primitives.iter().all(|p| p.outline().is_none()));
    }

    #[test]
    fn squares_can_borrow_circle_colors() {
        let gen = generator(ShapesParams {
            pct_circles: 0.0,
            use_circle_colors: true,
            circle_palette: Palette::single(Color::GREEN),
            ..ShapesParams::default()
        });
        assert!(draw(&gen, 100, 9)
            .primitives
            .iter()
            .all(|p| p.color() == Color::GREEN));
    }

    #[test]
    fn fills_share_the_configured_alpha() {
        let gen = generator(ShapesParams {
            alpha: 100,
            ..ShapesParams::default()
        });
        let drawing = draw(&gen, 100, 1);
        for p in &drawing.primitives {
            let c = p.color();
            assert_eq!(c.a, 100);
            assert!(c.with_alpha(255) == Color::RED || c.with_alpha(255) == Color::BLUE);
        }
    }

    #[test]
    fn random_insets_average_close_to_the_mean() {
        let gen = generator(ShapesParams {
            grid_count: 30,
            insets_mean: 3.0,
            random_insets: true,
            ..ShapesParams::default()
        });
        let drawing = draw(&gen, 300, 77);
        let average = drawing.len() as f64 / 900.0 - 1.0;
        assert!((average - 3.0).abs() < 0.5, "average insets {average}");
    }

    #[test]
    fn empty_palette_is_rejected() {
        let mut empty = Palette::single(Color::RED);
        empty.set_enabled(0, false).unwrap();
        let err = ShapesGenerator::new(ShapesParams {
            circle_palette: empty.clone(),
            ..ShapesParams::default()
        })
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidPalette(_)));

        // An unused palette may be empty.
        assert!(ShapesGenerator::new(ShapesParams {
            pct_circles: 0.0,
            circle_palette: empty,
            ..ShapesParams::default()
        })
        .is_ok());
    }

    #[test]
    fn invalid_params_are_rejected() {
        for bad in [
            ShapesParams { grid_count: 0, ..ShapesParams::default() },
            ShapesParams { pct_circles: 101.0, ..ShapesParams::default() },
            ShapesParams { base_scale: f64::NAN, ..ShapesParams::default() },
            ShapesParams { insets_mean: 1000.0, ..ShapesParams::default() },
        ] {
            assert!(ShapesGenerator::new(bad.clone()).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn values_outside_the_schema_ranges_are_rejected() {
        let d = ShapesParams::default;
        for bad in [
            ShapesParams { grid_count: MAX_GRID_COUNT + 1, ..d() },
            ShapesParams { grid_count: usize::MAX, ..d() },
            ShapesParams { base_scale: MAX_BASE_SCALE + 0.5, ..d() },
            ShapesParams { max_scale: 99.0, ..d() },
            ShapesParams { max_scale: MAX_MAX_SCALE + 1.0, ..d() },
            ShapesParams { pos_offset: MAX_POS_OFFSET + 1.0, ..d() },
            ShapesParams { pct_circles: -1.0, ..d() },
            ShapesParams { angle_variance: MAX_ANGLE_VARIANCE + 1.0, ..d() },
            ShapesParams { insets_mean: -0.5, ..d() },
            ShapesParams { border_width: MAX_BORDER_WIDTH + 1.0, ..d() },
        ] {
            let err = ShapesGenerator::new(bad.clone()).unwrap_err();
            assert!(matches!(err, EngineError::InvalidParameter { .. }), "{bad:?}");
        }
        assert!(ShapesGenerator::new(ShapesParams { grid_count: MAX_GRID_COUNT, ..d() }).is_ok());
    }

    #[test]
    fn huge_grid_count_from_json_is_rejected() {
        let err = ShapesGenerator::from_json(&json!({"grid_count": u64::MAX})).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter { .. }));
    }

    #[test]
    fn cancelled_run_returns_cancellation() {
        let token = CancelToken::new();
        token.cancel();
        let err = ShapesGenerator::default()
            .generate(100, 100, 1, &token)
            .unwrap_err();
        assert!(err.is_cancellation());
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let err = ShapesGenerator::default()
            .generate(0, 100, 1, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidDimensions));
    }

    #[test]
    fn from_json_reads_palettes_and_overrides() {
        let mut entries = [PaletteEntry::new(Color::BLACK, false); PALETTE_SIZE];
        entries[2] = PaletteEntry::new(Color::YELLOW, true);
        let palette = Palette::new(entries, 10.0, 0.1, 0.1).unwrap();
        let p = ShapesParams::from_json(&json!({
            "grid_count": 8,
            "alpha": 999,
            "square_palette": palette,
            "circle_palette": {"broken": true},
        }));
        assert_eq!(p.grid_count, 8);
        assert_eq!(p.alpha, 255);
        assert_eq!(p.square_palette, palette);
        assert_eq!(p.circle_palette, Palette::single(Color::RED));
    }

    #[test]
    fn params_round_trip_through_load() {
        let source = generator(ShapesParams {
            random_insets: true,
            border_width: 2.0,
            use_circle_colors: true,
            ..ShapesParams::default()
        });
        let mut target = ShapesGenerator::default();
        target.load_params(&source.params()).unwrap();
        assert_eq!(target.shapes_params(), source.shapes_params());
        assert_eq!(draw(&target, 120, 5), draw(&source, 120, 5));
    }

    #[test]
    fn failed_load_leaves_params_unchanged() {
        let mut gen = generator(ShapesParams {
            grid_count: 7,
            ..ShapesParams::default()
        });
        assert!(gen.load_params(&json!({"grid_count": 3})).is_err());
        assert_eq!(gen.shapes_params().grid_count, 7);
    }

    #[test]
    fn param_schema_covers_every_param() {
        let gen = ShapesGenerator::default();
        let schema = gen.param_schema();
        for key in gen.params().as_object().unwrap().keys() {
            assert!(schema.get(key).is_some(), "schema missing {key}");
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn radii_stay_within_scale_bounds(
                seed: u64,
                grid_count in 1usize..12,
                base_scale in 0.1f64..1.5,
                max_scale in 100.0f64..300.0,
            ) {
                let gen = generator(ShapesParams {
                    grid_count,
                    base_scale,
                    max_scale,
                    random_insets: true,
                    ..ShapesParams::default()
                });
                let size = 120;
                let base = size as f64 / grid_count as f64 * base_scale / 2.0;
                let drawing = draw(&gen, size, seed);
                prop_assert!(drawing.len() >= grid_count * grid_count);
                for p in &drawing.primitives {
                    let r = radius_of(p);
                    prop_assert!(r > 0.0);
                    prop_assert!(r <= base * max_scale.max(101.0) / 100.0 + 1e-9);
                }
            }
        }
    }
}
