//! CPU rasterization of a [`Drawing`].
//!
//! Every primitive is turned into a signed distance function (negative
//! inside). Pixels inside the primitive's bounding box are sampled at their
//! centre, and coverage is `clamp(0.5 - d, 0, 1)`, which gives a one-pixel
//! anti-aliased edge. Colors are composited source-over in draw order.

use genart_core::canvas::PixelBuffer;
use genart_core::color::Color;
use genart_core::draw::{DrawPrimitive, Drawing, Outline};
use genart_core::error::EngineError;
use genart_core::CancelToken;
use glam::DVec2;
use log::debug;

/// Signed distance to a shape, plus a box that contains it.
trait Sdf {
    fn sdf(&self, p: DVec2) -> f64;
    fn bounds(&self) -> (DVec2, DVec2);
}

struct Disc {
    center: DVec2,
    radius: f64,
}

impl Sdf for Disc {
    fn sdf(&self, p: DVec2) -> f64 {
        p.distance(self.center) - self.radius
    }

    fn bounds(&self) -> (DVec2, DVec2) {
        let r = DVec2::splat(self.radius);
        (self.center - r, self.center + r)
    }
}

/// Axis-aligned ellipse. The distance is exact for circles and a scaled
/// approximation otherwise.
struct Ellipse {
    center: DVec2,
    radii: DVec2,
}

impl Sdf for Ellipse {
    fn sdf(&self, p: DVec2) -> f64 {
        let k = ((p - self.center) / self.radii).length();
        (k - 1.0) * self.radii.min_element()
    }

    fn bounds(&self) -> (DVec2, DVec2) {
        (self.center - self.radii, self.center + self.radii)
    }
}

struct RotatedBox {
    center: DVec2,
    half: DVec2,
    /// `(cos, sin)` of the rotation.
    rotation: DVec2,
}

impl Sdf for RotatedBox {
    fn sdf(&self, p: DVec2) -> f64 {
        // Into the box frame: rotate by -angle.
        let local = DVec2::new(self.rotation.x, -self.rotation.y).rotate(p - self.center);
        let q = local.abs() - self.half;
        q.max(DVec2::ZERO).length() + q.x.max(q.y).min(0.0)
    }

    fn bounds(&self) -> (DVec2, DVec2) {
        let extent = self.half.length();
        let r = DVec2::splat(extent);
        (self.center - r, self.center + r)
    }
}

/// One polyline segment with linearly varying radius.
struct Taper {
    a: DVec2,
    b: DVec2,
    ra: f64,
    rb: f64,
}

/// Union of tapered segments, painted as a single shape.
struct Polyline {
    segments: Vec<Taper>,
}

impl Polyline {
    /// Spreads the width change over the polyline by arc length.
    fn new(points: &[DVec2], width_start: f64, width_end: f64) -> Self {
        let total: f64 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
        let width_at = |s: f64| {
            if total > 0.0 {
                width_start + (width_end - width_start) * s / total
            } else {
                width_start
            }
        };
        let mut travelled = 0.0;
        let mut segments = Vec::with_capacity(points.len().saturating_sub(1));
        for w in points.windows(2) {
            let len = w[0].distance(w[1]);
            segments.push(Taper {
                a: w[0],
                b: w[1],
                ra: width_at(travelled).max(0.0) / 2.0,
                rb: width_at(travelled + len).max(0.0) / 2.0,
            });
            travelled += len;
        }
        Self { segments }
    }
}

impl Sdf for Polyline {
    fn sdf(&self, p: DVec2) -> f64 {
        self.segments
            .iter()
            .map(|s| {
                let ab = s.b - s.a;
                let len2 = ab.length_squared();
                let t = if len2 > 0.0 {
                    ((p - s.a).dot(ab) / len2).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                p.distance(s.a + ab * t) - (s.ra + (s.rb - s.ra) * t)
            })
            .fold(f64::INFINITY, f64::min)
    }

    fn bounds(&self) -> (DVec2, DVec2) {
        self.segments.iter().fold(
            (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
            |(lo, hi), s| {
                let r = DVec2::splat(s.ra.max(s.rb));
                (
                    lo.min(s.a - r).min(s.b - r),
                    hi.max(s.a + r).max(s.b + r),
                )
            },
        )
    }
}

/// Band of `width` centred on the boundary of `inner`.
struct Ring<'a> {
    inner: &'a dyn Sdf,
    half_width: f64,
}

impl Sdf for Ring<'_> {
    fn sdf(&self, p: DVec2) -> f64 {
        self.inner.sdf(p).abs() - self.half_width
    }

    fn bounds(&self) -> (DVec2, DVec2) {
        let (lo, hi) = self.inner.bounds();
        let r = DVec2::splat(self.half_width);
        (lo - r, hi + r)
    }
}

fn coverage(d: f64) -> f64 {
    (0.5 - d).clamp(0.0, 1.0)
}

/// Straight-alpha source-over of `src` at `cov` coverage onto `dst`.
fn blend(dst: Color, src: Color, cov: f64) -> Color {
    let a = src.a as f64 / 255.0 * cov;
    let mix = |s: u8, d: u8| (s as f64 * a + d as f64 * (1.0 - a)).round() as u8;
    let out_a = a + dst.a as f64 / 255.0 * (1.0 - a);
    Color::rgba(
        mix(src.r, dst.r),
        mix(src.g, dst.g),
        mix(src.b, dst.b),
        (out_a * 255.0).round() as u8,
    )
}

fn paint(pixels: &mut PixelBuffer, shape: &dyn Sdf, color: Color) {
    if color.a == 0 {
        return;
    }
    let (lo, hi) = shape.bounds();
    let (w, h) = (pixels.width() as f64, pixels.height() as f64);
    if !(lo.x < w && lo.y < h && hi.x >= 0.0 && hi.y >= 0.0) {
        return;
    }
    let x0 = (lo.x - 1.0).floor().max(0.0) as usize;
    let y0 = (lo.y - 1.0).floor().max(0.0) as usize;
    let x1 = (hi.x + 1.0).ceil().min(w - 1.0) as usize;
    let y1 = (hi.y + 1.0).ceil().min(h - 1.0) as usize;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let cov = coverage(shape.sdf(DVec2::new(x as f64 + 0.5, y as f64 + 0.5)));
            if cov <= 0.0 {
                continue;
            }
            if let Some(dst) = pixels.pixel(x, y) {
                pixels.set_pixel(x, y, blend(dst, color, cov));
            }
        }
    }
}

fn paint_filled(pixels: &mut PixelBuffer, shape: &dyn Sdf, fill: Color, outline: Option<Outline>) {
    paint(pixels, shape, fill);
    if let Some(outline) = outline.filter(|o| o.width > 0.0) {
        let ring = Ring {
            inner: shape,
            half_width: outline.width / 2.0,
        };
        paint(pixels, &ring, outline.color);
    }
}

fn draw_primitive(pixels: &mut PixelBuffer, primitive: &DrawPrimitive) {
    match primitive {
        DrawPrimitive::Stroke {
            points,
            color,
            width_start,
            width_end,
        } => {
            if points.len() >= 2 {
                paint(pixels, &Polyline::new(points, *width_start, *width_end), *color);
            }
        }
        DrawPrimitive::Dot {
            center,
            radius,
            fill,
            outline,
        } => {
            let disc = Disc {
                center: *center,
                radius: *radius,
            };
            paint_filled(pixels, &disc, *fill, *outline);
        }
        DrawPrimitive::Ellipse {
            center,
            rx,
            ry,
            fill,
            outline,
        } => {
            if *rx > 0.0 && *ry > 0.0 {
                let ellipse = Ellipse {
                    center: *center,
                    radii: DVec2::new(*rx, *ry),
                };
                paint_filled(pixels, &ellipse, *fill, *outline);
            }
        }
        DrawPrimitive::RotatedRect {
            center,
            half_width,
            half_height,
            angle_radians,
            fill,
            outline,
        } => {
            let rect = RotatedBox {
                center: *center,
                half: DVec2::new(*half_width, *half_height),
                rotation: DVec2::from_angle(*angle_radians),
            };
            paint_filled(pixels, &rect, *fill, *outline);
        }
    }
}

/// Renders `drawing` onto a fresh buffer filled with its background.
///
/// Polls `cancel` once per primitive.
pub fn rasterize(drawing: &Drawing, cancel: &CancelToken) -> Result<PixelBuffer, EngineError> {
    let mut pixels = PixelBuffer::filled(drawing.width, drawing.height, drawing.background)?;
    for primitive in &drawing.primitives {
        cancel.check()?;
        draw_primitive(&mut pixels, primitive);
    }
    debug!(
        "rasterized {} primitives onto {}x{}",
        drawing.len(),
        drawing.width,
        drawing.height
    );
    Ok(pixels)
}
