//! Turns traced streamlines into draw primitives.

use crate::streamline::Streamline;
use crate::FlowParams;
use genart_core::color::{lerp_color, Color};
use genart_core::draw::{DrawPrimitive, Drawing, Outline};
use genart_core::math::ramp;

/// Width and alpha at a point of the line, tapering near both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Taper {
    pub thickness: f64,
    pub alpha: f64,
}

/// Short-to-long colour mix: 0 below `short_count`, 1 above `long_count`.
pub fn maturity(line: &Streamline, params: &FlowParams) -> f64 {
    ramp(
        line.len() as f64,
        params.short_count as f64,
        params.long_count as f64,
    )
}

/// Taper at index `i`: full `max_thickness` and alpha 255 unless `i` is
/// within `len * get_thick` points of either end, where both scale linearly
/// with the distance.
pub fn taper(line: &Streamline, i: isize, params: &FlowParams) -> Taper {
    let from_back = (line.bwd_count() as isize + i) as f64;
    let from_front = (line.fwd_count() as isize - i) as f64;
    let dist = from_back.min(from_front);
    let threshold = line.len() as f64 * params.get_thick;

    let mut taper = Taper {
        thickness: params.max_thickness,
        alpha: 255.0,
    };
    if dist < threshold {
        let ratio = dist / threshold;
        taper.thickness *= ratio;
        taper.alpha *= ratio;
    }
    taper
}

/// Appends the primitives for one streamline to `out`.
pub fn render_streamline(line: &Streamline, params: &FlowParams, out: &mut Drawing) {
    if line.len() < 2 {
        return;
    }
    let base = lerp_color(params.short_color, params.long_color, maturity(line, params));
    if params.dotted {
        render_dots(line, params, base, out);
    } else {
        render_strokes(line, params, base, out);
    }
}

fn shade(base: Color, alpha: f64) -> Color {
    base.with_alpha(alpha.clamp(0.0, 255.0) as u8)
}

fn render_strokes(line: &Streamline, params: &FlowParams, base: Color, out: &mut Drawing) {
    for i in line.first_index()..line.last_index() {
        let start = taper(line, i, params);
        let end = taper(line, i + 1, params);
        out.push(DrawPrimitive::Stroke {
            points: vec![line[i], line[i + 1]],
            color: shade(base, start.alpha),
            width_start: start.thickness,
            width_end: end.thickness,
        });
    }
}

/// Dots along the path, each spaced from the previous by the current
/// thickness (at least one pixel).
fn render_dots(line: &Streamline, params: &FlowParams, base: Color, out: &mut Drawing) {
    let outline = (params.border_width > 0.0).then_some(Outline {
        color: params.border_color,
        width: params.border_width,
    });
    let mut travelled = 0.0;
    let mut next_dot = 0.0;

    for i in line.first_index()..line.last_index() {
        let (a, b) = (line[i], line[i + 1]);
        let length = a.distance(b);
        if length <= 0.0 {
            continue;
        }
        let (ta, tb) = (taper(line, i, params), taper(line, i + 1, params));
        while next_dot <= travelled + length {
            let frac = (next_dot - travelled) / length;
            let thickness = ta.thickness + (tb.thickness - ta.thickness) * frac;
            let alpha = ta.alpha + (tb.alpha - ta.alpha) * frac;
            if thickness > 0.0 {
                out.push(DrawPrimitive::Dot {
                    center: a + (b - a) * frac,
                    radius: thickness / 2.0,
                    fill: shade(base, alpha),
                    outline,
                });
            }
            next_dot += thickness.max(1.0);
        }
        travelled += length;
    }
}
