//! Vector output of the flow and shapes generators.
//!
//! A [`Drawing`] is an ordered list of [`DrawPrimitive`]s; later primitives
//! paint over earlier ones. Coordinates are canvas pixels with the origin at
//! the top-left corner.

use crate::color::Color;
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Stroke drawn around a filled shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub color: Color,
    pub width: f64,
}

/// One drawable element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawPrimitive {
    /// Polyline whose width varies linearly from `width_start` at the first
    /// point to `width_end` at the last.
    Stroke {
        points: Vec<DVec2>,
        color: Color,
        width_start: f64,
        width_end: f64,
    },
    Dot {
        center: DVec2,
        radius: f64,
        fill: Color,
        outline: Option<Outline>,
    },
    Ellipse {
        center: DVec2,
        rx: f64,
        ry: f64,
        fill: Color,
        outline: Option<Outline>,
    },
    /// Rectangle centred on `center`, rotated clockwise (y down) by `angle_radians`.
    RotatedRect {
        center: DVec2,
        half_width: f64,
        half_height: f64,
        angle_radians: f64,
        fill: Color,
        outline: Option<Outline>,
    },
}

impl DrawPrimitive {
    /// Fill (or stroke) color of the primitive.
    pub fn color(&self) -> Color {
        match self {
            DrawPrimitive::Stroke { color, .. } => *color,
            DrawPrimitive::Dot { fill, .. }
            | DrawPrimitive::Ellipse { fill, .. }
            | DrawPrimitive::RotatedRect { fill, .. } => *fill,
        }
    }

    pub fn outline(&self) -> Option<Outline> {
        match self {
            DrawPrimitive::Stroke { .. } => None,
            DrawPrimitive::Dot { outline, .. }
            | DrawPrimitive::Ellipse { outline, .. }
            | DrawPrimitive::RotatedRect { outline, .. } => *outline,
        }
    }
}

/// Ordered draw list over a background color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub width: usize,
    pub height: usize,
    pub background: Color,
    pub primitives: Vec<DrawPrimitive>,
}

impl Drawing {
    pub fn new(width: usize, height: usize, background: Color) -> Self {
        Self {
            width,
            height,
            background,
            primitives: Vec::new(),
        }
    }

    pub fn push(&mut self, primitive: DrawPrimitive) {
        self.primitives.push(primitive);
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}
