#![deny(unsafe_code)]
//! Streamline ("flow") generator.
//!
//! Evenly spaced streamlines after Jobard & Lefer: paths are integrated
//! through a Perlin direction field with a fixed step, every point is
//! registered in a [`SpatialHashGrid`] and a path stops as soon as it would
//! come closer than `interline_distance` to another path. New start points
//! are either drawn at random or, with even line selection, found beside
//! existing lines. An optional radial "flower" pre-seeds the canvas and bends
//! the field around its centre.
//!
//! Tracing is sequential: with even line selection every new line depends on
//! the lines traced before it.

pub mod flower;
pub mod render;
pub mod spatial;
pub mod streamline;

pub use flower::{Flower, FlowerParams};
pub use spatial::{SelfCheck, SpatialHashGrid};
pub use streamline::{Direction, Streamline};

use genart_core::color::Color;
use genart_core::draw::Drawing;
use genart_core::error::EngineError;
use genart_core::generator::{Artwork, Generator};
use genart_core::grid::checked_len;
use genart_core::math::unit;
use genart_core::noise::Perlin;
use genart_core::params::{
    check_count, check_range, param_bool, param_color, param_f64, param_u32, param_usize,
};
use genart_core::prng::Xorshift64;
use genart_core::CancelToken;
use glam::DVec2;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::f64::consts::TAU;

/// Integration step in pixels.
pub const STEP_DISTANCE: f64 = 4.0;
/// Maximum steps traced in each direction from the start point.
pub const MAX_STEPS: usize = 500;
/// Upper bound on the points of one streamline: the start plus a full run of
/// steps each way.
pub const MAX_LINE_POINTS: usize = 2 * MAX_STEPS + 1;

const MAX_LINE_COUNT: usize = 100_000;
const MAX_ANGLE_MULTIPLIER: f64 = 100.0;
const MAX_COLOR_COUNT: usize = 1000;
const MAX_SAMPLE_INTERVAL: usize = 100;
const MAX_THICKNESS: f64 = 50.0;
const MIN_INTERLINE_DISTANCE: f64 = 1.0;
const MAX_INTERLINE_DISTANCE: f64 = 100.0;
const MAX_OCTAVES: u32 = 8;
const MIN_START_PT_MULT: f64 = 1.0;
const MAX_START_PT_MULT: f64 = 10.0;
/// `drop_below` at this value hides every line.
const MAX_DROP_BELOW: usize = MAX_LINE_POINTS + 1;
const MAX_CTR_RADIUS: f64 = 500.0;
const MAX_PETAL_LENGTH: f64 = 1000.0;
const MAX_DROPOFF: f64 = 2000.0;
const MAX_BORDER_WIDTH: f64 = 10.0;

const DEFAULT_LINE_COUNT: usize = 800;
const DEFAULT_EVEN_LINE_SELECTION: bool = true;
const DEFAULT_ANGLE_MULTIPLIER: f64 = 35.0;
const DEFAULT_SHORT_COUNT: usize = 20;
const DEFAULT_LONG_COUNT: usize = 100;
const DEFAULT_SAMPLE_INTERVAL: usize = 7;
const DEFAULT_MAX_THICKNESS: f64 = 7.0;
const DEFAULT_GET_THICK: f64 = 0.5;
const DEFAULT_INTERLINE_DISTANCE: f64 = 5.0;
const DEFAULT_OCTAVES: u32 = 2;
const DEFAULT_START_PT_MULT: f64 = 1.5;
const DEFAULT_DROP_BELOW: usize = 10;
const DEFAULT_INCLUDE_FLOWER: bool = false;
const DEFAULT_SHORT_COLOR: Color = Color::GREEN;
const DEFAULT_LONG_COLOR: Color = Color::YELLOW;
const DEFAULT_BORDER_COLOR: Color = Color::RED;
const DEFAULT_BORDER_WIDTH: f64 = 0.0;
const DEFAULT_DOTTED: bool = false;
const DEFAULT_SELF_AVOID: bool = false;

/// Parameters for the flow generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowParams {
    /// Random start-point attempts before the main loop ends.
    pub line_count: usize,
    /// Seed new lines beside existing ones instead of at random.
    pub even_line_selection: bool,
    /// Radians of direction per unit of noise; higher is more chaotic.
    pub angle_multiplier: f64,
    pub short_count: usize,
    pub long_count: usize,
    /// Points skipped between start-point searches along a line.
    pub sample_interval: usize,
    pub max_thickness: f64,
    /// Fraction of a line's length over which each end tapers.
    pub get_thick: f64,
    /// Minimum distance between points of different lines.
    pub interline_distance: f64,
    pub octaves: u32,
    /// Start-point offset from a neighbour line, in interline distances.
    pub start_pt_mult: f64,
    /// Lines with fewer points are traced but not drawn.
    pub drop_below: usize,
    pub include_flower: bool,
    pub flower: FlowerParams,
    pub short_color: Color,
    pub long_color: Color,
    /// Outline colour for dots.
    pub border_color: Color,
    /// Outline width for dots; 0 disables the outline.
    pub border_width: f64,
    pub dotted: bool,
    /// Also keep a line away from its own distant points.
    pub self_avoid: bool,
}

impl Default for FlowParams {
    fn default() -> Self {
        Self {
            line_count: DEFAULT_LINE_COUNT,
            even_line_selection: DEFAULT_EVEN_LINE_SELECTION,
            angle_multiplier: DEFAULT_ANGLE_MULTIPLIER,
            short_count: DEFAULT_SHORT_COUNT,
            long_count: DEFAULT_LONG_COUNT,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            max_thickness: DEFAULT_MAX_THICKNESS,
            get_thick: DEFAULT_GET_THICK,
            interline_distance: DEFAULT_INTERLINE_DISTANCE,
            octaves: DEFAULT_OCTAVES,
            start_pt_mult: DEFAULT_START_PT_MULT,
            drop_below: DEFAULT_DROP_BELOW,
            include_flower: DEFAULT_INCLUDE_FLOWER,
            flower: FlowerParams::default(),
            short_color: DEFAULT_SHORT_COLOR,
            long_color: DEFAULT_LONG_COLOR,
            border_color: DEFAULT_BORDER_COLOR,
            border_width: DEFAULT_BORDER_WIDTH,
            dotted: DEFAULT_DOTTED,
            self_avoid: DEFAULT_SELF_AVOID,
        }
    }
}

impl FlowParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    /// Flower geometry is read from a nested `"flower"` object.
    pub fn from_json(params: &Value) -> Self {
        let petals = params.get("flower").unwrap_or(&Value::Null);
        Self {
            line_count: param_usize(params, "line_count", DEFAULT_LINE_COUNT),
            even_line_selection: param_bool(
                params,
                "even_line_selection",
                DEFAULT_EVEN_LINE_SELECTION,
            ),
            angle_multiplier: param_f64(params, "angle_multiplier", DEFAULT_ANGLE_MULTIPLIER),
            short_count: param_usize(params, "short_count", DEFAULT_SHORT_COUNT),
            long_count: param_usize(params, "long_count", DEFAULT_LONG_COUNT),
            sample_interval: param_usize(params, "sample_interval", DEFAULT_SAMPLE_INTERVAL),
            max_thickness: param_f64(params, "max_thickness", DEFAULT_MAX_THICKNESS),
            get_thick: param_f64(params, "get_thick", DEFAULT_GET_THICK),
            interline_distance: param_f64(
                params,
                "interline_distance",
                DEFAULT_INTERLINE_DISTANCE,
            ),
            octaves: param_u32(params, "octaves", DEFAULT_OCTAVES),
            start_pt_mult: param_f64(params, "start_pt_mult", DEFAULT_START_PT_MULT),
            drop_below: param_usize(params, "drop_below", DEFAULT_DROP_BELOW),
            include_flower: param_bool(params, "include_flower", DEFAULT_INCLUDE_FLOWER),
            flower: FlowerParams {
                ctr_radius: param_f64(petals, "ctr_radius", flower::DEFAULT_CTR_RADIUS),
                petal_length: param_f64(petals, "petal_length", flower::DEFAULT_PETAL_LENGTH),
                dropoff: param_f64(petals, "dropoff", flower::DEFAULT_DROPOFF),
            },
            short_color: param_color(params, "short_color", DEFAULT_SHORT_COLOR),
            long_color: param_color(params, "long_color", DEFAULT_LONG_COLOR),
            border_color: param_color(params, "border_color", DEFAULT_BORDER_COLOR),
            border_width: param_f64(params, "border_width", DEFAULT_BORDER_WIDTH),
            dotted: param_bool(params, "dotted", DEFAULT_DOTTED),
            self_avoid: param_bool(params, "self_avoid", DEFAULT_SELF_AVOID),
        }
        .normalized()
    }

    /// Clamps `short_count` to at most `long_count`.
    pub fn normalized(mut self) -> Self {
        self.short_count = self.short_count.min(self.long_count);
        self
    }

    /// Checks every field against the ranges published by `param_schema`.
    pub fn validate(&self) -> Result<(), EngineError> {
        check_count("line_count", self.line_count, 0, MAX_LINE_COUNT)?;
        check_range("angle_multiplier", self.angle_multiplier, 0.0, MAX_ANGLE_MULTIPLIER)?;
        check_count("short_count", self.short_count, 0, MAX_COLOR_COUNT)?;
        check_count("long_count", self.long_count, 0, MAX_COLOR_COUNT)?;
        check_count("sample_interval", self.sample_interval, 1, MAX_SAMPLE_INTERVAL)?;
        check_range("max_thickness", self.max_thickness, 0.0, MAX_THICKNESS)?;
        check_range("get_thick", self.get_thick, 0.0, 1.0)?;
        check_range(
            "interline_distance",
            self.interline_distance,
            MIN_INTERLINE_DISTANCE,
            MAX_INTERLINE_DISTANCE,
        )?;
        check_count("octaves", self.octaves as usize, 1, MAX_OCTAVES as usize)?;
        check_range(
            "start_pt_mult",
            self.start_pt_mult,
            MIN_START_PT_MULT,
            MAX_START_PT_MULT,
        )?;
        check_count("drop_below", self.drop_below, 0, MAX_DROP_BELOW)?;
        check_range("flower.ctr_radius", self.flower.ctr_radius, 0.0, MAX_CTR_RADIUS)?;
        check_range(
            "flower.petal_length",
            self.flower.petal_length,
            0.0,
            MAX_PETAL_LENGTH,
        )?;
        check_range("flower.dropoff", self.flower.dropoff, 0.0, MAX_DROPOFF)?;
        check_range("border_width", self.border_width, 0.0, MAX_BORDER_WIDTH)
    }

    fn self_check(&self) -> SelfCheck {
        if self.self_avoid {
            let window = (self.interline_distance / STEP_DISTANCE).ceil() as isize + 1;
            SelfCheck::Beyond { window }
        } else {
            SelfCheck::Skip
        }
    }
}

/// Resumable search for start points beside one streamline.
///
/// Walks the line every `sample_interval` points and tries both sides of
/// each sample before moving on.
#[derive(Debug, Clone, Copy)]
struct SearchCursor {
    line: usize,
    index: isize,
    side: f64,
}

impl SearchCursor {
    fn new(line: usize, first_index: isize) -> Self {
        Self {
            line,
            index: first_index,
            side: 1.0,
        }
    }
}

/// Completed trace: every streamline plus the hash they were registered in.
#[derive(Debug, Clone)]
pub struct FlowTrace {
    pub width: usize,
    pub height: usize,
    pub lines: Vec<Streamline>,
    pub flower: Option<Flower>,
    grid: SpatialHashGrid,
}

impl FlowTrace {
    pub fn grid(&self) -> &SpatialHashGrid {
        &self.grid
    }
}

/// Mutable tracing state for one run.
struct Tracer<'a> {
    params: &'a FlowParams,
    width: f64,
    height: f64,
    noise: Perlin,
    flower: Option<Flower>,
    grid: SpatialHashGrid,
    lines: Vec<Streamline>,
    self_check: SelfCheck,
}

impl<'a> Tracer<'a> {
    fn direction(&self, pt: DVec2) -> f64 {
        let angle = self.noise.value2(pt.x / self.width, pt.y / self.height)
            * self.params.angle_multiplier;
        match &self.flower {
            Some(flower) => flower.steer(pt, angle),
            None => angle,
        }
    }

    fn next_point(&self, pt: DVec2, step: f64) -> DVec2 {
        pt + unit(self.direction(pt)) * step
    }

    /// Appends `pt` to line `id` if it keeps the separation; off-canvas
    /// points are appended without registration.
    fn register(&mut self, id: usize, pt: DVec2, direction: Direction) -> bool {
        if !self.grid.contains(pt) {
            self.lines[id].push(pt, direction);
            return true;
        }
        let candidate = self.lines[id].next_index(direction);
        if !self
            .grid
            .is_valid(&self.lines, pt, Some(id), candidate, self.self_check)
        {
            return false;
        }
        let index = self.lines[id].push(pt, direction);
        self.grid.insert(id, index, pt);
        true
    }

    /// Valid, on-canvas start point outside the flower centre.
    fn can_start(&self, pt: DVec2) -> bool {
        self.grid.contains(pt)
            && !self.flower.is_some_and(|f| f.forbids(pt))
            && self
                .grid
                .is_valid(&self.lines, pt, None, 0, SelfCheck::Skip)
    }

    /// Traces one streamline from `start`. Returns its id, or `None` when
    /// the start point itself is rejected.
    fn produce_line(&mut self, start: DVec2, forward_only: bool) -> Option<usize> {
        let id = self.lines.len();
        self.lines.push(if forward_only {
            Streamline::forward_only()
        } else {
            Streamline::new()
        });
        if !self.register(id, start, Direction::Forward) {
            self.lines.pop();
            return None;
        }

        self.trace(id, start, STEP_DISTANCE, Direction::Forward, false);
        if !forward_only {
            self.trace(id, start, -STEP_DISTANCE, Direction::Backward, true);
        }
        Some(id)
    }

    /// Steps from `from` until a point is rejected, the path leaves the
    /// canvas, or `MAX_STEPS` steps have been taken. `fresh` means `from`
    /// itself has not been registered in this direction yet.
    fn trace(&mut self, id: usize, from: DVec2, step: f64, direction: Direction, fresh: bool) {
        let mut current = from;
        let mut steps = 0;
        if fresh {
            current = self.next_point(from, step);
            steps += 1;
            if !self.register(id, current, direction) {
                return;
            }
        }
        while steps < MAX_STEPS && self.grid.contains(current) {
            current = self.next_point(current, step);
            steps += 1;
            if !self.register(id, current, direction) {
                break;
            }
        }
    }

    /// Next start point beside the line under `cursor`, advancing it.
    fn search(&self, cursor: &mut SearchCursor) -> Option<DVec2> {
        let line = &self.lines[cursor.line];
        let offset = self.params.start_pt_mult * self.params.interline_distance;
        let stride = isize::try_from(self.params.sample_interval).unwrap_or(isize::MAX);
        while cursor.index <= line.last_index() {
            let i = cursor.index;
            let side = cursor.side;
            if side > 0.0 {
                cursor.side = -1.0;
            } else {
                cursor.side = 1.0;
                cursor.index = cursor.index.saturating_add(stride);
            }
            let Some(tangent) = line.tangent(i) else {
                continue;
            };
            let normal = tangent.perp() * side;
            let candidate = line[i] + normal * offset;
            if self.can_start(candidate) {
                return Some(candidate);
            }
        }
        None
    }
}

/// Flow generator.
#[derive(Debug, Clone, Default)]
pub struct FlowGenerator {
    params: FlowParams,
}

impl FlowGenerator {
    /// Creates a generator after normalizing and validating `params`.
    pub fn new(params: FlowParams) -> Result<Self, EngineError> {
        let params = params.normalized();
        params.validate()?;
        Ok(Self { params })
    }

    /// Creates a generator from a lenient JSON params object.
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        Self::new(FlowParams::from_json(params))
    }

    pub fn flow_params(&self) -> &FlowParams {
        &self.params
    }

    /// Traces every streamline without rendering. Polls `cancel` once per
    /// line.
    pub fn trace(
        &self,
        width: usize,
        height: usize,
        seed: u64,
        cancel: &CancelToken,
    ) -> Result<FlowTrace, EngineError> {
        checked_len(width, height)?;
        let params = &self.params;
        let mut rng = Xorshift64::new(seed);
        let noise = Perlin::with_octaves(rng.next_seed(), params.octaves, 1.0, 1.0)?;
        let (w, h) = (width as f64, height as f64);

        let flower = params.include_flower.then(|| {
            let center = DVec2::new(rng.next_range(0.0, w), rng.next_range(0.0, h));
            Flower::new(center, params.flower)
        });

        let mut tracer = Tracer {
            params,
            width: w,
            height: h,
            noise,
            flower,
            grid: SpatialHashGrid::new(width, height, params.interline_distance)?,
            lines: Vec::new(),
            self_check: params.self_check(),
        };
        let mut queue: VecDeque<SearchCursor> = VecDeque::new();

        if let Some(flower) = flower {
            let rotation = rng.next_range(0.0, TAU);
            for start in flower.petal_starts(params.interline_distance, rotation) {
                cancel.check()?;
                if let Some(id) = tracer.produce_line(start, true) {
                    queue.push_back(SearchCursor::new(id, tracer.lines[id].first_index()));
                }
            }
            debug!(
                "flow: {} petals around ({:.1}, {:.1})",
                tracer.lines.len(),
                flower.center.x,
                flower.center.y
            );
        }

        let mut attempts = 0;
        loop {
            cancel.check()?;
            let start = if !params.even_line_selection || queue.is_empty() {
                let pt = DVec2::new(rng.next_range(0.0, w), rng.next_range(0.0, h));
                if attempts == params.line_count {
                    break;
                }
                attempts += 1;
                if tracer.flower.is_some_and(|f| f.forbids(pt)) {
                    continue;
                }
                pt
            } else {
                let mut found = None;
                while let Some(cursor) = queue.front_mut() {
                    if let Some(pt) = tracer.search(cursor) {
                        found = Some(pt);
                        break;
                    }
                    queue.pop_front();
                }
                match found {
                    Some(pt) => pt,
                    None => break,
                }
            };
            if let Some(id) = tracer.produce_line(start, false) {
                queue.push_back(SearchCursor::new(id, tracer.lines[id].first_index()));
            }
        }

        debug!(
            "flow: traced {} lines ({} random attempts, {} registered points)",
            tracer.lines.len(),
            attempts,
            tracer.grid.point_count()
        );
        Ok(FlowTrace {
            width,
            height,
            lines: tracer.lines,
            flower: tracer.flower,
            grid: tracer.grid,
        })
    }

    /// Renders a completed trace. Lines shorter than `drop_below` are skipped.
    pub fn draw(&self, trace: &FlowTrace, cancel: &CancelToken) -> Result<Drawing, EngineError> {
        let mut drawing = Drawing::new(trace.width, trace.height, Color::BLACK);
        for line in trace
            .lines
            .iter()
            .filter(|l| l.len() >= self.params.drop_below)
        {
            cancel.check()?;
            render::render_streamline(line, &self.params, &mut drawing);
        }
        Ok(drawing)
    }
}

impl Generator for FlowGenerator {
    fn name(&self) -> &'static str {
        "flow"
    }

    fn extension(&self) -> &'static str {
        "flw"
    }

    fn generate(
        &self,
        width: usize,
        height: usize,
        seed: u64,
        cancel: &CancelToken,
    ) -> Result<Artwork, EngineError> {
        let trace = self.trace(width, height, seed, cancel)?;
        let drawing = self.draw(&trace, cancel)?;
        info!(
            "flow: {} lines, {} primitives ({width}x{height}, seed {seed})",
            trace.lines.len(),
            drawing.len()
        );
        Ok(Artwork::Drawing(drawing))
    }

    fn params(&self) -> Value {
        let p = &self.params;
        json!({
            "line_count": p.line_count,
            "even_line_selection": p.even_line_selection,
            "angle_multiplier": p.angle_multiplier,
            "short_count": p.short_count,
            "long_count": p.long_count,
            "sample_interval": p.sample_interval,
            "max_thickness": p.max_thickness,
            "get_thick": p.get_thick,
            "interline_distance": p.interline_distance,
            "octaves": p.octaves,
            "start_pt_mult": p.start_pt_mult,
            "drop_below": p.drop_below,
            "include_flower": p.include_flower,
            "flower": {
                "ctr_radius": p.flower.ctr_radius,
                "petal_length": p.flower.petal_length,
                "dropoff": p.flower.dropoff,
            },
            "short_color": p.short_color,
            "long_color": p.long_color,
            "border_color": p.border_color,
            "border_width": p.border_width,
            "dotted": p.dotted,
            "self_avoid": p.self_avoid,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "line_count": {
                "type": "integer", "default": DEFAULT_LINE_COUNT, "min": 0, "max": MAX_LINE_COUNT,
                "description": "Random start-point attempts"
            },
            "even_line_selection": {
                "type": "boolean", "default": DEFAULT_EVEN_LINE_SELECTION,
                "description": "Seed new lines beside existing ones"
            },
            "angle_multiplier": {
                "type": "number", "default": DEFAULT_ANGLE_MULTIPLIER, "min": 0.0, "max": MAX_ANGLE_MULTIPLIER,
                "description": "Radians of direction per unit of noise"
            },
            "short_count": {
                "type": "integer", "default": DEFAULT_SHORT_COUNT, "min": 0, "max": MAX_COLOR_COUNT,
                "description": "Lines up to this many points use the short colour"
            },
            "long_count": {
                "type": "integer", "default": DEFAULT_LONG_COUNT, "min": 0, "max": MAX_COLOR_COUNT,
                "description": "Lines beyond this many points use the long colour"
            },
            "sample_interval": {
                "type": "integer", "default": DEFAULT_SAMPLE_INTERVAL, "min": 1, "max": MAX_SAMPLE_INTERVAL,
                "description": "Points between start-point searches along a line"
            },
            "max_thickness": {
                "type": "number", "default": DEFAULT_MAX_THICKNESS, "min": 0.0, "max": MAX_THICKNESS,
                "description": "Line width away from the tapered ends"
            },
            "get_thick": {
                "type": "number", "default": DEFAULT_GET_THICK, "min": 0.0, "max": 1.0,
                "description": "Fraction of a line over which each end tapers"
            },
            "interline_distance": {
                "type": "number", "default": DEFAULT_INTERLINE_DISTANCE,
                "min": MIN_INTERLINE_DISTANCE, "max": MAX_INTERLINE_DISTANCE,
                "description": "Minimum distance between different lines"
            },
            "octaves": {
                "type": "integer", "default": DEFAULT_OCTAVES, "min": 1, "max": MAX_OCTAVES,
                "description": "Noise octaves of the direction field"
            },
            "start_pt_mult": {
                "type": "number", "default": DEFAULT_START_PT_MULT,
                "min": MIN_START_PT_MULT, "max": MAX_START_PT_MULT,
                "description": "Start-point offset from a neighbour, in interline distances"
            },
            "drop_below": {
                "type": "integer", "default": DEFAULT_DROP_BELOW, "min": 0, "max": MAX_DROP_BELOW,
                "description": "Lines with fewer points are not drawn"
            },
            "include_flower": {
                "type": "boolean", "default": DEFAULT_INCLUDE_FLOWER,
                "description": "Pre-seed a radial flower"
            },
            "flower": {
                "type": "object",
                "properties": {
                    "ctr_radius": {
                        "type": "number", "default": flower::DEFAULT_CTR_RADIUS, "min": 0.0, "max": MAX_CTR_RADIUS,
                        "description": "Radius of the empty centre"
                    },
                    "petal_length": {
                        "type": "number", "default": flower::DEFAULT_PETAL_LENGTH, "min": 0.0, "max": MAX_PETAL_LENGTH,
                        "description": "Purely radial zone beyond the centre"
                    },
                    "dropoff": {
                        "type": "number", "default": flower::DEFAULT_DROPOFF, "min": 0.0, "max": MAX_DROPOFF,
                        "description": "Blend zone from radial to noise direction"
                    }
                }
            },
            "short_color": {
                "type": "color", "default": DEFAULT_SHORT_COLOR,
                "description": "Colour of short lines"
            },
            "long_color": {
                "type": "color", "default": DEFAULT_LONG_COLOR,
                "description": "Colour of long lines"
            },
            "border_color": {
                "type": "color", "default": DEFAULT_BORDER_COLOR,
                "description": "Dot outline colour"
            },
            "border_width": {
                "type": "number", "default": DEFAULT_BORDER_WIDTH, "min": 0.0, "max": MAX_BORDER_WIDTH,
                "description": "Dot outline width; 0 disables"
            },
            "dotted": {
                "type": "boolean", "default": DEFAULT_DOTTED,
                "description": "Draw lines as dots instead of strokes"
            },
            "self_avoid": {
                "type": "boolean", "default": DEFAULT_SELF_AVOID,
                "description": "Keep lines away from their own distant points"
            }
        })
    }

    fn load_params(&mut self, params: &Value) -> Result<(), EngineError> {
        let loaded: FlowParams = serde_json::from_value(params.clone())?;
        let loaded = loaded.normalized();
        loaded.validate()?;
        self.params = loaded;
        Ok(())
    }
}
