//! Uniform spatial hash enforcing the minimum separation between streamlines.
//!
//! The canvas is divided into square cells whose side equals the separation
//! distance, so every point closer than the separation lies in the 3x3
//! neighbourhood of a candidate's cell. Cells only ever grow.

use crate::streamline::Streamline;
use genart_core::error::EngineError;
use glam::DVec2;

/// Indices of one streamline's points that fall in a cell.
#[derive(Debug, Clone)]
struct CellEntry {
    line: usize,
    indices: Vec<isize>,
}

/// How a candidate treats points of its own streamline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfCheck {
    /// Same-line points are never compared.
    Skip,
    /// Same-line points more than `window` indices away are compared too.
    Beyond { window: isize },
}

/// Spatial hash over the canvas.
#[derive(Debug, Clone)]
pub struct SpatialHashGrid {
    separation: f64,
    separation_sq: f64,
    width: f64,
    height: f64,
    map_width: usize,
    map_height: usize,
    cells: Vec<Vec<CellEntry>>,
}

impl SpatialHashGrid {
    /// Grid for a `width` x `height` canvas.
    ///
    /// Returns `InvalidParameter` unless `separation` is finite and at least
    /// one pixel, which keeps the cell count within the canvas pixel count.
    pub fn new(width: usize, height: usize, separation: f64) -> Result<Self, EngineError> {
        if !separation.is_finite() || separation < 1.0 {
            return Err(EngineError::invalid_param(
                "interline_distance",
                "must be finite and at least 1",
            ));
        }
        let map_width = (width as f64 / separation) as usize + 1;
        let map_height = (height as f64 / separation) as usize + 1;
        let len = map_width
            .checked_mul(map_height)
            .ok_or(EngineError::InvalidDimensions)?;
        Ok(Self {
            separation,
            separation_sq: separation * separation,
            width: width as f64,
            height: height as f64,
            map_width,
            map_height,
            cells: vec![Vec::new(); len],
        })
    }

    pub fn separation(&self) -> f64 {
        self.separation
    }

    /// Whether `pt` lies on the canvas.
    pub fn contains(&self, pt: DVec2) -> bool {
        pt.x >= 0.0 && pt.y >= 0.0 && pt.x < self.width && pt.y < self.height
    }

    fn cell_of(&self, pt: DVec2) -> (usize, usize) {
        (
            (pt.x / self.separation) as usize,
            (pt.y / self.separation) as usize,
        )
    }

    /// True if no registered point within the 3x3 neighbourhood of `pt` is
    /// closer than the separation distance.
    ///
    /// `line` is the streamline the candidate would join (`None` for a
    /// fresh start point) and `candidate` its future index on that line.
    pub fn is_valid(
        &self,
        lines: &[Streamline],
        pt: DVec2,
        line: Option<usize>,
        candidate: isize,
        self_check: SelfCheck,
    ) -> bool {
        if !self.contains(pt) {
            return true;
        }
        let (cx, cy) = self.cell_of(pt);
        for ix in cx.saturating_sub(1)..=(cx + 1).min(self.map_width - 1) {
            for iy in cy.saturating_sub(1)..=(cy + 1).min(self.map_height - 1) {
                for entry in &self.cells[iy * self.map_width + ix] {
                    let same_line = Some(entry.line) == line;
                    if same_line && self_check == SelfCheck::Skip {
                        continue;
                    }
                    let other = &lines[entry.line];
                    let too_close = entry.indices.iter().any(|&i| {
                        if let (true, SelfCheck::Beyond { window }) = (same_line, self_check) {
                            if (i - candidate).abs() <= window {
                                return false;
                            }
                        }
                        other[i].distance_squared(pt) < self.separation_sq
                    });
                    if too_close {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Records that point `index` of streamline `line` sits at `pt`.
    /// Off-canvas points are ignored.
    pub fn insert(&mut self, line: usize, index: isize, pt: DVec2) {
        if !self.contains(pt) {
            return;
        }
        let (cx, cy) = self.cell_of(pt);
        let cell = &mut self.cells[cy * self.map_width + cx];
        match cell.iter_mut().find(|e| e.line == line) {
            Some(entry) => entry.indices.push(index),
            None => cell.push(CellEntry {
                line,
                indices: vec![index],
            }),
        }
    }

    /// Number of registered points across all cells.
    pub fn point_count(&self) -> usize {
        self.cells
            .iter()
            .flat_map(|c| c.iter())
            .map(|e| e.indices.len())
            .sum()
    }
}
