//! Bidirectional point sequences traced through the direction field.

use glam::DVec2;
use std::ops::Index;

/// Which end of a streamline a point is appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// A traced path grown in both directions from a seed point.
///
/// Index 0 is the seed. Indices `0..F` are forward points in creation order;
/// `-1..=-B` are backward points in creation order (`-1` is the first point
/// traced backward). Walking from `-B` to `F - 1` follows the path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Streamline {
    fwd: Vec<DVec2>,
    bwd: Vec<DVec2>,
    forward_only: bool,
}

impl Streamline {
    pub fn new() -> Self {
        Self::default()
    }

    /// A streamline that is never traced backward (flower petals).
    pub fn forward_only() -> Self {
        Self {
            forward_only: true,
            ..Self::default()
        }
    }

    pub fn is_forward_only(&self) -> bool {
        self.forward_only
    }

    /// Appends `pt` and returns its signed index.
    pub fn push(&mut self, pt: DVec2, direction: Direction) -> isize {
        match direction {
            Direction::Forward => {
                self.fwd.push(pt);
                self.fwd.len() as isize - 1
            }
            Direction::Backward => {
                self.bwd.push(pt);
                -(self.bwd.len() as isize)
            }
        }
    }

    /// Index the next point pushed in `direction` will receive.
    pub fn next_index(&self, direction: Direction) -> isize {
        match direction {
            Direction::Forward => self.fwd.len() as isize,
            Direction::Backward => -(self.bwd.len() as isize) - 1,
        }
    }

    pub fn get(&self, i: isize) -> Option<DVec2> {
        if i < 0 {
            self.bwd.get((-1 - i) as usize).copied()
        } else {
            self.fwd.get(i as usize).copied()
        }
    }

    pub fn fwd_count(&self) -> usize {
        self.fwd.len()
    }

    pub fn bwd_count(&self) -> usize {
        self.bwd.len()
    }

    /// Total point count, forward plus backward.
    pub fn len(&self) -> usize {
        self.fwd.len() + self.bwd.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fwd.is_empty() && self.bwd.is_empty()
    }

    /// Lowest valid index (`-B`).
    pub fn first_index(&self) -> isize {
        -(self.bwd.len() as isize)
    }

    /// Highest valid index (`F - 1`).
    pub fn last_index(&self) -> isize {
        self.fwd.len() as isize - 1
    }

    /// Points in path order, from index `-B` to `F - 1`.
    pub fn path(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.bwd.iter().rev().chain(self.fwd.iter()).copied()
    }

    /// Unit tangent at `i` along the path direction, using the following
    /// point (or the preceding one at the far end). `None` for lines with
    /// fewer than two distinct points around `i`.
    pub fn tangent(&self, i: isize) -> Option<DVec2> {
        let here = self.get(i)?;
        let delta = match self.get(i + 1) {
            Some(next) => next - here,
            None => here - self.get(i - 1)?,
        };
        delta.try_normalize()
    }
}

impl Index<isize> for Streamline {
    type Output = DVec2;

    fn index(&self, i: isize) -> &DVec2 {
        if i < 0 {
            &self.bwd[(-1 - i) as usize]
        } else {
            &self.fwd[i as usize]
        }
    }
}
