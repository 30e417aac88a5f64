//! Dense row-major 2-D grid.
//!
//! Used for per-pixel accumulators (hit counts, channel sums). Unlike a
//! scalar field there is no wrapping and no clamping: out-of-range
//! coordinates return `None`.

use crate::error::EngineError;

/// `width * height` cells of `T` in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> Grid<T> {
    /// Creates a grid filled with `T::default()`.
    ///
    /// Returns `EngineError::InvalidDimensions` if either dimension is zero
    /// or if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![T::default(); len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Flat index of `(x, y)`, or `None` when outside the grid.
    pub fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<T> {
        self.index(x, y).map(|i| self.data[i])
    }

    /// Writes `value` at `(x, y)`; returns `false` when outside the grid.
    pub fn set(&mut self, x: usize, y: usize, value: T) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.data[i] = value;
                true
            }
            None => false,
        }
    }

    /// Combines `other` into `self` cell by cell with `f(self, other)`.
    ///
    /// Returns `EngineError::DimensionMismatch` if the grids differ in size.
    pub fn merge_with(
        &mut self,
        other: &Grid<T>,
        f: impl Fn(T, T) -> T,
    ) -> Result<(), EngineError> {
        if self.width != other.width || self.height != other.height {
            return Err(EngineError::DimensionMismatch {
                lhs_w: self.width,
                lhs_h: self.height,
                rhs_w: other.width,
                rhs_h: other.height,
            });
        }
        for (a, &b) in self.data.iter_mut().zip(&other.data) {
            *a = f(*a, b);
        }
        Ok(())
    }
}

/// `width * height`, rejecting zero and overflowing dimensions.
pub fn checked_len(width: usize, height: usize) -> Result<usize, EngineError> {
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .ok_or(EngineError::InvalidDimensions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_default_filled() {
        let g: Grid<u32> = Grid::new(3, 2).unwrap();
        assert_eq!(g.width(), 3);
        assert_eq!(g.height(), 2);
        assert_eq!(g.data(), &[0; 6]);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            Grid::<u8>::new(0, 4),
            Err(EngineError::InvalidDimensions)
        ));
        assert!(Grid::<u8>::new(4, 0).is_err());
    }

    #[test]
    fn overflowing_dimensions_are_rejected() {
        assert!(checked_len(usize::MAX, 2).is_err());
    }

    #[test]
    fn get_and_set_are_row_major() {
        let mut g: Grid<u64> = Grid::new(4, 3).unwrap();
        assert!(g.set(1, 2, 9));
        assert_eq!(g.get(1, 2), Some(9));
        assert_eq!(g.data()[2 * 4 + 1], 9);
    }

    #[test]
    fn out_of_range_access_is_none() {
        let mut g: Grid<u8> = Grid::new(2, 2).unwrap();
        assert_eq!(g.get(2, 0), None);
        assert_eq!(g.get(0, 2), None);
        assert!(!g.set(5, 5, 1));
    }

    #[test]
    fn merge_with_combines_elementwise() {
        let mut a: Grid<u32> = Grid::new(2, 2).unwrap();
        let mut b: Grid<u32> = Grid::new(2, 2).unwrap();
        a.set(0, 0, 3);
        b.set(0, 0, 4);
        b.set(1, 1, u32::MAX);
        a.set(1, 1, 1);
        a.merge_with(&b, u32::saturating_add).unwrap();
        assert_eq!(a.get(0, 0), Some(7));
        assert_eq!(a.get(1, 1), Some(u32::MAX));
    }

    #[test]
    fn merge_with_rejects_mismatched_sizes() {
        let mut a: Grid<u32> = Grid::new(2, 2).unwrap();
        let b: Grid<u32> = Grid::new(3, 2).unwrap();
        let err = a.merge_with(&b, |x, y| x + y).unwrap_err();
        assert!(matches!(err, EngineError::DimensionMismatch { .. }));
    }
}
