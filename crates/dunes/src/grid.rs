//! Fixed-shape 2D integer field with toroidal neighbour arithmetic.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{DuneError, DuneResult};

/// Dense `width x height` field of sand-slab counts, row-major by `i`.
///
/// Cell `(i, j)` lives at `i * height + j`. `get`/`set` expect in-range
/// indices; use [`Grid::wrap`] to fold signed offsets onto the torus first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    values: Vec<i32>,
}

impl Grid {
    /// Allocate a zero-filled grid.
    ///
    /// # Errors
    /// [`DuneError::InvalidShape`] when either dimension is zero.
    pub fn new(width: usize, height: usize) -> DuneResult<Self> {
        check_shape(width, height)?;
        Ok(Self {
            width,
            height,
            values: vec![0; width * height],
        })
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false: a grid has at least one cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.width && j < self.height, "({i}, {j}) out of range");
        i * self.height + j
    }

    /// Inverse of [`Grid::index`].
    #[must_use]
    #[inline]
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index / self.height, index % self.height)
    }

    /// Fold a signed position onto the torus.
    #[must_use]
    #[inline]
    pub fn wrap(&self, i: isize, j: isize) -> (usize, usize) {
        (
            i.rem_euclid(self.width as isize) as usize,
            j.rem_euclid(self.height as isize) as usize,
        )
    }

    #[must_use]
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> i32 {
        self.values[self.index(i, j)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: i32) {
        let idx = self.index(i, j);
        self.values[idx] = value;
    }

    /// Add `amount` to a single cell.
    #[inline]
    pub fn add(&mut self, i: usize, j: usize, amount: i32) {
        let idx = self.index(i, j);
        self.values[idx] += amount;
    }

    /// Reallocate to a new shape. Previous contents are discarded and every
    /// cell reads zero afterwards, even when the shape is unchanged.
    ///
    /// # Errors
    /// [`DuneError::InvalidShape`] when either dimension is zero; the grid is
    /// left untouched in that case.
    pub fn reshape(&mut self, width: usize, height: usize) -> DuneResult<()> {
        check_shape(width, height)?;
        self.width = width;
        self.height = height;
        self.values.clear();
        self.values.resize(width * height, 0);
        Ok(())
    }

    #[must_use]
    pub fn max(&self) -> i32 {
        self.values.iter().copied().max().unwrap_or(0)
    }

    #[must_use]
    pub fn min(&self) -> i32 {
        self.values.iter().copied().min().unwrap_or(0)
    }

    /// Total sand mass.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.values.iter().map(|&v| i64::from(v)).sum()
    }

    pub fn fill(&mut self, value: i32) {
        self.values.fill(value);
    }

    /// White noise: every cell drawn independently from `low..=high`.
    ///
    /// # Errors
    /// [`DuneError::InvalidParameter`] when `low > high`.
    pub fn fill_random(&mut self, low: i32, high: i32, seed: u64) -> DuneResult<()> {
        if low > high {
            return Err(DuneError::parameter(
                "initial_height",
                format!("{low}..={high}"),
                "lower bound exceeds upper bound",
            ));
        }
        let mut rng = StdRng::seed_from_u64(seed);
        for v in &mut self.values {
            *v = rng.random_range(low..=high);
        }
        Ok(())
    }

    /// Row-major view of every cell, for renderers and exporters.
    #[must_use]
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [i32] {
        &mut self.values
    }
}

fn check_shape(width: usize, height: usize) -> DuneResult<()> {
    if width == 0 || height == 0 {
        return Err(DuneError::InvalidShape { width, height });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_grid_is_zeroed() {
        let grid = Grid::new(8, 4).unwrap();
        assert_eq!(grid.width(), 8);
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.len(), 32);
        assert!(grid.values().iter().all(|&v| v == 0));
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert_eq!(
            Grid::new(0, 4),
            Err(DuneError::InvalidShape { width: 0, height: 4 })
        );
        assert!(Grid::new(4, 0).is_err());
    }

    #[test]
    fn storage_is_row_major_by_first_axis() {
        let mut grid = Grid::new(3, 5).unwrap();
        grid.set(1, 2, 7);
        assert_eq!(grid.values()[5 + 2], 7);
        assert_eq!(grid.coords(7), (1, 2));
    }

    #[test]
    fn wrap_folds_negative_and_overflowing_offsets() {
        let grid = Grid::new(4, 3).unwrap();
        assert_eq!(grid.wrap(-1, -1), (3, 2));
        assert_eq!(grid.wrap(4, 3), (0, 0));
        assert_eq!(grid.wrap(-9, 7), (3, 1));
    }

    #[test]
    fn min_max_total() {
        let mut grid = Grid::new(2, 2).unwrap();
        grid.set(0, 0, 5);
        grid.set(1, 1, -2);
        assert_eq!(grid.max(), 5);
        assert_eq!(grid.min(), -2);
        assert_eq!(grid.total(), 3);
    }

    #[test]
    fn failed_reshape_keeps_contents() {
        let mut grid = Grid::new(2, 2).unwrap();
        grid.fill(3);
        assert!(grid.reshape(0, 2).is_err());
        assert_eq!(grid.total(), 12);
    }

    #[test]
    fn fill_random_rejects_inverted_range() {
        let mut grid = Grid::new(2, 2).unwrap();
        assert!(grid.fill_random(5, 1, 0).is_err());
    }

    proptest! {
        #[test]
        fn prop_reshape_twice_yields_zeroes(
            w in 1usize..32,
            h in 1usize..32,
            fill in -50i32..50,
        ) {
            let mut grid = Grid::new(w, h).unwrap();
            grid.fill(fill);
            grid.reshape(w, h).unwrap();
            prop_assert!(grid.values().iter().all(|&v| v == 0));
            grid.fill(fill);
            grid.reshape(w, h).unwrap();
            prop_assert!(grid.values().iter().all(|&v| v == 0));
            prop_assert_eq!(grid.len(), w * h);
        }

        #[test]
        fn prop_fill_random_stays_in_range_and_repeats(
            low in 0i32..10,
            span in 0i32..10,
            seed in any::<u64>(),
        ) {
            let high = low + span;
            let mut a = Grid::new(16, 8).unwrap();
            let mut b = Grid::new(16, 8).unwrap();
            a.fill_random(low, high, seed).unwrap();
            b.fill_random(low, high, seed).unwrap();
            prop_assert!(a.values().iter().all(|&v| (low..=high).contains(&v)));
            prop_assert_eq!(a, b);
        }

        // Shifting the whole field by one column maps a boundary cell's wrapped
        // neighbour onto the interior neighbour of the shifted cell.
        #[test]
        fn prop_wrap_matches_shifted_interior(
            w in 2usize..16,
            h in 2usize..16,
            seed in any::<u64>(),
            di in -1isize..=1,
            dj in -1isize..=1,
        ) {
            let mut grid = Grid::new(w, h).unwrap();
            grid.fill_random(0, 100, seed).unwrap();

            let mut shifted = Grid::new(w, h).unwrap();
            for i in 0..w {
                for j in 0..h {
                    let (si, sj) = grid.wrap(i as isize + 1, j as isize + 1);
                    shifted.set(si, sj, grid.get(i, j));
                }
            }

            // (0, 0) sits on both boundaries; in `shifted` it sits at (1, 1).
            let (ni, nj) = grid.wrap(di, dj);
            let (si, sj) = shifted.wrap(1 + di, 1 + dj);
            prop_assert_eq!(grid.get(ni, nj), shifted.get(si, sj));
        }
    }
}
