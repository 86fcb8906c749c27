//! Wind-shadow mask.
//!
//! A cell is shadowed when some cell `k` steps upwind (towards lower `i`) is
//! taller than it by more than `k * slope`. Each cell only reads heights and
//! writes its own flag, so the pass can run in any order; with the `parallel`
//! feature it is split across threads.

use crate::grid::Grid;

/// How far upwind a shadow can reach: `1 + floor(max_height / slope)`,
/// saturating at `usize::MAX` for very shallow slopes.
///
/// Cells are examined for `k` in `1..reach`. `slope` must be positive.
#[must_use]
pub fn shadow_reach(max_height: i32, slope: f32) -> usize {
    debug_assert!(slope > 0.0, "shadow slope must be positive");
    ((max_height.max(0) as f32 / slope) as usize).saturating_add(1)
}

/// Whether an upwind cell within `reach` shadows `(i, j)`.
#[must_use]
pub fn casts_shadow(heights: &Grid, i: usize, j: usize, slope: f32, reach: usize) -> bool {
    let width = heights.width();
    let here = heights.get(i, j) as f32;
    (1..reach).any(|k| {
        let upwind = (i + width - k % width) % width;
        heights.get(upwind, j) as f32 - here - k as f32 * slope > 0.0
    })
}

/// Recompute every flag of `shadow` (1 = shadowed, 0 = lit) from `heights`.
pub fn update_shadow(heights: &Grid, shadow: &mut Grid, slope: f32) {
    debug_assert_eq!(
        (heights.width(), heights.height()),
        (shadow.width(), shadow.height()),
        "shadow mask and height field must share a shape"
    );
    // Past one lap the same upwind cells come back with a higher threshold.
    let reach = shadow_reach(heights.max(), slope).min(heights.width() + 1);
    let flag = |idx: usize| {
        let (i, j) = heights.coords(idx);
        i32::from(casts_shadow(heights, i, j, slope, reach))
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        shadow
            .values_mut()
            .par_iter_mut()
            .enumerate()
            .for_each(|(idx, cell)| *cell = flag(idx));
    }

    #[cfg(not(feature = "parallel"))]
    for (idx, cell) in shadow.values_mut().iter_mut().enumerate() {
        *cell = flag(idx);
    }
}
