//! 8-bit pixel buffers for display and export.
//!
//! Images put `(0, 0)` at the bottom left: pixel row 0 is `j = height - 1`
//! and columns follow increasing `i`.

use crate::grid::Grid;
use crate::params::Colormap;

/// Stops of the "nipy spectral" colormap, evenly spaced over `[0, 1]`.
const NIPY_SPECTRAL: [[f32; 3]; 12] = [
    [0.000, 0.000, 0.000],
    [0.521, 0.000, 0.588],
    [0.000, 0.000, 0.794],
    [0.000, 0.527, 0.867],
    [0.000, 0.667, 0.630],
    [0.000, 0.612, 0.000],
    [0.000, 0.855, 0.000],
    [0.533, 1.000, 0.000],
    [0.970, 0.861, 0.000],
    [1.000, 0.382, 0.000],
    [0.855, 0.000, 0.000],
    [0.800, 0.800, 0.800],
];

/// Cell values in image order.
fn image_order(grid: &Grid) -> impl Iterator<Item = i32> + '_ {
    (0..grid.height())
        .rev()
        .flat_map(move |j| (0..grid.width()).map(move |i| grid.get(i, j)))
}

#[inline]
fn to_byte(unit: f32) -> u8 {
    (255.0 * unit).floor().clamp(0.0, 255.0) as u8
}

/// One byte per cell, `[min, max]` stretched to `[0, 255]`. All black when
/// the field is flat.
#[must_use]
pub fn to_grayscale(grid: &Grid) -> Vec<u8> {
    let (min, max) = (grid.min(), grid.max());
    if min == max {
        return vec![0; grid.len()];
    }
    let span = (max - min) as f32;
    image_order(grid)
        .map(|v| to_byte((v - min) as f32 / span))
        .collect()
}

/// [`to_grayscale`] packed as RGB triplets, ready for a PNG encoder.
#[must_use]
pub fn to_rgb_grayscale(grid: &Grid) -> Vec<u8> {
    to_grayscale(grid)
        .into_iter()
        .flat_map(|c| [c, c, c])
        .collect()
}

/// RGB triplets through the nipy spectral colormap, scaled by the maximum
/// height. All black when nothing is above zero.
#[must_use]
pub fn to_nipy_spectral(grid: &Grid) -> Vec<u8> {
    let max = grid.max();
    if max <= 0 {
        return vec![0; 3 * grid.len()];
    }
    let scale = 1.0 / max as f32;
    image_order(grid)
        .flat_map(|v| {
            let [r, g, b] = nipy_spectral(v as f32 * scale);
            [to_byte(r), to_byte(g), to_byte(b)]
        })
        .collect()
}

/// Linear interpolation between colormap stops; `t` is clamped to `[0, 1]`.
#[must_use]
pub fn nipy_spectral(t: f32) -> [f32; 3] {
    let last = NIPY_SPECTRAL.len() - 1;
    let pos = t.clamp(0.0, 1.0) * last as f32;
    let lo = pos as usize;
    if lo >= last {
        return NIPY_SPECTRAL[last];
    }
    let frac = pos - lo as f32;
    let (a, b) = (NIPY_SPECTRAL[lo], NIPY_SPECTRAL[lo + 1]);
    [0, 1, 2].map(|c| (1.0 - frac) * a[c] + frac * b[c])
}

/// Bytes per pixel for `colormap`.
#[must_use]
pub fn channels(colormap: Colormap) -> usize {
    match colormap {
        Colormap::Grayscale => 1,
        Colormap::NipySpectral => 3,
    }
}

#[must_use]
pub fn render(grid: &Grid, colormap: Colormap) -> Vec<u8> {
    match colormap {
        Colormap::Grayscale => to_grayscale(grid),
        Colormap::NipySpectral => to_nipy_spectral(grid),
    }
}
