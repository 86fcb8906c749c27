//! Aeolian sand dune simulation engine.
//!
//! Sand slabs are eroded from cells in the open, hop downwind along `i` and
//! settle stochastically or in the wind shadow of taller cells upwind. The
//! field is a torus.

pub mod dunefield;
pub mod error;
pub mod grid;
pub mod params;
pub mod render;
pub mod shadow;
pub mod transport;


pub use dunefield::{CycleStats, DuneField};
pub use error::{DuneError, DuneResult};
pub use grid::Grid;
pub use params::{Colormap, DuneConfig, GridConfig, SimParams};

use wasm_bindgen::prelude::*;

/// Browser-facing handle. The front-end owns the frame loop and calls
/// `tick` between renders; nothing here runs concurrently with a cycle.
#[wasm_bindgen]
#[derive(Debug)]
pub struct Universe {
    field: DuneField,
}

#[wasm_bindgen]
impl Universe {
    /// Empty field with default parameters.
    ///
    /// # Errors
    /// Throws for a zero dimension.
    #[wasm_bindgen(constructor)]
    pub fn new(width: usize, height: usize) -> Result<Universe, JsError> {
        Ok(Self {
            field: DuneField::new(width, height, SimParams::default())?,
        })
    }

    /// Refill with white noise in `0..=initial_height` from `seed`.
    ///
    /// # Errors
    /// Throws for a negative `initial_height`.
    pub fn reset(&mut self, initial_height: i32, seed: u32) -> Result<(), JsError> {
        self.field.randomize_with_seed(0, initial_height, u64::from(seed))?;
        Ok(())
    }

    /// Run `sub_iterations` cycles (at least one) and return how many slabs
    /// were lifted, saturating at `u32::MAX`.
    pub fn tick(&mut self, sub_iterations: u32) -> u32 {
        let stats = self.field.run_cycles(sub_iterations.max(1) as usize);
        lifted_count(stats.active_cells)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.field.width()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.field.height()
    }

    /// # Errors
    /// Throws for a zero dimension.
    pub fn set_shape(&mut self, width: usize, height: usize) -> Result<(), JsError> {
        self.field.set_shape(width, height)?;
        Ok(())
    }

    /// # Errors
    /// Throws for zero.
    pub fn set_hop_length(&mut self, hop_length: usize) -> Result<(), JsError> {
        self.update_params(|p| p.hop_length = hop_length)
    }

    /// # Errors
    /// Throws for a non-positive or non-finite slope.
    pub fn set_shadow_slope(&mut self, shadow_slope: f32) -> Result<(), JsError> {
        self.update_params(|p| p.shadow_slope = shadow_slope)
    }

    /// Clamped into `[0, 1]`.
    ///
    /// # Errors
    /// Throws for NaN.
    pub fn set_prob_deposit_bare(&mut self, prob: f32) -> Result<(), JsError> {
        self.update_params(|p| p.prob_deposit_bare = prob)
    }

    /// Clamped into `[0, 1]`.
    ///
    /// # Errors
    /// Throws for NaN.
    pub fn set_prob_deposit_sand(&mut self, prob: f32) -> Result<(), JsError> {
        self.update_params(|p| p.prob_deposit_sand = prob)
    }

    /// Row-major heights, `i * height + j`.
    #[must_use]
    pub fn heights(&self) -> Vec<i32> {
        self.field.heights().values().to_vec()
    }

    /// Row-major shadow flags.
    #[must_use]
    pub fn shadow(&self) -> Vec<i32> {
        self.field.shadow().values().to_vec()
    }

    /// Texture bytes: `0` grayscale (1 byte/pixel), `1` nipy spectral (RGB).
    #[must_use]
    pub fn render(&self, colormap: u8) -> Vec<u8> {
        let colormap = if colormap == 1 {
            Colormap::NipySpectral
        } else {
            Colormap::Grayscale
        };
        render::render(self.field.heights(), colormap)
    }
}

fn lifted_count(active_cells: usize) -> u32 {
    u32::try_from(active_cells).unwrap_or(u32::MAX)
}

impl Universe {
    fn update_params(&mut self, edit: impl FnOnce(&mut SimParams)) -> Result<(), JsError> {
        let mut params = *self.field.params();
        edit(&mut params);
        self.field.set_params(params)?;
        Ok(())
    }

    /// The simulation behind this handle.
    #[must_use]
    pub fn field(&self) -> &DuneField {
        &self.field
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn universe(width: usize, height: usize) -> Universe {
        Universe {
            field: DuneField::new(width, height, SimParams::default()).unwrap(),
        }
    }

    #[test]
    fn universe_reset_fills_and_ticks() {
        let mut universe = universe(64, 16);
        assert_eq!((universe.width(), universe.height()), (64, 16));
        assert!(universe.heights().iter().all(|&v| v == 0));

        assert!(universe.reset(4, 7).is_ok());
        let mass: i64 = universe.heights().iter().map(|&v| i64::from(v)).sum();
        assert!(mass > 0);
        assert!(universe.heights().iter().all(|&v| (0..=4).contains(&v)));

        assert!(universe.tick(3) > 0);
        let after: i64 = universe.heights().iter().map(|&v| i64::from(v)).sum();
        assert_eq!(mass, after);
        assert_eq!(universe.field().cycle(), 3);
    }

    #[test]
    fn lifted_count_saturates() {
        assert_eq!(lifted_count(17), 17);
        assert_eq!(lifted_count(u32::MAX as usize), u32::MAX);
        assert_eq!(lifted_count(usize::MAX), u32::MAX);
    }

    #[test]
    fn universe_reset_adopts_seed() {
        let mut universe = universe(16, 8);
        assert!(universe.reset(3, 9).is_ok());
        assert_eq!(universe.field().params().seed, 9);
    }

    #[test]
    fn universe_tick_runs_at_least_once() {
        let mut universe = universe(8, 8);
        universe.tick(0);
        assert_eq!(universe.field().cycle(), 1);
    }

    #[test]
    fn universe_setters_reach_params() {
        let mut universe = universe(8, 8);
        assert!(universe.set_hop_length(3).is_ok());
        assert!(universe.set_shadow_slope(1.5).is_ok());
        assert!(universe.set_prob_deposit_bare(0.1).is_ok());
        assert!(universe.set_prob_deposit_sand(2.0).is_ok());
        let params = universe.field().params();
        assert_eq!(params.hop_length, 3);
        assert!((params.shadow_slope - 1.5).abs() < f32::EPSILON);
        assert!((params.prob_deposit_bare - 0.1).abs() < f32::EPSILON);
        assert!((params.prob_deposit_sand - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn universe_buffers_match_shape() {
        let mut universe = universe(12, 5);
        assert!(universe.reset(3, 1).is_ok());
        assert!(universe.set_shape(10, 6).is_ok());
        assert_eq!(universe.heights().len(), 60);
        assert_eq!(universe.shadow().len(), 60);
        assert_eq!(universe.render(0).len(), 60);
        assert_eq!(universe.render(1).len(), 180);
    }
}
