//! Simulation controller: owns the fields, the parameters and the RNG.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::DuneResult;
use crate::grid::Grid;
use crate::params::{DuneConfig, SimParams};
use crate::shadow;
use crate::transport::transport_slab;

/// Summary of one or more cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleStats {
    /// Number of cycles run so far, including this one.
    pub cycle: u64,
    /// Cells that were lit and sandy when visited, i.e. slabs lifted.
    pub active_cells: usize,
    /// Slabs dropped by the hop cap instead of a deposition draw.
    pub forced_deposits: usize,
}

/// A toroidal dune field.
///
/// Cells are processed one at a time in a freshly shuffled order each cycle,
/// so a run is fully determined by the seed, the parameters and the starting
/// heights.
#[derive(Debug)]
pub struct DuneField {
    heights: Grid,
    shadow: Grid,
    params: SimParams,
    rng: StdRng,
    order: Vec<usize>,
    cycle: u64,
}

impl DuneField {
    /// Empty (all-zero) field.
    ///
    /// # Errors
    /// Rejects a zero dimension or parameters refused by
    /// [`SimParams::validate`].
    pub fn new(width: usize, height: usize, params: SimParams) -> DuneResult<Self> {
        let params = params.validate()?;
        let heights = Grid::new(width, height)?;
        let shadow = Grid::new(width, height)?;
        log::debug!("dune field {width}x{height}, {params:?}");
        Ok(Self {
            heights,
            shadow,
            rng: StdRng::seed_from_u64(params.seed),
            params,
            order: (0..width * height).collect(),
            cycle: 0,
        })
    }

    /// Field shaped and filled with white noise as `config` describes.
    ///
    /// # Errors
    /// See [`DuneConfig::validate`].
    pub fn from_config(config: &DuneConfig) -> DuneResult<Self> {
        let config = config.validate()?;
        let mut field = Self::new(config.grid.width, config.grid.height, config.params)?;
        field.randomize(0, config.grid.initial_height)?;
        Ok(field)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.heights.width()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.heights.height()
    }

    #[must_use]
    pub fn heights(&self) -> &Grid {
        &self.heights
    }

    /// Mask computed at the start of the last cycle (or by the last
    /// explicit [`DuneField::update_shadow`]).
    #[must_use]
    pub fn shadow(&self) -> &Grid {
        &self.shadow
    }

    #[must_use]
    pub fn params(&self) -> &SimParams {
        &self.params
    }

    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Replace the parameters between cycles. Heights are kept; a new seed
    /// restarts the RNG stream.
    ///
    /// # Errors
    /// See [`SimParams::validate`]. Nothing changes on error.
    pub fn set_params(&mut self, params: SimParams) -> DuneResult<()> {
        let params = params.validate()?;
        let reseed = params.seed != self.params.seed;
        self.params = params;
        if reseed {
            self.reseed(params.seed);
        }
        Ok(())
    }

    /// Restart the RNG stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        log::debug!("reseeding dune field with {seed}");
        self.params.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Reallocate both fields; every cell reads zero afterwards.
    ///
    /// # Errors
    /// [`crate::DuneError::InvalidShape`] for a zero dimension, in which case
    /// the field is unchanged.
    pub fn set_shape(&mut self, width: usize, height: usize) -> DuneResult<()> {
        self.heights.reshape(width, height)?;
        self.shadow.reshape(width, height)?;
        self.order.clear();
        self.order.extend(0..width * height);
        log::debug!("dune field reshaped to {width}x{height}");
        Ok(())
    }

    /// Fill heights with white noise in `low..=high` from the configured seed,
    /// restart the RNG stream and refresh the shadow mask.
    ///
    /// # Errors
    /// Rejects `low > high`.
    pub fn randomize(&mut self, low: i32, high: i32) -> DuneResult<()> {
        self.randomize_with_seed(low, high, self.params.seed)
    }

    /// [`DuneField::randomize`] with a new seed, which becomes the configured
    /// one. A rejected range leaves heights, seed and RNG stream untouched.
    ///
    /// # Errors
    /// Rejects `low > high`.
    pub fn randomize_with_seed(&mut self, low: i32, high: i32, seed: u64) -> DuneResult<()> {
        self.heights.fill_random(low, high, seed)?;
        self.reseed(seed);
        self.update_shadow();
        Ok(())
    }

    /// Overwrite one cell. Indices must be in range.
    pub fn set_height(&mut self, i: usize, j: usize, value: i32) {
        self.heights.set(i, j, value);
    }

    /// Recompute the shadow mask from the current heights.
    pub fn update_shadow(&mut self) {
        shadow::update_shadow(&self.heights, &mut self.shadow, self.params.shadow_slope);
    }

    /// One transport cycle: refresh the shadow mask, then run the transport
    /// rule once for every cell in shuffled order.
    pub fn run_cycle(&mut self) -> CycleStats {
        self.update_shadow();
        self.order.shuffle(&mut self.rng);
        self.cycle += 1;

        let mut stats = CycleStats {
            cycle: self.cycle,
            ..CycleStats::default()
        };
        for &idx in &self.order {
            let (i, j) = self.heights.coords(idx);
            let outcome = transport_slab(
                &mut self.heights,
                &self.shadow,
                i,
                j,
                &self.params,
                &mut self.rng,
            );
            if let Some(outcome) = outcome {
                stats.active_cells += 1;
                stats.forced_deposits += usize::from(outcome.forced);
            }
        }

        if stats.forced_deposits > 0 {
            log::warn!(
                "cycle {}: {} slabs hit the {:?} hop cap",
                stats.cycle,
                stats.forced_deposits,
                self.params.max_hops
            );
        }
        log::trace!("{stats:?}");
        stats
    }

    /// Run `count` cycles back to back, summing their stats.
    pub fn run_cycles(&mut self, count: usize) -> CycleStats {
        let mut total = CycleStats {
            cycle: self.cycle,
            ..CycleStats::default()
        };
        for _ in 0..count {
            let stats = self.run_cycle();
            total.cycle = stats.cycle;
            total.active_cells += stats.active_cells;
            total.forced_deposits += stats.forced_deposits;
        }
        total
    }
}
