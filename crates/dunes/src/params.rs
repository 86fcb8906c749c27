//! Simulation parameters and the TOML configuration surface.
//!
//! Values are checked once, when they enter a [`crate::DuneField`]. The cycle
//! itself never re-validates anything.

use serde::{Deserialize, Serialize};

use crate::error::{DuneError, DuneResult};

/// `3 * tan(15°)`: shadow length per slab of height difference.
pub const DEFAULT_SHADOW_SLOPE: f32 = 0.803_847_6;

/// Hop attempts before a travelling slab is dropped where it is.
pub const DEFAULT_MAX_HOPS: u32 = 4096;

/// Transport and deposition parameters. Safe to change between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Height threshold added per cell of upwind distance when casting shadows.
    pub shadow_slope: f32,
    /// Cells travelled downwind per hop.
    pub hop_length: usize,
    /// Deposition probability on a bare cell.
    pub prob_deposit_bare: f32,
    /// Deposition probability on a sandy cell.
    pub prob_deposit_sand: f32,
    /// Seed for the cycle RNG and for [`crate::DuneField::randomize`].
    pub seed: u64,
    /// Hop cap per slab; `None` lets a slab hop until it deposits.
    pub max_hops: Option<u32>,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            shadow_slope: DEFAULT_SHADOW_SLOPE,
            hop_length: 1,
            prob_deposit_bare: 0.4,
            prob_deposit_sand: 0.6,
            seed: 1,
            max_hops: Some(DEFAULT_MAX_HOPS),
        }
    }
}

impl SimParams {
    /// Reject values that would make the shadow bound or the hop loop
    /// meaningless, and clamp probabilities into `[0, 1]`.
    ///
    /// # Errors
    /// [`DuneError::InvalidParameter`] for a non-positive or non-finite
    /// `shadow_slope`, a zero `hop_length`, a zero `max_hops`, or a NaN
    /// probability.
    pub fn validate(self) -> DuneResult<Self> {
        if !self.shadow_slope.is_finite() || self.shadow_slope <= 0.0 {
            return Err(DuneError::parameter(
                "shadow_slope",
                self.shadow_slope,
                "must be finite and positive",
            ));
        }
        if self.hop_length == 0 {
            return Err(DuneError::parameter(
                "hop_length",
                self.hop_length,
                "must be at least 1",
            ));
        }
        if self.max_hops == Some(0) {
            return Err(DuneError::parameter(
                "max_hops",
                0,
                "must be at least 1 when set",
            ));
        }
        Ok(Self {
            prob_deposit_bare: clamp_probability("prob_deposit_bare", self.prob_deposit_bare)?,
            prob_deposit_sand: clamp_probability("prob_deposit_sand", self.prob_deposit_sand)?,
            ..self
        })
    }
}

fn clamp_probability(name: &'static str, value: f32) -> DuneResult<f32> {
    if value.is_nan() {
        return Err(DuneError::parameter(name, value, "must be a number"));
    }
    if (0.0..=1.0).contains(&value) {
        return Ok(value);
    }
    let clamped = value.clamp(0.0, 1.0);
    log::warn!("{name} = {value} outside [0, 1], clamped to {clamped}");
    Ok(clamped)
}

/// Initial field shape and sand amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    /// Cells start with a uniform random height in `0..=initial_height`.
    pub initial_height: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 128,
            initial_height: 4,
        }
    }
}

/// Whole-run configuration, usually read from a TOML document:
///
/// ```toml
/// [grid]
/// width = 256
/// height = 64
/// initial_height = 4
///
/// [params]
/// hop_length = 2
/// prob_deposit_sand = 0.7
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DuneConfig {
    pub grid: GridConfig,
    pub params: SimParams,
}

impl DuneConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    /// [`DuneError::Config`] for malformed TOML, otherwise whatever
    /// [`SimParams::validate`] or the grid shape check rejects.
    pub fn from_toml_str(source: &str) -> DuneResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()
    }

    /// # Errors
    /// See [`DuneConfig::from_toml_str`].
    pub fn validate(self) -> DuneResult<Self> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(DuneError::InvalidShape {
                width: self.grid.width,
                height: self.grid.height,
            });
        }
        if self.grid.initial_height < 0 {
            return Err(DuneError::parameter(
                "initial_height",
                self.grid.initial_height,
                "must not be negative",
            ));
        }
        Ok(Self {
            grid: self.grid,
            params: self.params.validate()?,
        })
    }
}

/// Pixel mapping used by [`crate::render::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Colormap {
    #[default]
    Grayscale,
    NipySpectral,
}
