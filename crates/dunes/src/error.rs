//! Error types for configuring a dune field.

use thiserror::Error;

/// Result alias used at every configuration boundary.
pub type DuneResult<T> = Result<T, DuneError>;

/// Everything that can be rejected before a cycle starts.
///
/// Once `run_cycle` begins there is no failure path; all checks happen here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DuneError {
    /// A grid dimension was zero.
    #[error("invalid grid shape {width}x{height}: both dimensions must be positive")]
    InvalidShape { width: usize, height: usize },

    /// A simulation parameter outside its usable range.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    /// Malformed configuration document.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DuneError {
    pub(crate) fn parameter(name: &'static str, value: impl ToString, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

impl From<toml::de::Error> for DuneError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}
