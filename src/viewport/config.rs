use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Isolation padding must be a non negative number, got {0}")]
    InvalidPadding(f64),
    #[error("Minimum padding must be a positive number, got {0}")]
    InvalidMinPadding(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Most markers materialized for a full view.
    pub marker_limit: usize,
    /// Share of the span added on each side of an isolated trip's box.
    pub isolation_padding: f64,
    /// Padding in degrees for an axis where pickup and dropoff coincide.
    pub min_padding: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            marker_limit: 300,
            isolation_padding: 0.2,
            min_padding: 0.001,
        }
    }
}

impl Config {
    pub fn new(
        marker_limit: usize,
        isolation_padding: f64,
        min_padding: f64,
    ) -> Result<Self, ConfigError> {
        if !isolation_padding.is_finite() || isolation_padding < 0.0 {
            return Err(ConfigError::InvalidPadding(isolation_padding));
        }
        if !min_padding.is_finite() || min_padding <= 0.0 {
            return Err(ConfigError::InvalidMinPadding(min_padding));
        }
        Ok(Self {
            marker_limit,
            isolation_padding,
            min_padding,
        })
    }
}
