//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

/// Upper bound for `sampling.sample_max_size`; larger samples cost memory
/// without improving the hash.
pub const MAX_SAMPLE_SIZE: u32 = 100;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let max = self.sampling.sample_max_size;
        if max == 0 || max > MAX_SAMPLE_SIZE {
            return Err(ConfigError::ValidationError(format!(
                "sampling.sample_max_size must be between 1 and {MAX_SAMPLE_SIZE}"
            )));
        }
        let blur = self.render.blur_radius;
        if !blur.is_finite() || blur < 0.0 {
            return Err(ConfigError::ValidationError(
                "render.blur_radius must be a finite number >= 0".into(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(
                "logging.format must be \"pretty\" or \"json\"".into(),
            ));
        }
        Ok(())
    }
}
