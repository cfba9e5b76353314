//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::driver::Engine;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Surface pipeline errors instead of returning no result
    pub strict_errors: bool,

    /// Root directory for on-disk caches and sample thumbnails
    pub cache_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            strict_errors: false,
            cache_dir: PathBuf::from("~/.cache/thumbhash"),
        }
    }
}

/// How source images are sampled before hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Pixel extraction backend
    pub engine: Engine,

    /// Longest side of the sample thumbnail that gets encoded.
    /// Capped at 100px.
    pub sample_max_size: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            engine: Engine::Basic,
            sample_max_size: 100,
        }
    }
}

/// Placeholder rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Gaussian blur radius; larger is smoother but less accurate, 0 disables the SVG wrapper
    pub blur_radius: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { blur_radius: 1.0 }
    }
}

/// Cache namespace toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache hashes per file and ratio
    pub encode: bool,

    /// Cache decoded placeholders per hash
    pub decode: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            encode: true,
            decode: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
