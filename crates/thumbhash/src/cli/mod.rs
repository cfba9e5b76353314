//! Command implementations and the setup they share.

pub mod color;
pub mod config;
pub mod decode;
pub mod encode;
pub mod invalidate;
pub mod placeholder;

use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use thumbhash_core::{CacheStore, Config, FileCache, LocalImage, NullCache, ThumbHashService};

/// Load the config at `path`, or the default location when `None`.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load()?,
    };
    Ok(config)
}

/// Build a service whose caches live under `general.cache_dir`.
pub fn build_service(config: Config) -> anyhow::Result<ThumbHashService> {
    let cache_dir = config.cache_dir();
    let encode_store = store(&cache_dir.join("encode"), config.cache.encode)?;
    let decode_store = store(&cache_dir.join("decode"), config.cache.decode)?;
    tracing::debug!("Cache directory: {:?}", cache_dir);
    Ok(ThumbHashService::new(config, encode_store, decode_store))
}

fn store(dir: &Path, enabled: bool) -> anyhow::Result<Arc<dyn CacheStore>> {
    if !enabled {
        return Ok(Arc::new(NullCache));
    }
    let cache = FileCache::new(dir)
        .with_context(|| format!("Failed to create cache directory {}", dir.display()))?;
    Ok(Arc::new(cache))
}

/// Open a local image, failing early with a hint if it does not exist.
pub fn open_image(path: &Path, config: &Config) -> anyhow::Result<LocalImage> {
    if !path.is_file() {
        anyhow::bail!(
            "Image file does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            path
        );
    }
    LocalImage::open(path, config.thumbs_dir())
        .with_context(|| format!("Failed to read {}", path.display()))
}
