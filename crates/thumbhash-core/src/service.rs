//! Placeholder orchestration - wires sampling, extraction, hashing and caches.

use std::sync::Arc;

use crate::cache::{ratio_key, CacheStore, DecodeCache, EncodeCache, MemoryCache, NullCache};
use crate::codec::{self, ThumbHash};
use crate::config::Config;
use crate::driver::PixelExtractor;
use crate::error::{PlaceholderError, PlaceholderResult};
use crate::render;
use crate::source::{SourceImage, SAMPLE_QUALITY};
use crate::types::{ColorFormat, DecodedPlaceholder, Rgba8, SampleSpec};

/// Allowed per-axis difference between requested and generated sample sizes.
pub const RESIZE_TOLERANCE: u32 = 10;

/// Generates, caches and renders ThumbHash placeholders for source images.
pub struct ThumbHashService {
    config: Config,
    encode_cache: EncodeCache,
    decode_cache: DecodeCache,
    extractor: Option<Box<dyn PixelExtractor>>,
}

impl ThumbHashService {
    /// Create a service over the host's stores.
    ///
    /// A namespace disabled in `config.cache` is backed by [`NullCache`]
    /// regardless of the store passed in.
    pub fn new(
        config: Config,
        encode_store: Arc<dyn CacheStore>,
        decode_store: Arc<dyn CacheStore>,
    ) -> Self {
        let encode_store = if config.cache.encode {
            encode_store
        } else {
            Arc::new(NullCache)
        };
        let decode_store = if config.cache.decode {
            decode_store
        } else {
            Arc::new(NullCache)
        };
        Self {
            config,
            encode_cache: EncodeCache::new(encode_store),
            decode_cache: DecodeCache::new(decode_store),
            extractor: None,
        }
    }

    /// Create a service backed by in-process caches.
    pub fn with_memory_caches(config: Config) -> Self {
        Self::new(
            config,
            Arc::new(MemoryCache::new()),
            Arc::new(MemoryCache::new()),
        )
    }

    /// Use `extractor` instead of the driver selected by `sampling.engine`.
    pub fn with_extractor(mut self, extractor: Box<dyn PixelExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Hash string for `file` at `ratio` (defaults to the file's own ratio).
    ///
    /// Returns `Ok(None)` when generation fails and `strict_errors` is off.
    pub fn encode(
        &self,
        file: &dyn SourceImage,
        ratio: Option<f64>,
    ) -> PlaceholderResult<Option<String>> {
        match self.try_encode(file, ratio) {
            Ok(hash) => Ok(Some(hash)),
            Err(e) => self.absent_or(e),
        }
    }

    fn try_encode(&self, file: &dyn SourceImage, ratio: Option<f64>) -> PlaceholderResult<String> {
        let ratio = match ratio {
            Some(ratio) => ratio,
            None => file.aspect_ratio()?,
        };
        let identity = file.identity();
        let key = ratio_key(ratio);

        if let Some(hash) = self.encode_cache.get(&identity, &key) {
            tracing::debug!("Encode cache hit: {} @ {}", file.filename(), key);
            return Ok(hash);
        }

        let sample = SampleSpec::for_ratio(self.config.sampling.sample_max_size, ratio).ok_or_else(
            || PlaceholderError::InvalidRatio {
                file: file.filename(),
                ratio,
            },
        )?;

        let start = std::time::Instant::now();
        let thumb = file.generate_thumbnail(sample.width, sample.height, true, SAMPLE_QUALITY)?;
        if !sample.matches(thumb.width(), thumb.height(), RESIZE_TOLERANCE) {
            // Best effort: the next request regenerates it
            if let Err(e) = thumb.delete() {
                tracing::warn!("Failed to delete mis-sized thumbnail of {}: {}", file.filename(), e);
            }
            return Err(PlaceholderError::ResizeMismatch {
                file: file.filename(),
                expected_width: sample.width,
                expected_height: sample.height,
                actual_width: thumb.width(),
                actual_height: thumb.height(),
            });
        }
        tracing::trace!("  Thumbnail: {:?}", start.elapsed());

        let bytes = thumb.read_bytes()?;
        let raster = self.extract(&bytes, file)?;
        let hash = codec::encode(&raster)?.to_base64();
        tracing::debug!(
            "Encoded {} ({}x{}) in {:?}",
            file.filename(),
            raster.width(),
            raster.height(),
            start.elapsed()
        );

        self.encode_cache.set(&identity, &key, &hash);
        Ok(hash)
    }

    fn extract(
        &self,
        bytes: &[u8],
        file: &dyn SourceImage,
    ) -> PlaceholderResult<crate::types::RasterImage> {
        let selected;
        let driver: &dyn PixelExtractor = match &self.extractor {
            Some(extractor) => extractor.as_ref(),
            None => {
                selected = self.config.sampling.engine.driver()?;
                selected.as_ref()
            }
        };
        if !driver.is_available() {
            return Err(PlaceholderError::DriverUnavailable {
                engine: driver.engine().to_string(),
            });
        }
        driver
            .extract_pixels(bytes)
            .map_err(|e| PlaceholderError::ExtractionFailed {
                file: file.filename(),
                engine: driver.engine().to_string(),
                message: e.to_string(),
            })
    }

    /// Decode a base64 hash string into a placeholder.
    ///
    /// Malformed input is always an error, whatever `strict_errors` says.
    pub fn decode(&self, hash: &str) -> PlaceholderResult<DecodedPlaceholder> {
        self.decode_hash(&ThumbHash::from_base64(hash)?)
    }

    /// Decode hash bytes into a placeholder, consulting the decode cache.
    pub fn decode_hash(&self, hash: &ThumbHash) -> PlaceholderResult<DecodedPlaceholder> {
        let key = hash.to_base64();
        if let Some(placeholder) = self.decode_cache.get(&key) {
            tracing::debug!("Decode cache hit: {key}");
            return Ok(placeholder);
        }

        let raster = codec::decode(hash)?;
        let placeholder = DecodedPlaceholder {
            uri: render::to_data_uri(&raster)?,
            width: raster.width(),
            height: raster.height(),
            transparent: raster.has_transparency(),
        };
        self.decode_cache.set(&key, &placeholder);
        Ok(placeholder)
    }

    /// Data URI to use as the placeholder `src` for `file`.
    ///
    /// `blur_radius` overrides `render.blur_radius`; 0 yields the bare PNG URI.
    pub fn render_placeholder(
        &self,
        file: &dyn SourceImage,
        ratio: Option<f64>,
        blur_radius: Option<f64>,
    ) -> PlaceholderResult<Option<String>> {
        let Some(hash) = self.encode(file, ratio)? else {
            return Ok(None);
        };
        let blur_radius = blur_radius.unwrap_or(self.config.render.blur_radius);
        match self.decode(&hash) {
            Ok(placeholder) => Ok(Some(render::render(&placeholder, blur_radius))),
            Err(e) => self.absent_or(e),
        }
    }

    /// Average color of `file`'s hash as 8-bit channels.
    pub fn average_color_rgba(
        &self,
        file: &dyn SourceImage,
        ratio: Option<f64>,
    ) -> PlaceholderResult<Option<Rgba8>> {
        let Some(hash) = self.encode(file, ratio)? else {
            return Ok(None);
        };
        let color = ThumbHash::from_base64(&hash).and_then(|h| codec::average_color(&h));
        match color {
            Ok(color) => Ok(Some(color.to_rgba8())),
            Err(e) => self.absent_or(e),
        }
    }

    /// Average color of `file`'s hash formatted for CSS.
    pub fn average_color(
        &self,
        file: &dyn SourceImage,
        format: ColorFormat,
        ratio: Option<f64>,
    ) -> PlaceholderResult<Option<String>> {
        Ok(self
            .average_color_rgba(file, ratio)?
            .map(|rgba| rgba.to_css(format)))
    }

    /// Forget every cached hash of `file`. Decoded placeholders stay cached.
    pub fn invalidate(&self, file: &dyn SourceImage) {
        let identity = file.identity();
        tracing::debug!("Invalidating cached hashes for {}", file.filename());
        self.encode_cache.remove(&identity);
    }

    fn absent_or<T>(&self, err: PlaceholderError) -> PlaceholderResult<Option<T>> {
        if self.config.general.strict_errors {
            Err(err)
        } else {
            tracing::warn!("{err}");
            Ok(None)
        }
    }
}
