//! ThumbHash Core - image placeholder generation.
//!
//! A ThumbHash is a ~25 byte summary of an image's low frequencies. It is
//! small enough to inline in markup and decodes into a blurry preview that
//! is shown while the real image loads.
//!
//! # Architecture
//!
//! ```text
//! Source image → Sample thumbnail → Extract RGBA → Encode → Cache
//! Hash → Decode → PNG data URI → Blur SVG data URI
//! ```
//!
//! The host supplies images through [`SourceImage`] and storage through
//! [`CacheStore`]; [`ThumbHashService`] wires the stages together.
//!
//! # Usage
//!
//! ```rust,ignore
//! use thumbhash_core::{Config, LocalImage, ThumbHashService};
//!
//! fn main() -> thumbhash_core::Result<()> {
//!     let config = Config::load()?;
//!     let thumbs = config.thumbs_dir();
//!     let service = ThumbHashService::with_memory_caches(config);
//!
//!     let image = LocalImage::open("./image.jpg", thumbs)?;
//!     if let Some(uri) = service.render_placeholder(&image, None, None)? {
//!         println!("<img src=\"{uri}\">");
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod codec;
pub mod config;
pub mod driver;
pub mod error;
pub mod output;
pub mod render;
pub mod service;
pub mod source;
pub mod types;

pub use cache::{CacheStore, FileCache, MemoryCache, NullCache};
pub use codec::ThumbHash;
pub use config::Config;
pub use driver::{Engine, PixelExtractor};
pub use error::{ConfigError, PlaceholderError, PlaceholderResult, Result, ThumbHashError};
pub use output::{EncodeRecord, OutputFormat, OutputWriter};
pub use service::ThumbHashService;
pub use source::{discover_images, LocalImage, SourceImage, Thumbnail};
pub use types::{AverageColor, ColorFormat, DecodedPlaceholder, RasterImage, Rgba8};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
