//! Image sources: the file collaborator the service samples from.
//!
//! The host supplies images through [`SourceImage`]: a stable identity for
//! cache keys, the aspect ratio, and a thumbnailer. [`LocalImage`] is the
//! filesystem implementation used by the CLI, and [`discover_images`] finds
//! such files under a path.

mod discovery;
mod local;

pub use discovery::{discover_images, is_supported, SUPPORTED_EXTENSIONS};
pub use local::{content_hash, LocalImage, LocalThumbnail};

use crate::error::PlaceholderResult;

/// Quality used when requesting sample thumbnails.
pub const SAMPLE_QUALITY: u8 = 70;

/// An image the host can identify and thumbnail.
pub trait SourceImage {
    /// Stable identifier independent of where the content lives
    /// (a UUID for persistent files, a content hash for transient assets).
    fn identity(&self) -> String;

    /// File name used in error messages.
    fn filename(&self) -> String;

    /// Width divided by height.
    fn aspect_ratio(&self) -> PlaceholderResult<f64>;

    /// Produce a resized (and optionally cropped) copy of the image.
    fn generate_thumbnail(
        &self,
        width: u32,
        height: u32,
        crop: bool,
        quality: u8,
    ) -> PlaceholderResult<Box<dyn Thumbnail>>;
}

/// A generated thumbnail artifact.
pub trait Thumbnail {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Compressed image bytes.
    fn read_bytes(&self) -> PlaceholderResult<Vec<u8>>;

    /// Remove the artifact so the next request regenerates it.
    fn delete(&self) -> PlaceholderResult<()>;
}
