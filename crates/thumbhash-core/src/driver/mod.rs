//! Pixel extraction backends.
//!
//! A driver turns compressed image bytes (JPEG, PNG, WebP, ...) into an RGBA
//! raster for the encoder. Two backends exist:
//! - **basic**: 7-bit alpha precision, rescaled to 8 bits on the way out
//! - **high-fidelity**: native 8-bit RGBA
//!
//! Which one runs is picked by [`Engine`] in the configuration. A backend
//! compiled out of the build (cargo features `basic` / `high-fidelity`)
//! reports itself as unavailable.

mod basic;
mod high_fidelity;

pub use basic::{rescale_alpha, to_native_alpha, BasicDriver};
pub use high_fidelity::HighFidelityDriver;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;

use crate::error::{PlaceholderError, PlaceholderResult};
use crate::types::RasterImage;

/// Decodes image bytes into raw RGBA samples.
pub trait PixelExtractor: Send + Sync {
    /// Engine this driver implements.
    fn engine(&self) -> Engine;

    /// Whether the backend is usable in this build.
    fn is_available(&self) -> bool;

    /// Decode `bytes` into an RGBA raster.
    fn extract_pixels(&self, bytes: &[u8]) -> PlaceholderResult<RasterImage>;
}

/// Pixel extraction backend selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Engine {
    /// Reduced alpha precision backend
    #[default]
    #[serde(rename = "basic", alias = "gd")]
    Basic,
    /// Full 8-bit RGBA backend
    #[serde(rename = "high-fidelity", alias = "imagick")]
    HighFidelity,
}

impl Engine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Basic => "basic",
            Engine::HighFidelity => "high-fidelity",
        }
    }

    /// The driver for this engine, or `DriverUnavailable` if it is compiled out.
    pub fn driver(self) -> PlaceholderResult<Box<dyn PixelExtractor>> {
        let driver: Box<dyn PixelExtractor> = match self {
            Engine::Basic => Box::new(BasicDriver),
            Engine::HighFidelity => Box::new(HighFidelityDriver),
        };
        if !driver.is_available() {
            return Err(PlaceholderError::DriverUnavailable {
                engine: self.as_str().to_string(),
            });
        }
        Ok(driver)
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode bytes with content-based format detection.
fn decode_image(bytes: &[u8]) -> PlaceholderResult<image::DynamicImage> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PlaceholderError::Decode {
            message: format!("cannot detect image format: {e}"),
        })?;
    if reader.format().is_none() {
        return Err(PlaceholderError::Decode {
            message: "unrecognized image format".to_string(),
        });
    }
    reader.decode().map_err(|e| PlaceholderError::Decode {
        message: e.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    /// PNG bytes for a `width` x `height` image filled by `f(x, y)`.
    pub fn png_bytes(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| Rgba(f(x, y)));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }
}
