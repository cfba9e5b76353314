//! High-fidelity driver reading native 8-bit RGBA.

use super::{decode_image, Engine, PixelExtractor};
use crate::error::PlaceholderResult;
use crate::types::RasterImage;

/// Pixel extraction with full 8-bit alpha.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighFidelityDriver;

impl PixelExtractor for HighFidelityDriver {
    fn engine(&self) -> Engine {
        Engine::HighFidelity
    }

    fn is_available(&self) -> bool {
        cfg!(feature = "high-fidelity")
    }

    fn extract_pixels(&self, bytes: &[u8]) -> PlaceholderResult<RasterImage> {
        let rgba = decode_image(bytes)?.into_rgba8();
        RasterImage::from_rgba_image(rgba)
    }
}
