//! Basic driver with 7-bit alpha.
//!
//! The backend stores alpha as 0 (opaque) to 127 (transparent). Pixels are
//! read one at a time by (x, y), with palette entries already resolved to
//! direct color, and alpha is widened back to 0 (transparent) to 255 (opaque).

use image::GenericImageView;

use super::{decode_image, Engine, PixelExtractor};
use crate::error::PlaceholderResult;
use crate::types::RasterImage;

/// Largest native alpha value (fully transparent).
const NATIVE_ALPHA_MAX: u32 = 127;

/// Pixel extraction with the backend's 7-bit alpha channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicDriver;

impl PixelExtractor for BasicDriver {
    fn engine(&self) -> Engine {
        Engine::Basic
    }

    fn is_available(&self) -> bool {
        cfg!(feature = "basic")
    }

    fn extract_pixels(&self, bytes: &[u8]) -> PlaceholderResult<RasterImage> {
        let image = decode_image(bytes)?;
        let (width, height) = image.dimensions();

        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                let [r, g, b, a] = image.get_pixel(x, y).0;
                pixels.extend_from_slice(&[r, g, b, rescale_alpha(to_native_alpha(a))]);
            }
        }
        drop(image);

        RasterImage::new(width, height, pixels)
    }
}

/// Reduce 8-bit alpha (255 = opaque) to the backend's 7-bit form (0 = opaque).
pub fn to_native_alpha(alpha8: u8) -> u8 {
    (NATIVE_ALPHA_MAX as u8) - (alpha8 >> 1)
}

/// Widen native 7-bit alpha to 8 bits: `255 - ceil(native * 255 / 127)`.
pub fn rescale_alpha(native: u8) -> u8 {
    let native = (native as u32).min(NATIVE_ALPHA_MAX);
    let scaled = (native * 255).div_ceil(NATIVE_ALPHA_MAX);
    (255 - scaled) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::test_support::png_bytes;

    #[test]
    fn test_rescale_alpha_endpoints() {
        assert_eq!(rescale_alpha(0), 255);
        assert_eq!(rescale_alpha(127), 0);
    }

    #[test]
    fn test_rescale_alpha_midpoint() {
        // 64 * 255 / 127 = 128.5 → ceil 129
        assert_eq!(rescale_alpha(64), 126);
    }

    #[test]
    fn test_to_native_alpha() {
        assert_eq!(to_native_alpha(255), 0);
        assert_eq!(to_native_alpha(0), 127);
        assert_eq!(to_native_alpha(128), 63);
    }

    #[test]
    fn test_opaque_pixels_stay_opaque() {
        let bytes = png_bytes(3, 2, |x, y| [x as u8 * 10, y as u8 * 20, 7, 255]);
        let raster = BasicDriver.extract_pixels(&bytes).unwrap();
        assert_eq!((raster.width(), raster.height()), (3, 2));
        // Row-major: pixel (2, 1) is the last one
        assert_eq!(&raster.pixels()[20..24], &[20, 20, 7, 255]);
        assert!(!raster.has_transparency());
    }

    #[test]
    fn test_alpha_loses_low_bit_precision() {
        let bytes = png_bytes(1, 1, |_, _| [0, 0, 0, 129]);
        let raster = BasicDriver.extract_pixels(&bytes).unwrap();
        // 129 → native 63 → 255 - ceil(63 * 255 / 127) = 255 - 127
        assert_eq!(raster.pixels()[3], 128);
    }

    #[test]
    fn test_transparent_pixels() {
        let bytes = png_bytes(1, 1, |_, _| [9, 9, 9, 0]);
        let raster = BasicDriver.extract_pixels(&bytes).unwrap();
        assert_eq!(raster.pixels()[3], 0);
    }

    #[test]
    fn test_invalid_bytes() {
        assert!(BasicDriver.extract_pixels(&[0x89, 0x50, 0x4e]).is_err());
    }
}
