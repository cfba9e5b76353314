//! Core data types shared across the placeholder pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{PlaceholderError, PlaceholderResult};

/// An RGBA raster, 4 bytes per pixel in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Create a raster, checking that `pixels.len() == width * height * 4`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> PlaceholderResult<Self> {
        if width == 0 || height == 0 {
            return Err(PlaceholderError::invalid_raster(format!(
                "dimensions must be non-zero, got {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(PlaceholderError::invalid_raster(format!(
                "expected {expected} bytes (width * height * 4), got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a raster from an `image::RgbaImage`.
    pub fn from_rgba_image(img: image::RgbaImage) -> PlaceholderResult<Self> {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// True if any pixel is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.pixels.chunks_exact(4).any(|px| px[3] < 255)
    }
}

/// Width and height to request from the thumbnailer for a given aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleSpec {
    pub width: u32,
    pub height: u32,
}

impl SampleSpec {
    /// Fit `ratio` (width / height) into a box whose longest side is `max`.
    ///
    /// Returns `None` when `ratio` is not a positive finite number.
    pub fn for_ratio(max: u32, ratio: f64) -> Option<Self> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return None;
        }
        let max_f = max as f64;
        let (width, height) = if ratio < 1.0 {
            ((max_f * ratio).round(), max_f)
        } else {
            (max_f, (max_f / ratio).round())
        };
        Some(Self {
            width: (width as u32).max(1),
            height: (height as u32).max(1),
        })
    }

    /// True if `(width, height)` is within `tolerance` pixels on both axes.
    pub fn matches(&self, width: u32, height: u32, tolerance: u32) -> bool {
        self.width.abs_diff(width) <= tolerance && self.height.abs_diff(height) <= tolerance
    }
}

/// A decoded hash ready for embedding in markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedPlaceholder {
    /// PNG data URI of the low-resolution raster
    pub uri: String,
    /// Raster width in pixels
    pub width: u32,
    /// Raster height in pixels
    pub height: u32,
    /// Whether any decoded pixel has alpha below 255
    pub transparent: bool,
}

/// Average color of a hash, each channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl AverageColor {
    /// Quantize to 8-bit channels with alpha rounded to two decimals.
    pub fn to_rgba8(self) -> Rgba8 {
        Rgba8 {
            r: (self.r as f64 * 255.0).round() as u8,
            g: (self.g as f64 * 255.0).round() as u8,
            b: (self.b as f64 * 255.0).round() as u8,
            a: (self.a as f64 * 100.0).round() / 100.0,
        }
    }
}

/// 8-bit color with a fractional alpha, as used in CSS output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Alpha in `[0, 1]`, rounded to two decimals
    pub a: f64,
}

impl Rgba8 {
    /// Format as a CSS color string.
    pub fn to_css(&self, format: ColorFormat) -> String {
        let Rgba8 { r, g, b, a } = *self;
        match format {
            ColorFormat::Hex => {
                format!("#{r:02X}{g:02X}{b:02X}{:02X}", (a * 255.0).round() as u8)
            }
            ColorFormat::Rgb => format!("rgb({r} {g} {b} / {a})"),
            ColorFormat::Rgba => format!("rgba({r}, {g}, {b}, {a})"),
        }
    }
}

/// CSS output syntax for average colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorFormat {
    /// `#RRGGBBAA`
    #[default]
    Hex,
    /// `rgb(R G B / A)`
    Rgb,
    /// `rgba(R, G, B, A)`
    Rgba,
}

impl ColorFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hex" => Some(Self::Hex),
            "rgb" => Some(Self::Rgb),
            "rgba" => Some(Self::Rgba),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_rejects_wrong_length() {
        let err = RasterImage::new(2, 2, vec![0; 15]).unwrap_err();
        assert!(err.to_string().contains("expected 16 bytes"));
    }

    #[test]
    fn test_raster_rejects_zero_dimensions() {
        assert!(RasterImage::new(0, 4, vec![]).is_err());
        assert!(RasterImage::new(4, 0, vec![]).is_err());
    }

    #[test]
    fn test_raster_transparency() {
        let opaque = RasterImage::new(1, 2, vec![1, 2, 3, 255, 4, 5, 6, 255]).unwrap();
        assert!(!opaque.has_transparency());

        let translucent = RasterImage::new(1, 2, vec![1, 2, 3, 255, 4, 5, 6, 254]).unwrap();
        assert!(translucent.has_transparency());
    }

    #[test]
    fn test_sample_spec_landscape() {
        let spec = SampleSpec::for_ratio(100, 2.0).unwrap();
        assert_eq!(spec, SampleSpec { width: 100, height: 50 });
    }

    #[test]
    fn test_sample_spec_portrait() {
        let spec = SampleSpec::for_ratio(100, 0.75).unwrap();
        assert_eq!(spec, SampleSpec { width: 75, height: 100 });
    }

    #[test]
    fn test_sample_spec_square_and_rounding() {
        assert_eq!(
            SampleSpec::for_ratio(100, 1.0).unwrap(),
            SampleSpec { width: 100, height: 100 }
        );
        // 100 / 1.5 = 66.67
        assert_eq!(
            SampleSpec::for_ratio(100, 1.5).unwrap(),
            SampleSpec { width: 100, height: 67 }
        );
    }

    #[test]
    fn test_sample_spec_extreme_ratio_keeps_one_pixel() {
        let spec = SampleSpec::for_ratio(100, 1000.0).unwrap();
        assert_eq!(spec.height, 1);
    }

    #[test]
    fn test_sample_spec_rejects_bad_ratio() {
        assert!(SampleSpec::for_ratio(100, 0.0).is_none());
        assert!(SampleSpec::for_ratio(100, -1.0).is_none());
        assert!(SampleSpec::for_ratio(100, f64::NAN).is_none());
        assert!(SampleSpec::for_ratio(100, f64::INFINITY).is_none());
    }

    #[test]
    fn test_sample_spec_tolerance() {
        let spec = SampleSpec {
            width: 100,
            height: 50,
        };
        assert!(spec.matches(90, 60, 10));
        assert!(!spec.matches(80, 50, 10));
        assert!(!spec.matches(100, 61, 10));
    }

    #[test]
    fn test_color_formats() {
        let color = Rgba8 {
            r: 255,
            g: 16,
            b: 0,
            a: 0.5,
        };
        assert_eq!(color.to_css(ColorFormat::Hex), "#FF100080");
        assert_eq!(color.to_css(ColorFormat::Rgb), "rgb(255 16 0 / 0.5)");
        assert_eq!(color.to_css(ColorFormat::Rgba), "rgba(255, 16, 0, 0.5)");
    }

    #[test]
    fn test_opaque_alpha_prints_as_integer() {
        let color = Rgba8 {
            r: 1,
            g: 2,
            b: 3,
            a: 1.0,
        };
        assert_eq!(color.to_css(ColorFormat::Rgb), "rgb(1 2 3 / 1)");
        assert_eq!(color.to_css(ColorFormat::Hex), "#010203FF");
    }

    #[test]
    fn test_average_color_quantization() {
        let avg = AverageColor {
            r: 1.0,
            g: 0.5,
            b: 0.0,
            a: 0.456,
        };
        let rgba = avg.to_rgba8();
        assert_eq!((rgba.r, rgba.g, rgba.b), (255, 128, 0));
        assert_eq!(rgba.a, 0.46);
    }

    #[test]
    fn test_color_format_parse() {
        assert_eq!(ColorFormat::parse("HEX"), Some(ColorFormat::Hex));
        assert_eq!(ColorFormat::parse("rgba"), Some(ColorFormat::Rgba));
        assert_eq!(ColorFormat::parse("hsl"), None);
    }
}
