//! Placeholder rendering: PNG data URIs and blurred SVG wrappers.
//!
//! A decoded hash is tiny (at most 32px per side), so browsers upscale it with
//! visible blockiness. Wrapping it in an SVG with a Gaussian blur filter keeps
//! the placeholder smooth at any size without rasterizing the filter.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use std::sync::OnceLock;

use crate::error::{PlaceholderError, PlaceholderResult};
use crate::types::{DecodedPlaceholder, RasterImage};

/// Everything except RFC 3986 unreserved characters.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const SVG_DATA_URI_PREFIX: &str = "data:image/svg+xml;charset=utf-8,";

/// Encode a raster as a `data:image/png;base64,...` URI.
pub fn to_data_uri(raster: &RasterImage) -> PlaceholderResult<String> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(
            raster.pixels(),
            raster.width(),
            raster.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| PlaceholderError::Render {
            message: format!("PNG encoding failed: {e}"),
        })?;
    Ok(format!("data:image/png;base64,{}", BASE64.encode(png)))
}

/// Wrap an image URI in an SVG that applies a Gaussian blur.
///
/// A blur radius of 0 returns `data_uri` unchanged. Opaque images get an
/// extra `feComponentTransfer` stage that snaps alpha back to 1, so the blur
/// does not fade the edges.
pub fn wrap_in_blur_svg(
    data_uri: &str,
    width: f64,
    height: f64,
    blur_radius: f64,
    transparent: bool,
) -> String {
    if blur_radius == 0.0 {
        return data_uri.to_string();
    }
    let std_deviation = format_float(blur_radius);
    let alpha_filter = if transparent {
        ""
    } else {
        r#"<feComponentTransfer>
        <feFuncA type="discrete" tableValues="1 1"></feFuncA>
    </feComponentTransfer>"#
    };

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width:.2} {height:.2}">
  <filter id="b" color-interpolation-filters="sRGB">
    <feGaussianBlur stdDeviation="{std_deviation}"></feGaussianBlur>
    {alpha_filter}
  </filter>
  <image filter="url(#b)" x="0" y="0" width="100%" height="100%" href="{data_uri}"></image>
</svg>"#
    )
}

/// Shortest decimal form of `value` at 14 significant digits.
///
/// Exponents below -4 or above 13 switch to `1.5E+20` notation.
fn format_float(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return value.to_string();
    }
    let sci = format!("{:.13e}", value.abs());
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return value.to_string();
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return value.to_string();
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let digits = digits.trim_end_matches('0');
    let sign = if value < 0.0 { "-" } else { "" };

    let body = if !(-4..14).contains(&exp) {
        let (head, tail) = digits.split_at(1);
        let tail = if tail.is_empty() { "0" } else { tail };
        let exp_sign = if exp < 0 { '-' } else { '+' };
        format!("{head}.{tail}E{exp_sign}{}", exp.abs())
    } else if exp < 0 {
        format!("0.{}{digits}", "0".repeat((-exp - 1) as usize))
    } else {
        let int_len = exp as usize + 1;
        if digits.len() <= int_len {
            format!("{digits}{}", "0".repeat(int_len - digits.len()))
        } else {
            format!("{}.{}", &digits[..int_len], &digits[int_len..])
        }
    };
    format!("{sign}{body}")
}

/// Minify and percent-encode an SVG document into a data URI.
///
/// ASCII whitespace runs collapse to one space and spaces between tags are
/// dropped; other Unicode spaces are percent-encoded like any character.
/// `/`, `:` and `=` are left unescaped to keep the URI short; `%20` stays
/// escaped.
pub fn svg_to_data_uri(svg: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let whitespace =
        WHITESPACE.get_or_init(|| Regex::new(r"(?-u:\s)+").expect("valid regex"));

    let collapsed = whitespace.replace_all(svg, " ");
    let minified = collapsed.replace("> <", "><");
    let encoded = utf8_percent_encode(&minified, URI_COMPONENT)
        .to_string()
        .replace("%2F", "/")
        .replace("%3A", ":")
        .replace("%3D", "=");

    format!("{SVG_DATA_URI_PREFIX}{encoded}")
}

/// Final placeholder URI for a decoded hash.
///
/// A blur radius of 0 returns the PNG data URI untouched.
pub fn render(placeholder: &DecodedPlaceholder, blur_radius: f64) -> String {
    if blur_radius == 0.0 {
        return placeholder.uri.clone();
    }
    let svg = wrap_in_blur_svg(
        &placeholder.uri,
        placeholder.width as f64,
        placeholder.height as f64,
        blur_radius,
        placeholder.transparent,
    );
    svg_to_data_uri(&svg)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_URI: &str = "data:image/png;base64,AAAA";

    fn placeholder(transparent: bool) -> DecodedPlaceholder {
        DecodedPlaceholder {
            uri: PNG_URI.to_string(),
            width: 32,
            height: 24,
            transparent,
        }
    }

    #[test]
    fn test_to_data_uri_is_png() {
        let raster = RasterImage::new(2, 2, vec![255; 16]).unwrap();
        let uri = to_data_uri(&raster).unwrap();
        let payload = uri.strip_prefix("data:image/png;base64,").unwrap();
        let png = BASE64.decode(payload).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&png).unwrap().into_rgba8();
        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.into_raw(), vec![255; 16]);
    }

    #[test]
    fn test_svg_has_viewbox_and_blur() {
        let svg = wrap_in_blur_svg(PNG_URI, 32.0, 18.0, 2.5, true);
        assert!(svg.contains(r#"viewBox="0 0 32.00 18.00""#));
        assert!(svg.contains(r#"stdDeviation="2.5""#));
        assert!(svg.contains(&format!(r#"href="{PNG_URI}""#)));
        assert!(!svg.contains("feComponentTransfer"));
    }

    #[test]
    fn test_opaque_svg_discretizes_alpha() {
        let svg = wrap_in_blur_svg(PNG_URI, 32.0, 32.0, 1.0, false);
        assert!(svg.contains(r#"<feFuncA type="discrete" tableValues="1 1"></feFuncA>"#));
        assert!(svg.contains(r#"stdDeviation="1""#));
    }

    #[test]
    fn test_svg_to_data_uri_literal() {
        let uri = svg_to_data_uri("<svg a=\"b\">\n  <g/>\n</svg>");
        assert_eq!(
            uri,
            "data:image/svg+xml;charset=utf-8,%3Csvg%20a=%22b%22%3E%3Cg/%3E%3C/svg%3E"
        );
    }

    #[test]
    fn test_svg_to_data_uri_ignores_extra_whitespace() {
        let tight = "<svg viewBox=\"0 0 1 1\"><image href=\"x\"></image></svg>";
        let loose = "<svg   viewBox=\"0 0 1 1\">\n\t <image\n href=\"x\"></image>\n</svg>";
        assert_eq!(svg_to_data_uri(tight), svg_to_data_uri(loose));
    }

    #[test]
    fn test_render_full_opaque_output() {
        let uri = render(&placeholder(false), 1.0);
        assert_eq!(
            uri,
            "data:image/svg+xml;charset=utf-8,\
             %3Csvg%20xmlns=%22http://www.w3.org/2000/svg%22%20viewBox=%220%200%2032.00%2024.00%22%3E\
             %3Cfilter%20id=%22b%22%20color-interpolation-filters=%22sRGB%22%3E\
             %3CfeGaussianBlur%20stdDeviation=%221%22%3E%3C/feGaussianBlur%3E\
             %3CfeComponentTransfer%3E%3CfeFuncA%20type=%22discrete%22%20tableValues=%221%201%22%3E%3C/feFuncA%3E%3C/feComponentTransfer%3E\
             %3C/filter%3E\
             %3Cimage%20filter=%22url%28%23b%29%22%20x=%220%22%20y=%220%22%20width=%22100%25%22%20height=%22100%25%22%20\
             href=%22data:image/png%3Bbase64%2CAAAA%22%3E%3C/image%3E\
             %3C/svg%3E"
        );
    }

    #[test]
    fn test_render_transparent_skips_alpha_stage() {
        let uri = render(&placeholder(true), 1.0);
        assert!(uri.contains("%3C/feGaussianBlur%3E%3C/filter%3E"));
        assert!(!uri.contains("feComponentTransfer"));
    }

    #[test]
    fn test_zero_blur_returns_png_uri() {
        assert_eq!(render(&placeholder(false), 0.0), PNG_URI);
        assert_eq!(wrap_in_blur_svg(PNG_URI, 32.0, 24.0, 0.0, false), PNG_URI);
        assert_eq!(wrap_in_blur_svg(PNG_URI, 32.0, 24.0, 0.0, true), PNG_URI);
    }

    #[test]
    fn test_blur_radius_uses_fourteen_significant_digits() {
        let svg = wrap_in_blur_svg(PNG_URI, 32.0, 32.0, 0.1 + 0.2, true);
        assert!(svg.contains(r#"stdDeviation="0.3""#));

        assert_eq!(format_float(1.0), "1");
        assert_eq!(format_float(2.5), "2.5");
        assert_eq!(format_float(12.0), "12");
        assert_eq!(format_float(1.0 / 3.0), "0.33333333333333");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(0.00001), "1.0E-5");
        assert_eq!(format_float(1e13), "10000000000000");
        assert_eq!(format_float(1.5e20), "1.5E+20");
    }

    #[test]
    fn test_svg_to_data_uri_keeps_unicode_spaces() {
        let uri = svg_to_data_uri("<g>\u{a0}</g>\u{2028}<g/>");
        assert_eq!(
            uri,
            "data:image/svg+xml;charset=utf-8,%3Cg%3E%C2%A0%3C/g%3E%E2%80%A8%3Cg/%3E"
        );
    }
}
