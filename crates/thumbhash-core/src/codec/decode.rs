//! ThumbHash → RGBA raster, average color and aspect ratio.

use std::f32::consts::PI;

use super::{ThumbHash, DECODED_MAX_DIMENSION};
use crate::error::{PlaceholderError, PlaceholderResult};
use crate::types::{AverageColor, RasterImage};

/// Fields packed into the first five (or six) bytes of a hash.
struct Header {
    l_dc: f32,
    p_dc: f32,
    q_dc: f32,
    l_scale: f32,
    p_scale: f32,
    q_scale: f32,
    a_dc: f32,
    a_scale: f32,
    has_alpha: bool,
    lx: usize,
    ly: usize,
}

impl Header {
    fn parse(hash: &[u8]) -> PlaceholderResult<Self> {
        if hash.len() < 5 {
            return Err(PlaceholderError::malformed(format!(
                "expected at least 5 header bytes, got {}",
                hash.len()
            )));
        }
        let header24 = hash[0] as u32 | (hash[1] as u32) << 8 | (hash[2] as u32) << 16;
        let header16 = hash[3] as u16 | (hash[4] as u16) << 8;
        let has_alpha = header24 >> 23 != 0;
        let is_landscape = header16 >> 15 != 0;

        let l_count = (header16 & 7) as usize;
        if l_count == 0 {
            return Err(PlaceholderError::malformed("luminance count is zero"));
        }
        let l_max = if has_alpha { 5 } else { 7 };
        let (lx, ly) = if is_landscape {
            (l_max, l_count)
        } else {
            (l_count, l_max)
        };

        let (a_dc, a_scale) = if has_alpha {
            let byte = *hash
                .get(5)
                .ok_or_else(|| PlaceholderError::malformed("missing alpha byte"))?;
            ((byte & 15) as f32 / 15.0, (byte >> 4) as f32 / 15.0)
        } else {
            (1.0, 1.0)
        };

        Ok(Self {
            l_dc: (header24 & 63) as f32 / 63.0,
            p_dc: ((header24 >> 6) & 63) as f32 / 31.5 - 1.0,
            q_dc: ((header24 >> 12) & 63) as f32 / 31.5 - 1.0,
            l_scale: ((header24 >> 18) & 31) as f32 / 31.0,
            p_scale: ((header16 >> 3) & 63) as f32 / 63.0,
            q_scale: ((header16 >> 9) & 63) as f32 / 63.0,
            a_dc,
            a_scale,
            has_alpha,
            lx,
            ly,
        })
    }

    fn ac_start(&self) -> usize {
        if self.has_alpha {
            6
        } else {
            5
        }
    }

    /// Width over height of the luminance grid.
    fn aspect_ratio(&self) -> f32 {
        self.lx as f32 / self.ly as f32
    }
}

/// Reads 4-bit AC values two per byte, low nibble first.
struct NibbleReader<'a> {
    bytes: &'a [u8],
    index: usize,
}

impl<'a> NibbleReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, index: 0 }
    }

    fn read(&mut self) -> PlaceholderResult<u8> {
        let byte = self
            .bytes
            .get(self.index >> 1)
            .ok_or_else(|| PlaceholderError::malformed("AC data is truncated"))?;
        let nibble = (byte >> ((self.index & 1) << 2)) & 15;
        self.index += 1;
        Ok(nibble)
    }

    /// Read the AC triangle of an `nx` by `ny` channel, scaled to `[-scale, scale]`.
    fn channel(&mut self, nx: usize, ny: usize, scale: f32) -> PlaceholderResult<Vec<f32>> {
        let mut ac = Vec::with_capacity(nx * ny);
        for cy in 0..ny {
            let mut cx = if cy > 0 { 0 } else { 1 };
            while cx * ny < nx * (ny - cy) {
                ac.push((self.read()? as f32 / 7.5 - 1.0) * scale);
                cx += 1;
            }
        }
        Ok(ac)
    }
}

/// Decode a hash into a raster whose longest side is 32 pixels.
pub fn decode(hash: &ThumbHash) -> PlaceholderResult<RasterImage> {
    let bytes = hash.as_bytes();
    let header = Header::parse(bytes)?;
    let (lx, ly) = (header.lx.max(3), header.ly.max(3));

    // Saturation is boosted 1.25x to compensate for quantization
    let mut reader = NibbleReader::new(&bytes[header.ac_start()..]);
    let l_ac = reader.channel(lx, ly, header.l_scale)?;
    let p_ac = reader.channel(3, 3, header.p_scale * 1.25)?;
    let q_ac = reader.channel(3, 3, header.q_scale * 1.25)?;
    let a_ac = if header.has_alpha {
        reader.channel(5, 5, header.a_scale)?
    } else {
        Vec::new()
    };

    let ratio = header.aspect_ratio();
    let max = DECODED_MAX_DIMENSION as f32;
    let (w, h) = if ratio > 1.0 {
        (max as usize, (max / ratio).round() as usize)
    } else {
        ((max * ratio).round() as usize, max as usize)
    };

    let mut rgba = Vec::with_capacity(w * h * 4);
    let mut fx = [0.0f32; 7];
    let mut fy = [0.0f32; 7];
    for y in 0..h {
        for (cy, f) in fy.iter_mut().enumerate() {
            *f = (PI / h as f32 * (y as f32 + 0.5) * cy as f32).cos();
        }
        for x in 0..w {
            for (cx, f) in fx.iter_mut().enumerate() {
                *f = (PI / w as f32 * (x as f32 + 0.5) * cx as f32).cos();
            }

            let mut l = header.l_dc;
            let mut j = 0;
            for cy in 0..ly {
                let fy2 = fy[cy] * 2.0;
                let mut cx = if cy > 0 { 0 } else { 1 };
                while cx * ly < lx * (ly - cy) {
                    l += l_ac[j] * fx[cx] * fy2;
                    j += 1;
                    cx += 1;
                }
            }

            let mut p = header.p_dc;
            let mut q = header.q_dc;
            let mut j = 0;
            for cy in 0..3 {
                let fy2 = fy[cy] * 2.0;
                let mut cx = if cy > 0 { 0 } else { 1 };
                while cx < 3 - cy {
                    let f = fx[cx] * fy2;
                    p += p_ac[j] * f;
                    q += q_ac[j] * f;
                    j += 1;
                    cx += 1;
                }
            }

            let mut a = header.a_dc;
            if header.has_alpha {
                let mut j = 0;
                for cy in 0..5 {
                    let fy2 = fy[cy] * 2.0;
                    let mut cx = if cy > 0 { 0 } else { 1 };
                    while cx < 5 - cy {
                        a += a_ac[j] * fx[cx] * fy2;
                        j += 1;
                        cx += 1;
                    }
                }
            }

            let (r, g, b) = lpq_to_rgb(l, p, q);
            rgba.extend_from_slice(&[
                to_channel(r),
                to_channel(g),
                to_channel(b),
                to_channel(a),
            ]);
        }
    }

    RasterImage::new(w as u32, h as u32, rgba)
}

/// Average color straight from the DC terms, without running the DCT.
pub fn average_color(hash: &ThumbHash) -> PlaceholderResult<AverageColor> {
    let header = Header::parse(hash.as_bytes())?;
    let (r, g, b) = lpq_to_rgb(header.l_dc, header.p_dc, header.q_dc);
    Ok(AverageColor {
        r: r.clamp(0.0, 1.0),
        g: g.clamp(0.0, 1.0),
        b: b.clamp(0.0, 1.0),
        a: header.a_dc,
    })
}

/// Approximate width / height of the image the hash was made from.
pub fn approximate_aspect_ratio(hash: &ThumbHash) -> PlaceholderResult<f32> {
    Header::parse(hash.as_bytes()).map(|header| header.aspect_ratio())
}

fn lpq_to_rgb(l: f32, p: f32, q: f32) -> (f32, f32, f32) {
    let b = l - 2.0 / 3.0 * p;
    let r = (3.0 * l - b + q) / 2.0;
    let g = r - q;
    (r, g, b)
}

fn to_channel(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RasterImage {
        let pixels = rgba.repeat((width * height) as usize);
        RasterImage::new(width, height, pixels).unwrap()
    }

    fn gradient(width: u32, height: u32) -> RasterImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[
                    (x * 255 / width) as u8,
                    (y * 255 / height) as u8,
                    128,
                    255,
                ]);
            }
        }
        RasterImage::new(width, height, pixels).unwrap()
    }

    #[test]
    fn test_decoded_size_is_independent_of_source_size() {
        let small = decode(&encode(&gradient(10, 10)).unwrap()).unwrap();
        let large = decode(&encode(&gradient(100, 100)).unwrap()).unwrap();
        assert_eq!((small.width(), small.height()), (32, 32));
        assert_eq!((large.width(), large.height()), (32, 32));
    }

    #[test]
    fn test_decode_is_deterministic() {
        let hash = encode(&gradient(40, 30)).unwrap();
        assert_eq!(decode(&hash).unwrap(), decode(&hash).unwrap());
    }

    #[test]
    fn test_landscape_decodes_wider_than_tall() {
        let hash = encode(&gradient(100, 50)).unwrap();
        let raster = decode(&hash).unwrap();
        assert_eq!(raster.width(), 32);
        assert!(raster.height() < 32);
        // lx = 7, ly = round(3.5) = 4
        assert_eq!(approximate_aspect_ratio(&hash).unwrap(), 7.0 / 4.0);
    }

    #[test]
    fn test_opaque_red_round_trip() {
        let hash = encode(&solid(4, 4, [255, 0, 0, 255])).unwrap();
        let raster = decode(&hash).unwrap();
        assert!(!raster.has_transparency());
        for px in raster.pixels().chunks_exact(4) {
            assert!(px[0] >= 250);
            assert!(px[1] <= 5);
            assert!(px[2] <= 5);
        }
    }

    #[test]
    fn test_translucent_round_trip_keeps_alpha() {
        let hash = encode(&solid(8, 8, [0, 0, 255, 100])).unwrap();
        let raster = decode(&hash).unwrap();
        assert!(raster.has_transparency());
    }

    #[test]
    fn test_average_color_of_red() {
        let hash = encode(&solid(4, 4, [255, 0, 0, 255])).unwrap();
        let avg = average_color(&hash).unwrap();
        assert!(avg.r > 0.98);
        assert!(avg.g < 0.02);
        assert!(avg.b < 0.02);
        assert_eq!(avg.a, 1.0);
    }

    #[test]
    fn test_average_color_alpha() {
        let hash = encode(&solid(4, 4, [0, 0, 0, 0])).unwrap();
        let avg = average_color(&hash).unwrap();
        assert_eq!(avg.a, 0.0);
    }

    #[test]
    fn test_short_header_is_malformed() {
        let err = decode(&ThumbHash::from_bytes(vec![1, 2, 3])).unwrap_err();
        assert!(matches!(err, PlaceholderError::MalformedHash { .. }));
        assert!(average_color(&ThumbHash::from_bytes(vec![])).is_err());
    }

    #[test]
    fn test_missing_alpha_byte_is_malformed() {
        // has_alpha flag set, luminance count 3, but no alpha byte
        let err = decode(&ThumbHash::from_bytes(vec![0, 0, 0x80, 3, 0])).unwrap_err();
        assert!(err.to_string().contains("alpha"));
    }

    #[test]
    fn test_truncated_ac_is_malformed() {
        let hash = encode(&gradient(20, 20)).unwrap();
        let truncated = ThumbHash::from_bytes(&hash.as_bytes()[..8]);
        let err = decode(&truncated).unwrap_err();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_zero_luminance_count_is_malformed() {
        let err = decode(&ThumbHash::from_bytes(vec![0, 0, 0, 0, 0x80])).unwrap_err();
        assert!(err.to_string().contains("luminance"));
    }
}
