//! RGBA raster → ThumbHash.

use std::f32::consts::PI;

use super::ThumbHash;
use crate::error::PlaceholderResult;
use crate::types::RasterImage;

/// DC term, normalized AC terms and the AC scale of one channel.
struct ChannelCoefficients {
    dc: f32,
    ac: Vec<f32>,
    scale: f32,
}

/// Encode a raster into a ThumbHash.
///
/// Cost grows with the pixel count while the hash does not improve past
/// roughly 100x100, so callers should downsample first.
pub fn encode(raster: &RasterImage) -> PlaceholderResult<ThumbHash> {
    let (w, h) = (raster.width() as usize, raster.height() as usize);
    let rgba = raster.pixels();

    // Alpha-weighted average color
    let (mut avg_r, mut avg_g, mut avg_b, mut avg_a) = (0.0f32, 0.0f32, 0.0f32, 0.0f32);
    for px in rgba.chunks_exact(4) {
        let alpha = px[3] as f32 / 255.0;
        avg_r += alpha / 255.0 * px[0] as f32;
        avg_g += alpha / 255.0 * px[1] as f32;
        avg_b += alpha / 255.0 * px[2] as f32;
        avg_a += alpha;
    }
    if avg_a > 0.0 {
        avg_r /= avg_a;
        avg_g /= avg_a;
        avg_b /= avg_a;
    }

    let has_alpha = avg_a < (w * h) as f32;
    // Fewer luminance coefficients when alpha needs room
    let l_limit = if has_alpha { 5 } else { 7 };
    let longest = w.max(h) as f32;
    let lx = (((l_limit * w) as f32 / longest).round() as usize).max(1);
    let ly = (((l_limit * h) as f32 / longest).round() as usize).max(1);

    // RGBA → LPQA, composited over the average color
    let mut l = Vec::with_capacity(w * h);
    let mut p = Vec::with_capacity(w * h);
    let mut q = Vec::with_capacity(w * h);
    let mut a = Vec::with_capacity(w * h);
    for px in rgba.chunks_exact(4) {
        let alpha = px[3] as f32 / 255.0;
        let r = avg_r * (1.0 - alpha) + alpha / 255.0 * px[0] as f32;
        let g = avg_g * (1.0 - alpha) + alpha / 255.0 * px[1] as f32;
        let b = avg_b * (1.0 - alpha) + alpha / 255.0 * px[2] as f32;
        l.push((r + g + b) / 3.0);
        p.push((r + g) / 2.0 - b);
        q.push(r - g);
        a.push(alpha);
    }

    let l_coef = encode_channel(&l, w, h, lx.max(3), ly.max(3));
    let p_coef = encode_channel(&p, w, h, 3, 3);
    let q_coef = encode_channel(&q, w, h, 3, 3);
    let a_coef = if has_alpha {
        Some(encode_channel(&a, w, h, 5, 5))
    } else {
        None
    };

    let is_landscape = w > h;
    let header24 = (63.0 * l_coef.dc).round() as u32
        | (((31.5 + 31.5 * p_coef.dc).round() as u32) << 6)
        | (((31.5 + 31.5 * q_coef.dc).round() as u32) << 12)
        | (((31.0 * l_coef.scale).round() as u32) << 18)
        | if has_alpha { 1 << 23 } else { 0 };
    let header16 = (if is_landscape { ly } else { lx }) as u16
        | (((63.0 * p_coef.scale).round() as u16) << 3)
        | (((63.0 * q_coef.scale).round() as u16) << 9)
        | if is_landscape { 1 << 15 } else { 0 };

    let mut hash = Vec::with_capacity(25);
    hash.extend_from_slice(&[
        (header24 & 255) as u8,
        ((header24 >> 8) & 255) as u8,
        (header24 >> 16) as u8,
        (header16 & 255) as u8,
        (header16 >> 8) as u8,
    ]);
    if let Some(a_coef) = &a_coef {
        hash.push((15.0 * a_coef.dc).round() as u8 | (((15.0 * a_coef.scale).round() as u8) << 4));
    }

    let mut nibbles = NibbleWriter::new(hash);
    for channel in [&l_coef, &p_coef, &q_coef].into_iter().chain(a_coef.as_ref()) {
        for f in &channel.ac {
            nibbles.push((15.0 * f).round() as u8);
        }
    }

    Ok(ThumbHash::from_bytes(nibbles.finish()))
}

/// Project a channel onto the low-frequency cosine basis.
///
/// Only the triangle `cx * ny < nx * (ny - cy)` is kept. AC terms are
/// rescaled into `[0, 1]` by their largest magnitude.
fn encode_channel(channel: &[f32], w: usize, h: usize, nx: usize, ny: usize) -> ChannelCoefficients {
    let mut dc = 0.0;
    let mut ac = Vec::with_capacity(nx * ny / 2);
    let mut scale = 0.0f32;
    let mut fx = vec![0.0f32; w];
    for cy in 0..ny {
        let mut cx = 0;
        while cx * ny < nx * (ny - cy) {
            for (x, f) in fx.iter_mut().enumerate() {
                *f = (PI / w as f32 * cx as f32 * (x as f32 + 0.5)).cos();
            }
            let mut f = 0.0;
            for y in 0..h {
                let fy = (PI / h as f32 * cy as f32 * (y as f32 + 0.5)).cos();
                for x in 0..w {
                    f += channel[x + y * w] * fx[x] * fy;
                }
            }
            f /= (w * h) as f32;
            if cx > 0 || cy > 0 {
                ac.push(f);
                scale = scale.max(f.abs());
            } else {
                dc = f;
            }
            cx += 1;
        }
    }
    if scale > 0.0 {
        for f in &mut ac {
            *f = 0.5 + 0.5 / scale * *f;
        }
    }
    ChannelCoefficients { dc, ac, scale }
}

/// Packs 4-bit values two per byte, low nibble first.
struct NibbleWriter {
    bytes: Vec<u8>,
    odd: bool,
}

impl NibbleWriter {
    fn new(bytes: Vec<u8>) -> Self {
        Self { bytes, odd: false }
    }

    fn push(&mut self, nibble: u8) {
        match self.bytes.last_mut() {
            Some(last) if self.odd => *last |= nibble << 4,
            _ => self.bytes.push(nibble),
        }
        self.odd = !self.odd;
    }

    fn finish(self) -> Vec<u8> {
        self.bytes
    }
}
