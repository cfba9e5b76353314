//! ThumbHash binary format.
//!
//! A ThumbHash stores a DCT of a tiny version of an image in three color
//! channels (luminance, yellow-blue, red-green) plus an optional alpha
//! channel, quantized to 4 bits per coefficient. The layout is:
//!
//! ```text
//! byte 0..3  header24: L dc (6) | P dc (6) | Q dc (6) | L scale (5) | has alpha (1)
//! byte 3..5  header16: L count (3) | P scale (6) | Q scale (6) | is landscape (1)
//! byte 5     (alpha only) A dc (4) | A scale (4)
//! rest       AC coefficients, two per byte, low nibble first: L, P, Q, then A
//! ```
//!
//! The format is shared with the reference implementations, so hashes
//! produced here decode identically elsewhere and vice versa.

mod decode;
mod encode;

pub use decode::{approximate_aspect_ratio, average_color, decode};
pub use encode::encode;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::fmt;
use std::str::FromStr;

use crate::error::{PlaceholderError, PlaceholderResult};

/// Longest side of a decoded raster.
pub const DECODED_MAX_DIMENSION: u32 = 32;

/// An encoded ThumbHash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThumbHash(Vec<u8>);

impl ThumbHash {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Base64 form, as stored in caches and markup.
    pub fn to_base64(&self) -> String {
        convert_hash_to_string(&self.0)
    }

    /// Parse the base64 form.
    pub fn from_base64(s: &str) -> PlaceholderResult<Self> {
        convert_string_to_hash(s).map(Self)
    }
}

impl fmt::Display for ThumbHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl FromStr for ThumbHash {
    type Err = PlaceholderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base64(s)
    }
}

/// Encode hash bytes as standard, padded base64.
pub fn convert_hash_to_string(hash: &[u8]) -> String {
    BASE64.encode(hash)
}

/// Decode the base64 form produced by [`convert_hash_to_string`].
pub fn convert_string_to_hash(s: &str) -> PlaceholderResult<Vec<u8>> {
    BASE64
        .decode(s.trim())
        .map_err(|e| PlaceholderError::malformed(format!("invalid base64: {e}")))
}
