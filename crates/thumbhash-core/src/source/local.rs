//! Filesystem-backed image source with on-disk thumbnails.

use blake3::Hasher as Blake3Hasher;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};

use super::{SourceImage, Thumbnail};
use crate::error::{PlaceholderError, PlaceholderResult};

/// An image file on disk, identified by the BLAKE3 hash of its contents.
#[derive(Debug, Clone)]
pub struct LocalImage {
    path: PathBuf,
    thumbs_dir: PathBuf,
    identity: String,
}

impl LocalImage {
    /// Open `path`, hashing its contents. Thumbnails are written to `thumbs_dir`.
    pub fn open(path: impl Into<PathBuf>, thumbs_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let identity = content_hash(&path)?;
        Ok(Self {
            path,
            thumbs_dir: thumbs_dir.into(),
            identity,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn thumbnail_error(&self, message: impl std::fmt::Display) -> PlaceholderError {
        PlaceholderError::Thumbnail {
            file: self.filename(),
            message: message.to_string(),
        }
    }

    fn thumbnail_path(&self, width: u32, height: u32, crop: bool, ext: &str) -> PathBuf {
        let suffix = if crop { "-crop" } else { "" };
        self.thumbs_dir
            .join(format!("{}-{width}x{height}{suffix}.{ext}", self.identity))
    }

    fn render_thumbnail(
        &self,
        image: &DynamicImage,
        width: u32,
        height: u32,
        crop: bool,
    ) -> DynamicImage {
        if crop {
            image.resize_to_fill(width, height, FilterType::Triangle)
        } else {
            image.resize(width, height, FilterType::Triangle)
        }
    }
}

impl SourceImage for LocalImage {
    fn identity(&self) -> String {
        self.identity.clone()
    }

    fn filename(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string()
    }

    fn aspect_ratio(&self) -> PlaceholderResult<f64> {
        let (width, height) =
            image::image_dimensions(&self.path).map_err(|e| PlaceholderError::Decode {
                message: format!("{}: {e}", self.path.display()),
            })?;
        if height == 0 {
            return Err(PlaceholderError::InvalidRatio {
                file: self.filename(),
                ratio: f64::INFINITY,
            });
        }
        Ok(width as f64 / height as f64)
    }

    fn generate_thumbnail(
        &self,
        width: u32,
        height: u32,
        crop: bool,
        quality: u8,
    ) -> PlaceholderResult<Box<dyn Thumbnail>> {
        // An existing thumbnail is reused without decoding the source
        for ext in ["jpg", "png"] {
            let path = self.thumbnail_path(width, height, crop, ext);
            if path.exists() {
                let (w, h) =
                    image::image_dimensions(&path).map_err(|e| self.thumbnail_error(e))?;
                tracing::trace!("Reusing thumbnail {:?}", path);
                return Ok(Box::new(LocalThumbnail {
                    path,
                    width: w,
                    height: h,
                }));
            }
        }

        let image = image::open(&self.path).map_err(|e| self.thumbnail_error(e))?;
        let has_alpha = image.color().has_alpha();
        // JPEG has no alpha channel, so translucent sources stay PNG
        let ext = if has_alpha { "png" } else { "jpg" };
        let path = self.thumbnail_path(width, height, crop, ext);

        std::fs::create_dir_all(&self.thumbs_dir).map_err(|e| self.thumbnail_error(e))?;
        let thumb = self.render_thumbnail(&image, width, height, crop);
        drop(image);

        if has_alpha {
            thumb
                .save_with_format(&path, ImageFormat::Png)
                .map_err(|e| self.thumbnail_error(e))?;
        } else {
            let file = File::create(&path).map_err(|e| self.thumbnail_error(e))?;
            let encoder = JpegEncoder::new_with_quality(BufWriter::new(file), quality.clamp(1, 100));
            thumb
                .to_rgb8()
                .write_with_encoder(encoder)
                .map_err(|e| self.thumbnail_error(e))?;
        }
        tracing::trace!("Wrote thumbnail {:?} ({}x{})", path, thumb.width(), thumb.height());

        Ok(Box::new(LocalThumbnail {
            path,
            width: thumb.width(),
            height: thumb.height(),
        }))
    }
}

/// A thumbnail file written by [`LocalImage`].
#[derive(Debug, Clone)]
pub struct LocalThumbnail {
    path: PathBuf,
    width: u32,
    height: u32,
}

impl LocalThumbnail {
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error(&self, e: std::io::Error) -> PlaceholderError {
        PlaceholderError::Thumbnail {
            file: self.path.display().to_string(),
            message: e.to_string(),
        }
    }
}

impl Thumbnail for LocalThumbnail {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn read_bytes(&self) -> PlaceholderResult<Vec<u8>> {
        std::fs::read(&self.path).map_err(|e| self.error(e))
    }

    fn delete(&self) -> PlaceholderResult<()> {
        std::fs::remove_file(&self.path).map_err(|e| self.error(e))
    }
}

/// BLAKE3 hash of a file's contents, streamed in 64KB chunks.
pub fn content_hash(path: &Path) -> std::io::Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Blake3Hasher::new();

    let mut buffer = [0u8; 65536];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn write_png(dir: &Path, name: &str, width: u32, height: u32, alpha: u8) -> PathBuf {
        let path = dir.join(name);
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, alpha]));
        // Opaque fixtures are saved without an alpha channel
        if alpha == 255 {
            DynamicImage::ImageRgba8(img).to_rgb8().save(&path).unwrap();
        } else {
            img.save(&path).unwrap();
        }
        path
    }

    #[test]
    fn test_identity_is_content_hash() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", 8, 8, 255);
        let b = dir.path().join("b.png");
        std::fs::copy(&a, &b).unwrap();

        let thumbs = dir.path().join("thumbs");
        let image_a = LocalImage::open(&a, &thumbs).unwrap();
        let image_b = LocalImage::open(&b, &thumbs).unwrap();
        assert_eq!(image_a.identity(), image_b.identity());
        assert_eq!(image_a.identity().len(), 64);
        assert_eq!(image_a.filename(), "a.png");
    }

    #[test]
    fn test_aspect_ratio() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "wide.png", 40, 20, 255);
        let image = LocalImage::open(&path, dir.path()).unwrap();
        assert_eq!(image.aspect_ratio().unwrap(), 2.0);
    }

    #[test]
    fn test_cropped_thumbnail_has_requested_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "photo.png", 300, 120, 255);
        let image = LocalImage::open(&path, dir.path().join("thumbs")).unwrap();

        let thumb = image.generate_thumbnail(100, 100, true, 70).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (100, 100));

        let bytes = thumb.read_bytes().unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_translucent_thumbnail_stays_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "logo.png", 50, 50, 100);
        let image = LocalImage::open(&path, dir.path().join("thumbs")).unwrap();

        let thumb = image.generate_thumbnail(20, 20, true, 70).unwrap();
        let bytes = thumb.read_bytes().unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[test]
    fn test_thumbnail_delete() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "photo.png", 60, 60, 255);
        let image = LocalImage::open(&path, dir.path().join("thumbs")).unwrap();

        let thumb = image.generate_thumbnail(30, 30, true, 70).unwrap();
        assert!(thumb.read_bytes().is_ok());
        thumb.delete().unwrap();
        assert!(thumb.read_bytes().is_err());
        assert!(thumb.delete().is_err());
    }

    #[test]
    fn test_existing_thumbnail_skips_source_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "logo.png", 50, 50, 100);
        let image = LocalImage::open(&path, dir.path().join("thumbs")).unwrap();
        let first = image.generate_thumbnail(20, 20, true, 70).unwrap();

        // Identity was fixed at open, so the cached thumbnail still applies
        std::fs::write(&path, b"no longer an image").unwrap();
        let again = image.generate_thumbnail(20, 20, true, 70).unwrap();
        assert_eq!((again.width(), again.height()), (20, 20));
        assert_eq!(again.read_bytes().unwrap(), first.read_bytes().unwrap());

        assert!(image.generate_thumbnail(10, 10, true, 70).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(LocalImage::open(dir.path().join("nope.png"), dir.path()).is_err());
    }
}
