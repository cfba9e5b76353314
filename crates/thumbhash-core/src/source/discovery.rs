//! Finding source images on disk.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions the pixel extraction backends can decode.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff", "tif"];

/// All supported images at `path`.
///
/// A file is returned as-is if its extension is supported; a directory is
/// walked recursively. Results are sorted for deterministic batches.
pub fn discover_images(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return if is_supported(path) {
            vec![path.to_path_buf()]
        } else {
            vec![]
        };
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_supported(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Check if a file has a supported extension (case-insensitive).
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
