//! File filtering logic for the scanner.

use std::path::Path;

/// Suffixes a file name must end with to be treated as a photo
const PHOTO_SUFFIXES: [&str; 2] = ["jpg", "JPG"];

/// Decides which directory entries are photos
///
/// Matching is a case-sensitive suffix test on the whole file name, not an
/// extension check: `a.jpg` and `a.JPG` match, `a.jpeg` and `a.Jpg` do not,
/// and a name such as `xjpg` without a dot also matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotoFilter;

impl PhotoFilter {
    pub fn new() -> Self {
        Self
    }

    /// Check a bare file name
    pub fn matches_name(&self, name: &str) -> bool {
        PHOTO_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
    }

    /// Check the file name component of a path
    pub fn should_include(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| {
                let bytes = name.as_encoded_bytes();
                PHOTO_SUFFIXES
                    .iter()
                    .any(|suffix| bytes.ends_with(suffix.as_bytes()))
            })
            .unwrap_or(false)
    }
}
