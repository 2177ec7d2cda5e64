//! # Metadata Module
//!
//! Reads the EXIF block of a photo into a flat `field name -> value` map.
//!
//! ## Field Names
//! Names combine the directory the tag was found in with the tag name,
//! e.g. `EXIF DateTimeOriginal` or `Image DateTime`:
//! - `Image` - primary TIFF directory (IFD0)
//! - `Thumbnail` - thumbnail directory (IFD1)
//! - `EXIF` - the Exif sub-directory
//! - `GPS`, `Interoperability` - the remaining sub-directories
//!
//! ASCII values are stored raw (not reformatted), so dates keep the
//! `YYYY:MM:DD HH:MM:SS` layout written by the camera.

use crate::error::{OrganizeError, Result};
use exif::{Context, Field, In, Reader, Tag, Value};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Metadata of one photo, keyed by field name
pub type Metadata = BTreeMap<String, String>;

/// Source of photo metadata
///
/// Implement this trait to feed the scanner from something other than
/// EXIF (e.g. fixed maps in tests).
pub trait MetadataExtractor {
    /// Read metadata from the file at `path`.
    ///
    /// A readable photo without metadata yields an empty map; a file that
    /// cannot be opened or parsed yields `MetadataUnreadable`.
    fn extract(&self, path: &Path) -> Result<Metadata>;
}

/// Extractor backed by kamadak-exif
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifExtractor;

impl ExifExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataExtractor for ExifExtractor {
    fn extract(&self, path: &Path) -> Result<Metadata> {
        let unreadable = |reason: String| OrganizeError::MetadataUnreadable {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path).map_err(|e| unreadable(e.to_string()))?;
        let mut bufreader = BufReader::new(file);

        let exif = match Reader::new().read_from_container(&mut bufreader) {
            Ok(exif) => exif,
            // A photo without an EXIF block simply has no metadata
            Err(exif::Error::NotFound(_)) => return Ok(Metadata::new()),
            Err(e) => return Err(unreadable(e.to_string())),
        };

        let mut metadata = Metadata::new();
        for field in exif.fields() {
            metadata
                .entry(field_name(field))
                .or_insert_with(|| field_value(field));
        }
        Ok(metadata)
    }
}

/// Build the `<directory> <tag>` name for a field
fn field_name(field: &Field) -> String {
    let directory = match field.tag.context() {
        Context::Tiff if field.ifd_num == In::PRIMARY => "Image",
        Context::Tiff => "Thumbnail",
        Context::Exif => "EXIF",
        Context::Gps => "GPS",
        Context::Interop => "Interoperability",
        #[allow(unreachable_patterns)]
        _ => "Unknown",
    };

    // Exif tags stored directly in IFD0 (e.g. DateTimeOriginal) are unknown
    // in the TIFF context, so look their names up in the Exif context.
    let tag = if field.tag.description().is_some() {
        field.tag
    } else {
        Tag(Context::Exif, field.tag.number())
    };

    format!("{} {}", directory, tag)
}

/// Render a field value as text
fn field_value(field: &Field) -> String {
    match field.value {
        Value::Ascii(ref vec) => vec
            .first()
            .map(|bytes| {
                String::from_utf8_lossy(bytes)
                    .trim_end_matches('\0')
                    .to_string()
            })
            .unwrap_or_default(),
        _ => field.display_value().to_string(),
    }
}
