//! # Resolver Module
//!
//! Turns a photo's metadata into the canonical key that photos are grouped
//! and renamed by.
//!
//! ## Key Formats
//! - Capture time: `YYYY-MM-DD-HH.MM.SS` (e.g. `2020-01-01-10.00.00`)
//! - Fallback: the original file name without its extension
//!
//! Date fields are probed in priority order and the first one that parses
//! wins. A field that is present but malformed is skipped, not reported.

use super::metadata::Metadata;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Date fields in the order they are probed
pub const DATE_TIME_FIELDS: [&str; 4] = [
    "EXIF DateTimeOriginal",
    "EXIF DateTimeDigitized",
    "Image DateTimeOriginal",
    "Image DateTime",
];

/// Layout of EXIF date strings
const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Layout of date-derived keys
const KEY_DATE_FORMAT: &str = "%Y-%m-%d-%H.%M.%S";

/// Name all photos of one group are renamed after
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a key is derived from the file name when no date is usable
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FallbackNaming {
    /// Drop the last four characters (`IMG_1.jpg` -> `IMG_1`).
    ///
    /// Assumes a three letter extension: `IMG_1.jpeg` becomes `IMG_1.`.
    #[default]
    TruncateExtension,
    /// Drop the real extension, whatever its length
    StripExtension,
}

/// Derives canonical keys from metadata
#[derive(Debug, Clone, Default)]
pub struct KeyResolver {
    fallback: FallbackNaming,
}

impl KeyResolver {
    pub fn new(fallback: FallbackNaming) -> Self {
        Self { fallback }
    }

    /// Key from the first usable date field, if any
    pub fn key_from_metadata(&self, metadata: &Metadata) -> Option<CanonicalKey> {
        DATE_TIME_FIELDS
            .iter()
            .filter_map(|field| metadata.get(*field))
            .find_map(|value| parse_date_time(value))
            .map(CanonicalKey)
    }

    /// Key derived from the file name alone
    pub fn fallback_key(&self, file_name: &str) -> CanonicalKey {
        let key = match self.fallback {
            FallbackNaming::TruncateExtension => {
                let keep = file_name.chars().count().saturating_sub(4);
                file_name.chars().take(keep).collect()
            }
            FallbackNaming::StripExtension => Path::new(file_name)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        CanonicalKey(key)
    }

    /// Key from metadata, falling back to the file name
    pub fn resolve(&self, metadata: &Metadata, file_name: &str) -> CanonicalKey {
        self.key_from_metadata(metadata)
            .unwrap_or_else(|| self.fallback_key(file_name))
    }
}

/// Reformat an EXIF date string as a key, `None` if it does not parse
pub fn parse_date_time(value: &str) -> Option<String> {
    NaiveDateTime::parse_from_str(value, EXIF_DATE_FORMAT)
        .ok()
        .map(|date_time| date_time.format(KEY_DATE_FORMAT).to_string())
}
