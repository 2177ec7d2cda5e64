//! # Scanner Module
//!
//! Walks a photo tree and files every photo under its canonical key.
//!
//! ## Eligible Files
//! Regular files whose name ends in `jpg` or `JPG` (see [`PhotoFilter`]).
//! Directories without files are skipped; their subdirectories are still
//! visited.
//!
//! ## Example
//! ```rust,ignore
//! use photo_organizer::core::scanner::{PhotoScanner, ScanConfig};
//!
//! let scanner = PhotoScanner::new(ScanConfig::default(), events.clone());
//! let index = scanner.scan("/Users/me/Photos".as_ref())?;
//! ```

mod filter;
mod index;
mod walker;

pub use filter::PhotoFilter;
pub use index::KeyIndex;
pub use walker::{DirectoryListing, DirectoryWalker, ScanConfig};

use crate::core::metadata::{ExifExtractor, Metadata, MetadataExtractor};
use crate::core::resolver::{CanonicalKey, FallbackNaming, KeyResolver};
use crate::error::{OrganizeError, Result};
use crate::events::{Event, EventSender, ScanEvent, ScanProgress};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A discovered photo and the key it resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoFile {
    pub path: PathBuf,
    pub key: CanonicalKey,
}

/// What to do with a photo whose metadata cannot be read
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MetadataPolicy {
    /// Stop the run with `MetadataUnreadable`
    #[default]
    Abort,
    /// Log a warning and key the photo by its file name
    Skip,
}

/// Counts gathered while scanning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub directories_parsed: usize,
    pub photos_parsed: usize,
    pub new_keys: usize,
    pub unreadable_skipped: usize,
}

/// Scanner that resolves keys from EXIF by default
pub struct PhotoScanner<E = ExifExtractor> {
    walker: DirectoryWalker,
    filter: PhotoFilter,
    resolver: KeyResolver,
    extractor: E,
    metadata_policy: MetadataPolicy,
    events: EventSender,
}

impl PhotoScanner<ExifExtractor> {
    /// Create a scanner reading EXIF metadata
    pub fn new(config: ScanConfig, events: EventSender) -> Self {
        Self::with_extractor(config, ExifExtractor::new(), events)
    }
}

impl<E: MetadataExtractor> PhotoScanner<E> {
    /// Create a scanner with a custom metadata source
    pub fn with_extractor(config: ScanConfig, extractor: E, events: EventSender) -> Self {
        Self {
            walker: DirectoryWalker::new(config),
            filter: PhotoFilter::new(),
            resolver: KeyResolver::default(),
            extractor,
            metadata_policy: MetadataPolicy::default(),
            events,
        }
    }

    /// Choose how file names become keys when no date is usable
    pub fn fallback_naming(mut self, fallback: FallbackNaming) -> Self {
        self.resolver = KeyResolver::new(fallback);
        self
    }

    /// Choose how unreadable metadata is handled
    pub fn metadata_policy(mut self, policy: MetadataPolicy) -> Self {
        self.metadata_policy = policy;
        self
    }

    /// Scan `root` into a fresh index
    pub fn scan(&self, root: &Path) -> Result<KeyIndex> {
        let mut index = KeyIndex::new();
        self.scan_into(root, &mut index)?;
        Ok(index)
    }

    /// Scan `root`, appending every photo to `index`
    pub fn scan_into(&self, root: &Path, index: &mut KeyIndex) -> Result<ScanStats> {
        self.events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
        }));

        let mut stats = ScanStats::default();

        for listing in self.walker.walk(root)? {
            let listing = listing?;
            if !listing.has_files() {
                continue;
            }
            self.parse_directory(&listing, index, &mut stats)?;
        }

        self.events.send(Event::Scan(ScanEvent::Completed {
            total_photos: stats.photos_parsed,
            total_keys: index.len(),
        }));

        tracing::info!(
            "Scanned {}: {} photos under {} keys",
            root.display(),
            stats.photos_parsed,
            index.len()
        );

        Ok(stats)
    }

    /// Resolve the key of a single photo
    pub fn resolve_photo(&self, path: &Path) -> Result<PhotoFile> {
        let metadata = match self.extractor.extract(path) {
            Ok(metadata) => metadata,
            Err(e @ OrganizeError::MetadataUnreadable { .. })
                if self.metadata_policy == MetadataPolicy::Skip =>
            {
                tracing::warn!("{}; keying by file name", e);
                Metadata::new()
            }
            Err(e) => return Err(e),
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(PhotoFile {
            path: path.to_path_buf(),
            key: self.resolver.resolve(&metadata, &file_name),
        })
    }

    fn parse_directory(
        &self,
        listing: &DirectoryListing,
        index: &mut KeyIndex,
        stats: &mut ScanStats,
    ) -> Result<()> {
        tracing::debug!("Starting to parse photos in {}", listing.path.display());

        let mut processed = 0;
        let mut new_keys = 0;

        for path in listing.files.iter().filter(|p| self.filter.should_include(p)) {
            let photo = self.resolve_photo(path)?;

            if index.append(photo.key, photo.path) {
                new_keys += 1;
                stats.new_keys += 1;
            }
            processed += 1;
            stats.photos_parsed += 1;

            self.events.send(Event::Scan(ScanEvent::Progress(ScanProgress {
                photos_parsed: stats.photos_parsed,
                keys_found: index.len(),
                current_path: path.clone(),
            })));
        }

        stats.directories_parsed += 1;

        tracing::debug!(
            "Parsing in {} is done: {} new keys, {} photos processed",
            listing.path.display(),
            new_keys,
            processed
        );

        self.events.send(Event::Scan(ScanEvent::DirectoryParsed {
            path: listing.path.clone(),
            photos_processed: processed,
            new_keys,
        }));

        Ok(())
    }
}
