//! # Photo Organizer
//!
//! Renames photos after their capture time and sets byte-identical copies
//! aside.
//!
//! ## What a run does
//! - **Scan** a tree for `jpg`/`JPG` files and read their EXIF dates
//! - **Group** photos by canonical key (`YYYY-MM-DD-HH.MM.SS`, or the file
//!   name when no date is usable)
//! - **Deduplicate** each group by full byte comparison
//! - **Move** every photo to `<key>.jpg`, `<key>_N.jpg` or `<key>_dup*.jpg`
//!
//! ## Architecture
//! - `core` - The organizing engine
//! - `events` - Progress and audit reporting
//! - `error` - Error types

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{OrganizeError, Result};

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Name of the audit log written next to where the tool runs
pub const LOG_FILE_NAME: &str = "organizer.log";

/// Initialize tracing, appending plain-text records to `log_path`.
///
/// The level comes from `RUST_LOG` and defaults to `info`. This should be
/// called once by the application entry point.
pub fn init_tracing(log_path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|e| OrganizeError::Logging(format!("{}: {}", log_path.display(), e)))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| OrganizeError::Logging(e.to_string()))
}
