//! # Core Module
//!
//! The organizing engine, independent of any front end.
//!
//! ## Modules
//! - `metadata` - Reads EXIF fields from photos
//! - `resolver` - Derives canonical keys from capture dates or file names
//! - `scanner` - Walks the tree and buckets photos by key
//! - `dedup` - Finds byte-identical copies and plans destination names
//! - `relocate` - Moves files according to a plan
//! - `pipeline` - Runs the whole workflow

pub mod dedup;
pub mod metadata;
pub mod pipeline;
pub mod relocate;
pub mod resolver;
pub mod scanner;

// Re-export commonly used types
pub use dedup::{MovePlan, MoveRole, PlannedMove};
pub use metadata::Metadata;
pub use pipeline::{ExecutionMode, Pipeline};
pub use resolver::{CanonicalKey, FallbackNaming};
pub use scanner::{KeyIndex, PhotoFile};
