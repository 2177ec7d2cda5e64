//! Event type definitions for progress and audit reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted while organizing a photo tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Scanning phase events
    Scan(ScanEvent),
    /// Duplicate detection events
    Dedup(DedupEvent),
    /// File move events
    Relocate(RelocateEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { root: PathBuf },
    /// Progress update after each parsed photo
    Progress(ScanProgress),
    /// A directory with files has been fully parsed
    DirectoryParsed {
        path: PathBuf,
        photos_processed: usize,
        new_keys: usize,
    },
    /// Scanning completed
    Completed { total_photos: usize, total_keys: usize },
}

/// Progress information during scanning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanProgress {
    /// Photos parsed so far in the whole run
    pub photos_parsed: usize,
    /// Distinct canonical keys found so far
    pub keys_found: usize,
    /// Photo that was just parsed
    pub current_path: PathBuf,
}

/// Events during duplicate detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DedupEvent {
    /// A move plan was computed for a key
    Planned {
        key: String,
        unique: usize,
        redundant: usize,
    },
    /// Byte-identical copies were found under a key
    RedundantFound { key: String, paths: Vec<PathBuf> },
}

/// Events while moving files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RelocateEvent {
    /// A file reached its destination
    Moved { from: PathBuf, to: PathBuf },
    /// A file already had its destination name
    AlreadyInPlace { path: PathBuf },
    /// A plan overlapped its own sources and went through staging names
    Staged { key: String, files: usize },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Planning,
    Moving,
}

/// Summary of a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Photos found by the scanner
    pub total_photos: usize,
    /// Distinct canonical keys
    pub total_keys: usize,
    /// Files kept as the representative of their content
    pub unique_files: usize,
    /// Files set aside as byte-identical copies
    pub redundant_files: usize,
    /// Files that changed location
    pub files_moved: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Planning => write!(f, "Planning"),
            PipelinePhase::Moving => write!(f, "Moving"),
        }
    }
}
