//! # Dedup Module
//!
//! Plans where each photo of a key goes.
//!
//! ## Naming
//! | unique photos | names                                   |
//! |---------------|-----------------------------------------|
//! | 1             | `<key>.jpg`                             |
//! | n > 1         | `<key>_0.jpg` .. `<key>_{n-1}.jpg`      |
//!
//! | redundant photos | names                                   |
//! |------------------|-----------------------------------------|
//! | 0                | none                                    |
//! | 1                | `<key>_dup.jpg`                         |
//! | n > 1            | `<key>_dup_0.jpg` .. `<key>_dup_{n-1}.jpg` |
//!
//! A photo is redundant when its bytes equal an earlier unique photo of the
//! same key. Finding copies is an expected outcome and is only reported.

mod comparator;
mod partition;

pub use comparator::{files_identical, ByteComparator, ContentComparator};
pub use partition::{partition, redundant_names, unique_names, Partition, RedundantFile};

use crate::core::resolver::CanonicalKey;
use crate::error::Result;
use crate::events::{DedupEvent, Event, EventSender};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Why a file is being moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveRole {
    Unique,
    Redundant,
}

/// A single planned relocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedMove {
    pub from: PathBuf,
    pub to: PathBuf,
    pub role: MoveRole,
}

/// Every relocation computed for one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePlan {
    pub key: CanonicalKey,
    pub moves: Vec<PlannedMove>,
}

impl MovePlan {
    /// Number of moves with the given role
    pub fn count(&self, role: MoveRole) -> usize {
        self.moves.iter().filter(|m| m.role == role).count()
    }

    /// Destination paths in plan order
    pub fn destinations(&self) -> impl Iterator<Item = &Path> {
        self.moves.iter().map(|m| m.to.as_path())
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Computes move plans for one key at a time
pub struct Deduplicator<C = ByteComparator> {
    comparator: C,
    destination: PathBuf,
    events: EventSender,
}

impl Deduplicator<ByteComparator> {
    /// Plan moves into `destination` using full byte comparison
    pub fn new(destination: impl Into<PathBuf>, events: EventSender) -> Self {
        Self::with_comparator(destination, ByteComparator::new(), events)
    }
}

impl<C: ContentComparator> Deduplicator<C> {
    pub fn with_comparator(destination: impl Into<PathBuf>, comparator: C, events: EventSender) -> Self {
        Self {
            comparator,
            destination: destination.into(),
            events,
        }
    }

    /// Partition one key's photos and name their destinations.
    ///
    /// All comparisons finish before the plan is returned; nothing is moved.
    pub fn plan(&mut self, key: &CanonicalKey, paths: &[PathBuf]) -> Result<MovePlan> {
        let partition = partition(paths, &mut self.comparator)?;

        if !partition.redundant.is_empty() {
            let redundant = partition.redundant_paths();
            tracing::info!("The following files are redundant: {:?}", redundant);
            self.events.send(Event::Dedup(DedupEvent::RedundantFound {
                key: key.to_string(),
                paths: redundant,
            }));
        }

        let unique = partition
            .unique
            .iter()
            .zip(unique_names(key, partition.unique.len()))
            .map(|(from, name)| PlannedMove {
                from: from.clone(),
                to: self.destination.join(name),
                role: MoveRole::Unique,
            });

        let redundant = partition
            .redundant
            .iter()
            .zip(redundant_names(key, partition.redundant.len()))
            .map(|(file, name)| PlannedMove {
                from: file.path.clone(),
                to: self.destination.join(name),
                role: MoveRole::Redundant,
            });

        let plan = MovePlan {
            key: key.clone(),
            moves: unique.chain(redundant).collect(),
        };

        self.events.send(Event::Dedup(DedupEvent::Planned {
            key: key.to_string(),
            unique: partition.unique.len(),
            redundant: partition.redundant.len(),
        }));

        Ok(plan)
    }
}
