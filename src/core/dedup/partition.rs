//! Splitting one key's photos into unique and redundant files, and naming
//! them.

use super::comparator::ContentComparator;
use crate::core::resolver::CanonicalKey;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A photo whose bytes equal an earlier unique photo of the same key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedundantFile {
    pub path: PathBuf,
    /// The unique photo it matched
    pub original: PathBuf,
}

/// One key's photos split by content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    /// First member of each content class, in encounter order
    pub unique: Vec<PathBuf>,
    /// Every later member, in encounter order
    pub redundant: Vec<RedundantFile>,
}

impl Partition {
    /// Paths of the redundant members
    pub fn redundant_paths(&self) -> Vec<PathBuf> {
        self.redundant.iter().map(|r| r.path.clone()).collect()
    }
}

/// Partition `paths` into unique representatives and redundant copies.
///
/// Each candidate is compared with the earlier unique photos in order and
/// the first identical one claims it.
pub fn partition<C: ContentComparator + ?Sized>(
    paths: &[PathBuf],
    comparator: &mut C,
) -> Result<Partition> {
    let mut result = Partition::default();

    for candidate in paths {
        let mut original = None;
        for base in &result.unique {
            if comparator.same_content(base, candidate)? {
                original = Some(base.clone());
                break;
            }
        }

        match original {
            Some(original) => result.redundant.push(RedundantFile {
                path: candidate.clone(),
                original,
            }),
            None => result.unique.push(candidate.clone()),
        }
    }

    Ok(result)
}

/// Destination file names for the unique photos of a key
pub fn unique_names(key: &CanonicalKey, count: usize) -> Vec<String> {
    match count {
        1 => vec![format!("{}.jpg", key)],
        _ => (0..count).map(|i| format!("{}_{}.jpg", key, i)).collect(),
    }
}

/// Destination file names for the redundant photos of a key
pub fn redundant_names(key: &CanonicalKey, count: usize) -> Vec<String> {
    match count {
        1 => vec![format!("{}_dup.jpg", key)],
        _ => (0..count).map(|i| format!("{}_dup_{}.jpg", key, i)).collect(),
    }
}
