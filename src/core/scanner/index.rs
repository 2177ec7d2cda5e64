//! Ordered mapping from canonical key to the photos that share it.

use crate::core::resolver::CanonicalKey;
use std::collections::HashMap;
use std::path::PathBuf;

/// Photos bucketed by canonical key
///
/// Keys iterate in the order they were first seen and each bucket keeps its
/// paths in append order. The only way to add data is [`KeyIndex::append`].
#[derive(Debug, Clone, Default)]
pub struct KeyIndex {
    keys: Vec<CanonicalKey>,
    buckets: HashMap<CanonicalKey, Vec<PathBuf>>,
}

impl KeyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `path` under `key`, creating the bucket if absent.
    ///
    /// Returns `true` when the key was not seen before.
    pub fn append(&mut self, key: CanonicalKey, path: PathBuf) -> bool {
        match self.buckets.get_mut(&key) {
            Some(paths) => {
                paths.push(path);
                false
            }
            None => {
                self.keys.push(key.clone());
                self.buckets.insert(key, vec![path]);
                true
            }
        }
    }

    /// Paths recorded under `key`
    pub fn get(&self, key: &CanonicalKey) -> Option<&[PathBuf]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of paths across all keys
    pub fn total_files(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Keys in first-seen order
    pub fn keys(&self) -> impl Iterator<Item = &CanonicalKey> {
        self.keys.iter()
    }

    /// Buckets in first-seen key order
    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalKey, &[PathBuf])> {
        self.keys
            .iter()
            .map(move |key| (key, self.buckets[key].as_slice()))
    }
}
