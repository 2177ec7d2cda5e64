//! Byte-level content comparison.

use crate::error::{OrganizeError, Result};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use xxhash_rust::xxh3::Xxh3;

/// Chunk size for streaming reads
const CHUNK_SIZE: usize = 64 * 1024;

/// Decides whether two files hold identical bytes
pub trait ContentComparator {
    fn same_content(&mut self, a: &Path, b: &Path) -> Result<bool>;
}

/// Size and xxh3 digest of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    size: u64,
    digest: u64,
}

/// Comparator that rules pairs out by size and digest, then confirms
/// candidates with a full byte comparison.
///
/// Digests are computed once per path and cached for the comparator's
/// lifetime; a digest match alone never counts as identical.
#[derive(Debug, Default)]
pub struct ByteComparator {
    fingerprints: HashMap<PathBuf, Fingerprint>,
}

impl ByteComparator {
    pub fn new() -> Self {
        Self::default()
    }

    fn fingerprint(&mut self, path: &Path) -> Result<Fingerprint> {
        if let Some(fingerprint) = self.fingerprints.get(path) {
            return Ok(*fingerprint);
        }

        let size = fs::metadata(path)
            .map_err(|e| OrganizeError::fs(path, e))?
            .len();
        let digest = digest_file(path).map_err(|e| OrganizeError::fs(path, e))?;
        let fingerprint = Fingerprint { size, digest };

        self.fingerprints.insert(path.to_path_buf(), fingerprint);
        Ok(fingerprint)
    }
}

impl ContentComparator for ByteComparator {
    fn same_content(&mut self, a: &Path, b: &Path) -> Result<bool> {
        if a == b {
            return Ok(true);
        }

        let fa = self.fingerprint(a)?;
        let fb = self.fingerprint(b)?;
        if fa != fb {
            return Ok(false);
        }

        files_identical(a, b)
    }
}

fn digest_file(path: &Path) -> std::io::Result<u64> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Xxh3::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hasher.digest())
}

/// Full streaming comparison of two files
pub fn files_identical(a: &Path, b: &Path) -> Result<bool> {
    let open = |path: &Path| {
        File::open(path)
            .map(BufReader::new)
            .map_err(|e| OrganizeError::fs(path, e))
    };
    let mut reader_a = open(a)?;
    let mut reader_b = open(b)?;

    let mut buffer_a = vec![0u8; CHUNK_SIZE];
    let mut buffer_b = vec![0u8; CHUNK_SIZE];

    loop {
        let read_a = fill(&mut reader_a, &mut buffer_a).map_err(|e| OrganizeError::fs(a, e))?;
        let read_b = fill(&mut reader_b, &mut buffer_b).map_err(|e| OrganizeError::fs(b, e))?;

        if read_a != read_b || buffer_a[..read_a] != buffer_b[..read_b] {
            return Ok(false);
        }
        if read_a == 0 {
            return Ok(true);
        }
    }
}

/// Read until `buffer` is full or the reader is exhausted
fn fill(reader: &mut impl Read, buffer: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
