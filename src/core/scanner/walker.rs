//! Directory walking implementation using walkdir.

use crate::error::{OrganizeError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Configuration for the directory walker
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Whether to follow symbolic links to directories
    pub follow_symlinks: bool,
    /// Deepest directory level to visit, the root being 0 (None = unlimited)
    pub max_depth: Option<usize>,
}

/// One visited directory and its direct children, sorted by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryListing {
    pub path: PathBuf,
    pub subdirectories: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}

impl DirectoryListing {
    /// A directory that holds only subdirectories (or nothing)
    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }
}

/// Walks a tree directory by directory
#[derive(Debug, Clone, Default)]
pub struct DirectoryWalker {
    config: ScanConfig,
}

impl DirectoryWalker {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Lazily list every directory under `root`, parents before children
    pub fn walk<'a>(&'a self, root: &Path) -> Result<impl Iterator<Item = Result<DirectoryListing>> + 'a> {
        if !root.is_dir() {
            return Err(OrganizeError::fs(
                root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            ));
        }

        let mut walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        Ok(walker.into_iter().filter_map(move |entry_result| match entry_result {
            Ok(entry) if entry.file_type().is_dir() => Some(self.list(entry.path())),
            Ok(_) => None,
            Err(e) => {
                let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop"));
                Some(Err(OrganizeError::fs(path, source)))
            }
        }))
    }

    /// Split the direct children of `dir` into subdirectories and files
    fn list(&self, dir: &Path) -> Result<DirectoryListing> {
        let mut subdirectories = Vec::new();
        let mut files = Vec::new();

        for entry in fs::read_dir(dir).map_err(|e| OrganizeError::fs(dir, e))? {
            let entry = entry.map_err(|e| OrganizeError::fs(dir, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| OrganizeError::fs(&path, e))?;

            let is_dir = if file_type.is_symlink() {
                fs::metadata(&path).map(|m| m.is_dir()).unwrap_or(false)
            } else {
                file_type.is_dir()
            };

            if is_dir {
                subdirectories.push(path);
            } else {
                files.push(path);
            }
        }

        subdirectories.sort();
        files.sort();

        Ok(DirectoryListing {
            path: dir.to_path_buf(),
            subdirectories,
            files,
        })
    }
}
