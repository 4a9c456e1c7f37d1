//! Exclusion list of projects known (or assumed) not to use the library
//!
//! Stored as plain UTF-8 text, one project short name per line. The file is
//! only ever appended to, so duplicate lines across runs are expected.

use crate::scan::split_lines;
use fs2::FileExt;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExclusionError {
    #[error("Failed to read exclusion file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write exclusion file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Exclusion list backed by a file on disk
#[derive(Debug)]
pub struct ExclusionList {
    path: PathBuf,
    names: HashSet<String>,
}

impl ExclusionList {
    /// Load the exclusion list, treating a missing file as empty
    pub fn load(path: &Path) -> Result<Self, ExclusionError> {
        let names = match fs::read_to_string(path) {
            Ok(content) => parse_names(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(source) => {
                return Err(ExclusionError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            names,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Append a project name as a new line
    ///
    /// Existing entries are never rewritten or deduplicated. The in-memory set
    /// is not updated: membership reflects the file as it was at load time.
    pub fn append(&self, name: &str) -> Result<(), ExclusionError> {
        let write_err = |source: std::io::Error| ExclusionError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;

        // Advisory lock so overlapping runs don't interleave partial lines
        file.lock_exclusive().map_err(write_err)?;
        let result = writeln!(file, "{}", name).and_then(|_| file.flush());
        let _ = FileExt::unlock(&file);
        result.map_err(write_err)?;

        tracing::debug!(path = %self.path.display(), name, "appended exclusion");
        Ok(())
    }
}

/// Collect non-empty trimmed lines
fn parse_names(content: &str) -> HashSet<String> {
    split_lines(content)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
