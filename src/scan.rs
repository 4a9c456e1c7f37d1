//! Requirements scanning
//!
//! Split in two layers:
//! - pure helpers that decide which files to read and which lines match
//! - `inspect()`, which fetches a project's default branch into a scoped
//!   temporary directory and applies those helpers

use crate::git::{GitError, Workspace};
use crate::project::Project;
use serde::Serialize;
use std::path::Path;
use tempfile::TempDir;
use thiserror::Error;

/// Default filename suffix of files to scan
pub const REQUIREMENTS_FILENAME: &str = "requirements.txt";

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to create temporary directory: {source}")]
    TempDir { source: std::io::Error },

    #[error(transparent)]
    Git(#[from] GitError),
}

/// A requirements line that declares the library
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub file: String,
    pub line: String,
}

impl std::fmt::Display for Match {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.file, self.line)
    }
}

/// What to look for inside each repository
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub library: String,
    pub filename: String,
}

impl ScanOptions {
    pub fn new(library: impl Into<String>) -> Self {
        Self {
            library: library.into(),
            filename: REQUIREMENTS_FILENAME.to_string(),
        }
    }
}

/// Inspect a project's default branch for lines declaring the library
///
/// The temporary directory is removed when this returns, on every path.
/// Failures before the file list is known are returned as errors; a file that
/// cannot be checked out is skipped.
pub fn inspect(project: &Project, options: &ScanOptions) -> Result<Vec<Match>, ScanError> {
    let temp = TempDir::with_prefix("findlib-")
        .map_err(|source| ScanError::TempDir { source })?;

    tracing::debug!(
        project = %project.name,
        dir = %temp.path().display(),
        "inspecting"
    );

    let workspace = Workspace::init(temp.path(), &project.clone_url)?;
    workspace.fetch_default_branch()?;
    let files = workspace.list_files()?;

    let mut matches = Vec::new();
    for file in select_files(&files, &options.filename) {
        if let Err(e) = workspace.checkout_file(file) {
            tracing::debug!(project = %project.name, file, error = %e, "skipping file");
            continue;
        }
        let Some(bytes) = read_bytes(&workspace.dir().join(file)) else {
            continue;
        };
        let content = decode_text(&bytes);
        matches.extend(find_matches(file, &content, &options.library));
    }

    Ok(matches)
}

/// Keep paths whose name ends in `filename`, at any depth
pub fn select_files<'a>(paths: &'a [String], filename: &str) -> Vec<&'a str> {
    paths
        .iter()
        .map(String::as_str)
        .filter(|p| p.ends_with(filename))
        .collect()
}

/// Decode file content as UTF-8 (dropping a leading BOM), falling back to Latin-1
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.strip_prefix('\u{feff}').unwrap_or(text).to_string(),
        // Latin-1 maps each byte to the code point of the same value
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Split text into lines on `\n`, `\r\n` or a lone `\r`
///
/// `\r\n` yields an extra empty piece, which callers drop after trimming.
pub fn split_lines(content: &str) -> impl Iterator<Item = &str> {
    content.split(['\r', '\n'])
}

/// Find lines whose trimmed text starts with `library`
///
/// This is a plain prefix test: `mylib-extra==1.0` matches `mylib`.
pub fn find_matches(file: &str, content: &str, library: &str) -> Vec<Match> {
    split_lines(content)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| line.starts_with(library))
        .map(|line| Match {
            file: file.to_string(),
            line: line.to_string(),
        })
        .collect()
}

fn read_bytes(path: &Path) -> Option<Vec<u8>> {
    std::fs::read(path).ok()
}
