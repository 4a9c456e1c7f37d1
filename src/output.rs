//! Output formatting for JSON and text modes
//!
//! Text mode streams a preview of all projects followed by per-project
//! results. JSON mode collects everything into a single `RunReport`.

use crate::project::Project;
use crate::scan::Match;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

/// Final state of one project in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Skipped,
    Found,
    NotFound,
    Failed,
}

/// One project in the JSON report
#[derive(Debug, Serialize)]
pub struct ProjectReport {
    pub name: String,
    pub clone_url: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<Match>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProjectReport {
    pub fn new(project: &Project, status: Status) -> Self {
        Self {
            name: project.name.clone(),
            clone_url: project.clone_url.clone(),
            status,
            matches: Vec::new(),
            error: None,
        }
    }

    pub fn with_matches(mut self, matches: Vec<Match>) -> Self {
        self.matches = matches;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Result of a whole run
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub projects: Vec<ProjectReport>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
}

/// Print the list of projects and whether each will be skipped
pub fn write_preview<W: Write>(
    out: &mut W,
    projects: &[Project],
    is_skipped: impl Fn(&Project) -> bool,
) -> io::Result<()> {
    writeln!(out, "Checking projects (skipping excluded ones):")?;
    for project in projects {
        if is_skipped(project) {
            writeln!(out, " - {} (skipped)", project.name)?;
        } else {
            writeln!(out, " - {}", project.name)?;
        }
    }
    writeln!(out, "\nResults:")
}

pub fn write_found<W: Write>(out: &mut W, name: &str, matches: &[Match]) -> io::Result<()> {
    writeln!(out, "{}:", name)?;
    for m in matches {
        writeln!(out, "  {}", m)?;
    }
    Ok(())
}

pub fn write_not_found<W: Write>(
    out: &mut W,
    name: &str,
    exclude_file: &Path,
    dry_run: bool,
) -> io::Result<()> {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    writeln!(
        out,
        "{}{}: not found → adding to {}",
        prefix,
        name,
        exclude_file.display()
    )
}

pub fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(out, "{}", json)
}
