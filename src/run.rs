//! Run orchestration
//!
//! Previews every discovered project, then inspects the non-excluded ones one
//! at a time in discovery order. A project with no matching lines is appended
//! to the exclusion file, including when it could not be inspected at all.

use crate::exclusions::{ExclusionError, ExclusionList};
use crate::output::{self, ProjectReport, RunReport, Status};
use crate::project::Project;
use crate::scan::{Match, ScanError};
use std::io::{self, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Exclusion(#[from] ExclusionError),

    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Outcome of inspecting one project
#[derive(Debug)]
pub enum Inspection {
    Found(Vec<Match>),
    NotFound,
    /// The repository could not be fetched or listed
    Failed(ScanError),
}

impl From<Result<Vec<Match>, ScanError>> for Inspection {
    fn from(result: Result<Vec<Match>, ScanError>) -> Self {
        match result {
            Ok(matches) if matches.is_empty() => Inspection::NotFound,
            Ok(matches) => Inspection::Found(matches),
            Err(e) => Inspection::Failed(e),
        }
    }
}

/// How results are rendered and persisted
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub json: bool,
    pub dry_run: bool,
}

/// Inspect every non-excluded project and record the ones lacking the library
///
/// `inspect` is called once per non-excluded project, strictly in order.
pub fn run<W, F>(
    projects: &[Project],
    exclusions: &ExclusionList,
    mut inspect: F,
    options: RunOptions,
    out: &mut W,
) -> Result<RunReport, RunError>
where
    W: Write,
    F: FnMut(&Project) -> Result<Vec<Match>, ScanError>,
{
    let is_skipped = |project: &Project| exclusions.contains(&project.name);

    if !options.json {
        output::write_preview(out, projects, is_skipped)?;
    }

    let mut reports = Vec::with_capacity(projects.len());

    for project in projects {
        if is_skipped(project) {
            tracing::debug!(project = %project.name, "skipping excluded project");
            reports.push(ProjectReport::new(project, Status::Skipped));
            continue;
        }

        let report = match Inspection::from(inspect(project)) {
            Inspection::Found(matches) => {
                tracing::info!(project = %project.name, count = matches.len(), "library found");
                if !options.json {
                    output::write_found(out, &project.name, &matches)?;
                }
                ProjectReport::new(project, Status::Found).with_matches(matches)
            }
            Inspection::NotFound => {
                record_not_found(project, exclusions, options, out)?;
                ProjectReport::new(project, Status::NotFound)
            }
            Inspection::Failed(e) => {
                tracing::warn!(project = %project.name, error = %e, "inspection failed");
                record_not_found(project, exclusions, options, out)?;
                ProjectReport::new(project, Status::Failed).with_error(e.to_string())
            }
        };
        reports.push(report);
    }

    let report = RunReport {
        projects: reports,
        dry_run: options.dry_run,
    };

    if options.json {
        output::write_json(out, &report)?;
    }

    Ok(report)
}

fn record_not_found<W: Write>(
    project: &Project,
    exclusions: &ExclusionList,
    options: RunOptions,
    out: &mut W,
) -> Result<(), RunError> {
    if !options.json {
        output::write_not_found(out, &project.name, exclusions.path(), options.dry_run)?;
    }
    if !options.dry_run {
        exclusions.append(&project.name)?;
    }
    Ok(())
}
