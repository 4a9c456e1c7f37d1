//! Git operations for inspecting a remote's default branch
//!
//! Instead of a full clone, a repository is inspected by:
//! 1. `git init` in an empty directory
//! 2. `git remote add origin <url>`
//! 3. `git fetch --depth 1 origin HEAD:refs/remotes/origin/HEAD`
//! 4. `git ls-tree -r --name-only origin/HEAD`
//! 5. `git checkout origin/HEAD -- <path>` for each file of interest

use std::path::Path;
use std::process::{Command, Output, Stdio};
use thiserror::Error;

/// Ref the default branch is fetched into
pub const FETCHED_REF: &str = "origin/HEAD";

/// ssh invocation used unless the caller set `GIT_SSH_COMMAND`
const BATCH_SSH_COMMAND: &str = "ssh -o BatchMode=yes";

#[derive(Error, Debug)]
pub enum GitError {
    #[error("git {step} failed: {message}")]
    CommandFailed { step: &'static str, message: String },

    #[error("Failed to execute git: {source}")]
    Exec { source: std::io::Error },
}

/// A scratch repository rooted at a working directory
pub struct Workspace<'a> {
    dir: &'a Path,
}

impl<'a> Workspace<'a> {
    /// Initialize an empty repository in `dir` and register `repo_url` as origin
    pub fn init(dir: &'a Path, repo_url: &str) -> Result<Self, GitError> {
        let workspace = Self { dir };
        workspace.run("init", &["init", "--quiet"])?;
        workspace.run("remote add", &["remote", "add", "origin", repo_url])?;
        Ok(workspace)
    }

    pub fn dir(&self) -> &Path {
        self.dir
    }

    /// Shallow-fetch the remote's default branch
    pub fn fetch_default_branch(&self) -> Result<(), GitError> {
        self.run(
            "fetch",
            &[
                "fetch",
                "--quiet",
                "--depth",
                "1",
                "origin",
                "HEAD:refs/remotes/origin/HEAD",
            ],
        )?;
        Ok(())
    }

    /// List every tracked file path at the fetched ref
    pub fn list_files(&self) -> Result<Vec<String>, GitError> {
        let output = self.run("ls-tree", &["ls-tree", "-r", "--name-only", FETCHED_REF])?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Materialize a single path from the fetched ref into the working tree
    pub fn checkout_file(&self, path: &str) -> Result<(), GitError> {
        self.run("checkout", &["checkout", FETCHED_REF, "--", path])?;
        Ok(())
    }

    /// Build a non-interactive git command in the workspace
    ///
    /// ssh prompts read from the tty, so BatchMode is forced for ssh remotes
    /// unless `GIT_SSH_COMMAND` is already set.
    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new("git");
        command
            .args(args)
            .current_dir(self.dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null());
        if std::env::var_os("GIT_SSH_COMMAND").is_none() {
            command.env("GIT_SSH_COMMAND", BATCH_SSH_COMMAND);
        }
        command
    }

    fn run(&self, step: &'static str, args: &[&str]) -> Result<Output, GitError> {
        tracing::trace!(dir = %self.dir.display(), ?args, "running git");

        let output = self
            .command(args)
            .output()
            .map_err(|source| GitError::Exec { source })?;

        if output.status.success() {
            Ok(output)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(GitError::CommandFailed {
                step,
                message: stderr.trim().to_string(),
            })
        }
    }
}
