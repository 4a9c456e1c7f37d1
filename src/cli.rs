use crate::config::Protocol;
use clap::Parser;
use std::path::PathBuf;

/// CLI tool that finds which projects in a GitLab group declare a Python library
///
/// Projects whose requirements files don't mention the library are appended
/// to an exclusion file and skipped on later runs.
#[derive(Parser, Debug, Default)]
#[command(name = "findlib")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Library name to look for (matched as a line prefix)
    #[arg(short, long, env = "FINDLIB_LIBRARY")]
    pub library: Option<String>,

    /// GitLab base URL, e.g. https://gitlab.example.com
    #[arg(long = "url", env = "FINDLIB_GITLAB_URL")]
    pub gitlab_url: Option<String>,

    /// Group path or id to search (subgroups included)
    #[arg(short, long, env = "FINDLIB_GROUP")]
    pub group: Option<String>,

    /// Personal access token sent as PRIVATE-TOKEN
    #[arg(long, env = "FINDLIB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// File listing projects to skip; not-found projects are appended to it
    #[arg(short, long, env = "FINDLIB_EXCLUDE_FILE")]
    pub exclude_file: Option<PathBuf>,

    /// Clone address to use from the GitLab API
    #[arg(long, value_enum)]
    pub protocol: Option<Protocol>,

    /// Suffix of files to scan
    #[arg(long)]
    pub requirements_file: Option<String>,

    /// HTTP timeout for GitLab requests, in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Path to a JSON config file (default: ~/.config/findlib/config.json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Inspect without appending to the exclusion file
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}
