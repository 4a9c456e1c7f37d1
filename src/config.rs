//! Configuration for findlib
//!
//! Settings come from, highest priority first: CLI flags, `FINDLIB_*`
//! environment variables, a JSON config file, then built-in defaults.
//! The config file defaults to `~/.config/findlib/config.json`:
//!
//! ```json
//! {
//!   "gitlab_url": "https://gitlab.example.com",
//!   "group": "platform/backend",
//!   "token": "glpat-...",
//!   "library": "mylib",
//!   "exclude_file": "excluded_projects.txt",
//!   "protocol": "ssh",
//!   "requirements_file": "requirements.txt",
//!   "timeout_secs": 30
//! }
//! ```

use crate::cli::Cli;
use crate::scan::REQUIREMENTS_FILENAME;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default exclusion file, relative to the working directory
pub const DEFAULT_EXCLUDE_FILE: &str = "excluded_projects.txt";

/// Default HTTP timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Missing {setting}. Pass --{flag} or set {env}.")]
    Missing {
        setting: &'static str,
        flag: &'static str,
        env: &'static str,
    },
}

/// Which clone address to take from a GitLab project entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// `ssh_url_to_repo`
    #[default]
    Ssh,
    /// `http_url_to_repo`
    Http,
}

/// Contents of the config file; every field is optional
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FileConfig {
    pub gitlab_url: Option<String>,
    pub group: Option<String>,
    pub token: Option<String>,
    pub library: Option<String>,
    pub exclude_file: Option<PathBuf>,
    pub protocol: Option<Protocol>,
    pub requirements_file: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Load the config file
    ///
    /// An explicit path must exist. The default path is optional.
    pub fn load(explicit: Option<&PathBuf>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.clone(),
            None => match config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(FileConfig::default()),
            },
        };

        tracing::debug!(path = %path.display(), "loading config file");

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadError {
            path: path.clone(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::ParseError { path, source })
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub gitlab_url: String,
    pub group: String,
    pub token: String,
    pub library: String,
    pub exclude_file: PathBuf,
    pub protocol: Protocol,
    pub requirements_file: String,
    pub timeout: Duration,
    pub json: bool,
    pub dry_run: bool,
}

impl Settings {
    /// Merge CLI arguments over the config file and defaults
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let gitlab_url = required(
            cli.gitlab_url.clone().or(file.gitlab_url),
            "GitLab URL",
            "url",
            "FINDLIB_GITLAB_URL",
        )?;
        let group = required(
            cli.group.clone().or(file.group),
            "group",
            "group",
            "FINDLIB_GROUP",
        )?;
        let token = required(
            cli.token.clone().or(file.token),
            "token",
            "token",
            "FINDLIB_TOKEN",
        )?;
        let library = required(
            cli.library.clone().or(file.library),
            "library",
            "library",
            "FINDLIB_LIBRARY",
        )?;

        Ok(Settings {
            gitlab_url: gitlab_url.trim_end_matches('/').to_string(),
            group,
            token,
            library,
            exclude_file: cli
                .exclude_file
                .clone()
                .or(file.exclude_file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EXCLUDE_FILE)),
            protocol: cli.protocol.or(file.protocol).unwrap_or_default(),
            requirements_file: cli
                .requirements_file
                .clone()
                .or(file.requirements_file)
                .unwrap_or_else(|| REQUIREMENTS_FILENAME.to_string()),
            timeout: Duration::from_secs(
                cli.timeout
                    .or(file.timeout_secs)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            json: cli.json,
            dry_run: cli.dry_run,
        })
    }
}

fn required(
    value: Option<String>,
    setting: &'static str,
    flag: &'static str,
    env: &'static str,
) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing { setting, flag, env })
}

/// Returns the default config file path: `~/.config/findlib/config.json`
pub fn config_path() -> Option<PathBuf> {
    // Use XDG_CONFIG_HOME if set, otherwise fall back to ~/.config
    let config_base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .ok()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;

    Some(config_base.join("findlib").join("config.json"))
}
