//! GitLab group project discovery
//!
//! Lists every project under a group (subgroups included) through
//! `GET /api/v4/groups/:id/projects`, one fixed-size page at a time, until a
//! page comes back empty. Any non-success page aborts discovery.

use crate::config::Protocol;
use crate::project::Project;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Projects requested per page
pub const PAGE_SIZE: u32 = 100;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("GitLab returned HTTP {status} for page {page} of group '{group}'")]
    Status { group: String, page: u32, status: u16 },

    #[error("Failed to fetch page {page} from GitLab: {message}")]
    Request { page: u32, message: String },

    #[error("Failed to parse GitLab response for page {page}: {message}")]
    Parse { page: u32, message: String },
}

/// Fields of a project entry that discovery cares about
///
/// Only the address for the selected protocol is required.
#[derive(Debug, Deserialize)]
struct ProjectEntry {
    ssh_url_to_repo: Option<String>,
    http_url_to_repo: Option<String>,
}

/// Client for one group on one GitLab instance
pub struct GroupClient {
    agent: ureq::Agent,
    base_url: String,
    group: String,
    token: String,
    protocol: Protocol,
}

impl GroupClient {
    pub fn new(
        base_url: &str,
        group: &str,
        token: &str,
        protocol: Protocol,
        timeout: Duration,
    ) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            group: group.to_string(),
            token: token.to_string(),
            protocol,
        }
    }

    /// Discover all projects in the group, in page order
    pub fn discover(&self) -> Result<Vec<Project>, DiscoveryError> {
        let urls = collect_pages(|page| self.fetch_page(page))?;
        Ok(urls.into_iter().map(Project::new).collect())
    }

    fn projects_url(&self) -> String {
        format!(
            "{}/api/v4/groups/{}/projects",
            self.base_url,
            encode_group(&self.group)
        )
    }

    /// Fetch one page and return its clone addresses
    fn fetch_page(&self, page: u32) -> Result<Vec<String>, DiscoveryError> {
        tracing::debug!(group = %self.group, page, "fetching project page");

        let response = self
            .agent
            .get(&self.projects_url())
            .header("PRIVATE-TOKEN", &self.token)
            .query("per_page", PAGE_SIZE.to_string())
            .query("page", page.to_string())
            .query("include_subgroups", "true")
            .call()
            .map_err(|e| match e {
                ureq::Error::StatusCode(status) => DiscoveryError::Status {
                    group: self.group.clone(),
                    page,
                    status,
                },
                other => DiscoveryError::Request {
                    page,
                    message: other.to_string(),
                },
            })?;

        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| DiscoveryError::Request {
                page,
                message: e.to_string(),
            })?;

        parse_page(&body, self.protocol).map_err(|message| DiscoveryError::Parse { page, message })
    }
}

/// Request pages 1, 2, ... until one comes back empty, concatenating results
pub fn collect_pages<F, E>(mut fetch: F) -> Result<Vec<String>, E>
where
    F: FnMut(u32) -> Result<Vec<String>, E>,
{
    let mut all = Vec::new();
    let mut page = 1;
    loop {
        let entries = fetch(page)?;
        if entries.is_empty() {
            break;
        }
        all.extend(entries);
        page += 1;
    }
    Ok(all)
}

fn parse_page(body: &str, protocol: Protocol) -> Result<Vec<String>, String> {
    let entries: Vec<ProjectEntry> = serde_json::from_str(body).map_err(|e| e.to_string())?;
    entries
        .into_iter()
        .map(|entry| {
            let (url, field) = match protocol {
                Protocol::Ssh => (entry.ssh_url_to_repo, "ssh_url_to_repo"),
                Protocol::Http => (entry.http_url_to_repo, "http_url_to_repo"),
            };
            url.ok_or_else(|| format!("project entry is missing `{}`", field))
        })
        .collect()
}

/// Percent-encode a group path for use as a single URL path segment
///
/// Nested groups are addressed as `parent%2Fchild`.
fn encode_group(group: &str) -> String {
    let mut encoded = String::with_capacity(group.len());
    for byte in group.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
