//! Project references discovered in a group

use std::path::Path;

/// A repository to inspect: where to clone it from and what to call it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub clone_url: String,
    pub name: String,
}

impl Project {
    pub fn new(clone_url: impl Into<String>) -> Self {
        let clone_url = clone_url.into();
        let name = short_name(&clone_url);
        Self { clone_url, name }
    }
}

/// Derive a project's short name from its clone address
///
/// Takes the final path segment and strips its extension:
/// - "git@gitlab.example.com:team/api.git" -> "api"
/// - "https://gitlab.example.com/team/sub/web.git" -> "web"
/// - "/srv/repos/tools" -> "tools"
pub fn short_name(clone_url: &str) -> String {
    let trimmed = clone_url.trim_end_matches('/');
    Path::new(trimmed)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| trimmed.to_string())
}
