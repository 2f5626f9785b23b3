// src/ci/env.rs

//! Environment handed to the coverage uploader
//!
//! Two sources feed the uploader: identifiers exported by the CI runner
//! (`JOB_URL`, `JOB_ID`, `GITHUB_REF`, `GITHUB_PR_NUMBER`), renamed to the
//! variables the uploader understands, and the credentials file, a shell
//! fragment of `KEY=VALUE` assignments.

use std::path::Path;
use tracing::{debug, warn};

/// Identifiers of the current CI job, as exported by the runner
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiEnvironment {
    /// `JOB_URL`
    pub job_url: Option<String>,
    /// `JOB_ID`
    pub job_id: Option<String>,
    /// `GITHUB_REF`
    pub branch: Option<String>,
    /// `GITHUB_PR_NUMBER`
    pub pull_request: Option<String>,
}

impl CiEnvironment {
    /// Read identifiers from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read identifiers through an arbitrary lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());
        Self {
            job_url: get("JOB_URL"),
            job_id: get("JOB_ID"),
            branch: get("GITHUB_REF"),
            pull_request: get("GITHUB_PR_NUMBER"),
        }
    }

    /// Variables for the uploader; unset identifiers are left out entirely
    pub fn uploader_vars(&self) -> Vec<(String, String)> {
        let mapping = [
            ("CI_BUILD_URL", &self.job_url),
            ("CI_BUILD_ID", &self.job_id),
            ("CI_JOB_ID", &self.job_id),
            ("VCS_BRANCH_NAME", &self.branch),
            ("VCS_PULL_REQUEST", &self.pull_request),
        ];

        mapping
            .into_iter()
            .filter_map(|(name, value)| value.as_ref().map(|v| (name.to_string(), v.clone())))
            .collect()
    }
}

/// Variables exported by the coverage credentials file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub vars: Vec<(String, String)>,
}

impl Credentials {
    /// Load the credentials file, or None if it is missing or unreadable
    ///
    /// An unreadable file only disables the upload; it never fails the task.
    pub fn load(path: &Path) -> Option<Self> {
        if !path.is_file() {
            debug!("No credentials file at {}", path.display());
            return None;
        }

        match std::fs::read(path) {
            Ok(bytes) => Some(Self::parse(&String::from_utf8_lossy(&bytes))),
            Err(e) => {
                warn!("Cannot read credentials file {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Parse `KEY=VALUE` lines; `export` prefixes, comments and quotes are accepted
    pub fn parse(content: &str) -> Self {
        let vars = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let line = line.strip_prefix("export ").unwrap_or(line).trim_start();
                let (key, value) = line.split_once('=')?;
                let key = key.trim();
                if !is_valid_name(key) {
                    return None;
                }
                Some((key.to_string(), shell_value(value.trim()).to_string()))
            })
            .collect();

        Self { vars }
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// The value a shell assignment would produce, minus any trailing comment
fn shell_value(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(rest) = value.strip_prefix(quote) {
            if let Some(end) = rest.find(quote) {
                return &rest[..end];
            }
        }
    }

    let end = value
        .char_indices()
        .find(|&(i, c)| c == '#' && i > 0 && value[..i].ends_with(char::is_whitespace))
        .map_or(value.len(), |(i, _)| i);
    value[..end].trim_end()
}
