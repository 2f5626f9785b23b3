// src/config.rs
//! Configuration file parsing
//!
//! Supports TOML configuration files with the following sections:
//! - [server] - Bind address and CORS origins
//! - [storage] - Database location
//! - [ci] - Pipeline toolchain, instrumentation and coverage settings
//!
//! Every key is optional; a missing file section falls back to defaults.

use crate::ci::PipelineConfig;
use crate::db::paths::DEFAULT_DB_PATH;
use crate::server::ServerConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecipeBookConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub storage: StorageSection,

    #[serde(default)]
    pub ci: CiSection,
}

/// Server configuration section
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// HTTP bind address
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Allowed CORS origins (empty = any origin)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

/// Storage configuration section
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageSection {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}

/// CI pipeline section
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CiSection {
    pub project_dir: Option<PathBuf>,
    pub toolchain: Option<String>,
    pub llvm_component: Option<String>,
    pub rustflags: Option<String>,
    pub profile_pattern: Option<String>,
    /// Credentials file; a leading `~/` expands to the home directory
    pub credentials: Option<String>,
    pub coverage_report: Option<PathBuf>,
    pub uploader_url: Option<String>,
}

impl RecipeBookConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: RecipeBookConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.server
            .bind
            .parse::<SocketAddr>()
            .with_context(|| format!("Invalid server.bind address: {}", self.server.bind))?;

        if self.storage.db_path.as_os_str().is_empty() {
            anyhow::bail!("storage.db_path must not be empty");
        }

        if let Some(ref toolchain) = self.ci.toolchain {
            if toolchain.trim().is_empty() {
                anyhow::bail!("ci.toolchain must not be empty");
            }
        }

        if let Some(ref pattern) = self.ci.profile_pattern {
            if !pattern.contains("%p") && !pattern.contains("%m") {
                anyhow::bail!(
                    "ci.profile_pattern must contain %p or %m, got '{}'",
                    pattern
                );
            }
        }

        Ok(())
    }

    /// Convert to the server's runtime configuration
    pub fn to_server_config(&self) -> Result<ServerConfig> {
        let bind_addr = self
            .server
            .bind
            .parse()
            .with_context(|| format!("Invalid server.bind address: {}", self.server.bind))?;

        Ok(ServerConfig {
            bind_addr,
            db_path: self.storage.db_path.clone(),
            cors_allowed_origins: self.server.cors_origins.clone(),
        })
    }

    /// Convert to the pipeline configuration, filling unset keys with defaults
    pub fn to_pipeline_config(&self) -> PipelineConfig {
        let defaults = PipelineConfig::default();
        let ci = &self.ci;

        PipelineConfig {
            project_dir: ci.project_dir.clone().unwrap_or(defaults.project_dir),
            toolchain: ci.toolchain.clone().unwrap_or(defaults.toolchain),
            llvm_component: ci.llvm_component.clone().unwrap_or(defaults.llvm_component),
            rustflags: ci.rustflags.clone().unwrap_or(defaults.rustflags),
            profile_pattern: ci.profile_pattern.clone().unwrap_or(defaults.profile_pattern),
            credentials_path: ci
                .credentials
                .as_deref()
                .map(expand_home)
                .unwrap_or(defaults.credentials_path),
            coverage_report: ci.coverage_report.clone().unwrap_or(defaults.coverage_report),
            uploader_url: ci.uploader_url.clone().unwrap_or(defaults.uploader_url),
        }
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        (None, Some(home)) if path == "~" => home,
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RecipeBookConfig::default();
        assert!(config.validate().is_ok());

        let server = config.to_server_config().unwrap();
        assert_eq!(server.bind_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(server.db_path, PathBuf::from("data/recipes.db"));

        assert_eq!(config.to_pipeline_config(), PipelineConfig::default());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[server]
bind = "0.0.0.0:9000"
cors_origins = ["https://recipes.example"]

[storage]
db_path = "/var/lib/recipe-book/recipes.db"

[ci]
project_dir = "recipe-book-backend"
toolchain = "nightly-2024-06-01"
credentials = "/etc/ci/code-cov"
"#;
        let config: RecipeBookConfig = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_ok());

        let server = config.to_server_config().unwrap();
        assert_eq!(server.bind_addr.port(), 9000);
        assert_eq!(server.cors_allowed_origins, vec!["https://recipes.example"]);

        let pipeline = config.to_pipeline_config();
        assert_eq!(pipeline.project_dir, PathBuf::from("recipe-book-backend"));
        assert_eq!(pipeline.toolchain, "nightly-2024-06-01");
        assert_eq!(pipeline.credentials_path, PathBuf::from("/etc/ci/code-cov"));
        assert_eq!(pipeline.llvm_component, "llvm-tools-preview");
    }

    #[test]
    fn test_invalid_bind() {
        let config: RecipeBookConfig = toml::from_str("[server]\nbind = \"nowhere\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_profile_pattern_needs_placeholder() {
        let config: RecipeBookConfig =
            toml::from_str("[ci]\nprofile_pattern = \"coverage.profraw\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(toml::from_str::<RecipeBookConfig>("[federation]\nenabled = true\n").is_err());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let typo = "[ci]\ncredential = \"/etc/ci/code-cov\"\n";
        assert!(toml::from_str::<RecipeBookConfig>(typo).is_err());
        assert!(toml::from_str::<RecipeBookConfig>("[server]\nport = 80\n").is_err());
        assert!(toml::from_str::<RecipeBookConfig>("[storage]\npath = \"r.db\"\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("recipe-book.toml");
        std::fs::write(&path, "[storage]\ndb_path = \"r.db\"\n").unwrap();

        let config = RecipeBookConfig::load(&path).unwrap();
        assert_eq!(config.storage.db_path, PathBuf::from("r.db"));
        assert!(RecipeBookConfig::load(&temp_dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/.code-cov"), home.join(".code-cov"));
        }
    }
}
