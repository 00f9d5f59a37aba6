use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::paths;
use crate::transform::Promotion;
use crate::utils::io;

/// Root configuration structure for config.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReleaseConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// All configurable defaults that can be overridden via config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default = "default_gitlab")]
    pub gitlab: GitLabConfig,

    #[serde(default = "default_git")]
    pub git: GitConfig,

    /// Repositories receiving stage and edge bundle promotions
    #[serde(default = "default_bundles_repo")]
    pub bundles_repo: RepoPair,

    /// Repository receiving stable image set promotions
    #[serde(default = "default_tenants_repo")]
    pub tenants_repo: RepoPair,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            gitlab: default_gitlab(),
            git: default_git(),
            bundles_repo: default_bundles_repo(),
            tenants_repo: default_tenants_repo(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitLabConfig {
    pub url: String,
    #[serde(default = "default_api_path")]
    pub api_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    #[serde(default = "default_main_branch")]
    pub main_branch: String,
    #[serde(default = "default_fork_remote")]
    pub fork_remote: String,
    #[serde(default = "default_author")]
    pub author: CommitAuthor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

/// Origin and fork project paths (e.g. `service/managed-tenants`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoPair {
    /// Short name used for scratch clone directories
    pub name: String,
    pub origin: String,
    pub fork: String,
}

impl Defaults {
    pub fn repo_for(&self, promotion: Promotion) -> &RepoPair {
        match promotion {
            Promotion::Stage | Promotion::Edge => &self.bundles_repo,
            Promotion::Stable => &self.tenants_repo,
        }
    }

    /// Clone URL for a project path on the configured GitLab instance.
    pub fn project_url(&self, project: &str) -> String {
        format!("{}/{}", self.gitlab.url.trim_end_matches('/'), project)
    }

    pub fn api_base(&self) -> String {
        format!(
            "{}/{}",
            self.gitlab.url.trim_end_matches('/'),
            self.gitlab.api_path.trim_matches('/')
        )
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_gitlab() -> GitLabConfig {
    GitLabConfig {
        url: "https://gitlab.cee.redhat.com".to_string(),
        api_path: default_api_path(),
    }
}

fn default_api_path() -> String {
    "api/v4".to_string()
}

fn default_git() -> GitConfig {
    GitConfig {
        main_branch: default_main_branch(),
        fork_remote: default_fork_remote(),
        author: default_author(),
    }
}

fn default_main_branch() -> String {
    "main".to_string()
}

fn default_fork_remote() -> String {
    "fork".to_string()
}

fn default_author() -> CommitAuthor {
    CommitAuthor {
        name: "Delorean".to_string(),
        email: "cloud-services-delorean@redhat.com".to_string(),
    }
}

fn default_bundles_repo() -> RepoPair {
    RepoPair {
        name: "managed-tenants-bundles".to_string(),
        origin: "service/managed-tenants-bundles".to_string(),
        fork: "integreatly-qe/managed-tenants-bundles".to_string(),
    }
}

fn default_tenants_repo() -> RepoPair {
    RepoPair {
        name: "managed-tenants".to_string(),
        origin: "service/managed-tenants".to_string(),
        fork: "integreatly-qe/managed-tenants".to_string(),
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Load defaults from the global config.json; a missing file yields built-in defaults.
pub fn load_defaults() -> Result<Defaults> {
    let path = paths::config_json()?;
    Ok(load_config_from(&path)?.defaults)
}

pub fn load_config_from(path: &Path) -> Result<ReleaseConfig> {
    if !path.exists() {
        return Ok(ReleaseConfig::default());
    }

    let content = io::read_file(path, "read config.json")?;
    serde_json::from_str(&content)
        .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.defaults.git.main_branch, "main");
        assert_eq!(config.defaults.git.fork_remote, "fork");
        assert_eq!(config.defaults.git.author.name, "Delorean");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"defaults": {"gitlab": {"url": "https://gitlab.example.com/"}}}"#,
        )
        .unwrap();

        let defaults = load_config_from(&path).unwrap().defaults;
        assert_eq!(defaults.api_base(), "https://gitlab.example.com/api/v4");
        assert_eq!(
            defaults.project_url("service/managed-tenants"),
            "https://gitlab.example.com/service/managed-tenants"
        );
        assert_eq!(defaults.tenants_repo.origin, "service/managed-tenants");
    }

    #[test]
    fn invalid_json_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_json");
    }

    #[test]
    fn stable_targets_tenants_repo() {
        let defaults = Defaults::default();
        assert_eq!(
            defaults.repo_for(Promotion::Stable).origin,
            "service/managed-tenants"
        );
        assert_eq!(
            defaults.repo_for(Promotion::Edge).origin,
            "service/managed-tenants-bundles"
        );
    }
}
