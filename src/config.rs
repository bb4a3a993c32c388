//! Runtime configuration.
//!
//! A single immutable [`Config`] value is constructed once at startup from
//! command-line flags, an optional XDG YAML config file, and the
//! `GITHUB_TOKEN` environment fallback, then passed explicitly to every
//! component. Flags always win over the file; the file wins over the
//! environment only for the fields it sets.

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::client::DEFAULT_API_ROOT;
use crate::error::Error;

/// Optional on-disk defaults (XDG config file).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    /// GitHub API token.
    pub token: Option<String>,

    /// GitHub Enterprise base URL.
    pub url: Option<String>,

    /// Organizations to include in every run.
    #[serde(default)]
    pub orgs: Vec<String>,

    /// Emit structured JSON output by default.
    pub json: Option<bool>,
}

impl FileConfig {
    /// Load defaults from a specific file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load the default config file if it exists, otherwise empty defaults.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// The default configuration file path (XDG compliant).
    pub fn default_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join("repowarden").join("config.yml"))
    }
}

/// Command-line inputs that participate in config resolution.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub token: Option<String>,
    pub url: Option<String>,
    pub orgs: Vec<String>,
    pub nouser: bool,
    pub repo: Option<String>,
    pub dry_run: bool,
    pub json: bool,
}

/// Fully resolved, process-wide, read-only configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// GitHub API token.
    pub token: String,

    /// GitHub Enterprise base URL, if any.
    pub enterprise_url: Option<String>,

    /// Organizations whose repositories are in scope.
    pub orgs: Vec<String>,

    /// Whether the current user's own repositories are in scope.
    pub include_user: bool,

    /// Optional single-repository target as `owner/name`.
    pub repo: Option<String>,

    /// Report decisions without issuing mutations.
    pub dry_run: bool,

    /// Emit structured JSON instead of human-readable blocks.
    pub json: bool,
}

impl Config {
    /// Resolve the runtime configuration from CLI flags, file defaults, and
    /// the environment. Fails before any remote call on an empty token or an
    /// empty target set.
    pub fn resolve(cli: CliOverrides, file: FileConfig) -> Result<Self, Error> {
        let token = cli
            .token
            .or(file.token)
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .unwrap_or_default();

        if token.is_empty() {
            return Err(Error::InvalidArgument(
                "GitHub token cannot be empty (use --token or GITHUB_TOKEN)".to_string(),
            ));
        }

        let mut orgs = file.orgs;
        orgs.extend(cli.orgs);

        let include_user = !cli.nouser;
        if !include_user && orgs.is_empty() && cli.repo.is_none() {
            return Err(Error::InvalidArgument(
                "no organizations provided".to_string(),
            ));
        }

        Ok(Self {
            token,
            enterprise_url: cli.url.or(file.url),
            orgs,
            include_user,
            repo: cli.repo,
            dry_run: cli.dry_run,
            json: cli.json || file.json.unwrap_or(false),
        })
    }

    /// The API root derived from the enterprise URL, or the public API.
    pub fn api_root(&self) -> String {
        match &self.enterprise_url {
            Some(url) => format!("{}/api/v3", url.trim_end_matches('/')),
            None => DEFAULT_API_ROOT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serial_test::serial;
    use std::env;
    use tempfile::TempDir;

    fn cli_with_token() -> CliOverrides {
        CliOverrides {
            token: Some("ghp_test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    #[serial]
    fn resolve_requires_a_token() {
        env::remove_var("GITHUB_TOKEN");
        let result = Config::resolve(CliOverrides::default(), FileConfig::default());
        assert_matches!(result, Err(Error::InvalidArgument(_)));
    }

    #[test]
    #[serial]
    fn resolve_falls_back_to_env_token() {
        env::set_var("GITHUB_TOKEN", "ghp_from_env");
        let config = Config::resolve(CliOverrides::default(), FileConfig::default()).unwrap();
        assert_eq!(config.token, "ghp_from_env");
        env::remove_var("GITHUB_TOKEN");
    }

    #[test]
    #[serial]
    fn flag_token_wins_over_file_and_env() {
        env::set_var("GITHUB_TOKEN", "ghp_from_env");
        let file = FileConfig {
            token: Some("ghp_from_file".to_string()),
            ..Default::default()
        };
        let config = Config::resolve(cli_with_token(), file).unwrap();
        assert_eq!(config.token, "ghp_test");
        env::remove_var("GITHUB_TOKEN");
    }

    #[test]
    #[serial]
    fn nouser_without_orgs_is_rejected() {
        let cli = CliOverrides {
            nouser: true,
            ..cli_with_token()
        };
        assert_matches!(
            Config::resolve(cli, FileConfig::default()),
            Err(Error::InvalidArgument(_))
        );
    }

    #[test]
    #[serial]
    fn nouser_with_single_repo_is_allowed() {
        let cli = CliOverrides {
            nouser: true,
            repo: Some("octo/widget".to_string()),
            ..cli_with_token()
        };
        let config = Config::resolve(cli, FileConfig::default()).unwrap();
        assert!(!config.include_user);
        assert_eq!(config.repo.as_deref(), Some("octo/widget"));
    }

    #[test]
    #[serial]
    fn file_orgs_merge_with_flag_orgs() {
        let file = FileConfig {
            orgs: vec!["acme".to_string()],
            ..Default::default()
        };
        let cli = CliOverrides {
            orgs: vec!["initech".to_string()],
            ..cli_with_token()
        };
        let config = Config::resolve(cli, file).unwrap();
        assert_eq!(config.orgs, vec!["acme", "initech"]);
    }

    #[test]
    #[serial]
    fn api_root_for_enterprise_url() {
        let cli = CliOverrides {
            url: Some("https://ghe.example.com/".to_string()),
            ..cli_with_token()
        };
        let config = Config::resolve(cli, FileConfig::default()).unwrap();
        assert_eq!(config.api_root(), "https://ghe.example.com/api/v3");
    }

    #[test]
    #[serial]
    fn api_root_defaults_to_public_api() {
        let config = Config::resolve(cli_with_token(), FileConfig::default()).unwrap();
        assert_eq!(config.api_root(), "https://api.github.com");
    }

    #[test]
    fn file_config_yaml_parsing() {
        let yaml = r#"
token: "ghp_file"
url: "https://ghe.example.com"
orgs:
  - acme
  - initech
json: true
"#;
        let file: FileConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(file.token.as_deref(), Some("ghp_file"));
        assert_eq!(file.orgs, vec!["acme", "initech"]);
        assert_eq!(file.json, Some(true));
    }

    #[test]
    fn file_config_load_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "orgs: [acme]\n").unwrap();

        let file = FileConfig::load(&path).unwrap();
        assert_eq!(file.orgs, vec!["acme"]);
        assert!(file.token.is_none());
    }

    #[test]
    fn file_config_load_missing_file_fails() {
        assert!(FileConfig::load(Path::new("/nonexistent/config.yml")).is_err());
    }
}
