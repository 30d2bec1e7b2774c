//! Configuration for taskdesk.
//!
//! Settings are read from `taskdesk.toml` in the config directory and layered
//! file → environment → CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8000"
//! timeout_secs = 30
//!
//! [session]
//! persist = true
//! # credential_file = "/custom/path/credential"
//! ```
//!
//! The config directory is `$TASKDESK_HOME` when set, otherwise
//! `<platform config dir>/taskdesk`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "taskdesk.toml";
pub const CREDENTIAL_FILE: &str = "credential";

pub const HOME_ENV: &str = "TASKDESK_HOME";
pub const API_URL_ENV: &str = "TASKDESK_API_URL";
pub const TIMEOUT_ENV: &str = "TASKDESK_TIMEOUT_SECS";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiSection {
    /// Root of the task management API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSection {
    /// Keep the credential between runs
    #[serde(default = "default_persist")]
    pub persist: bool,
    /// Where to keep it (defaults to `<config dir>/credential`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_file: Option<PathBuf>,
}

fn default_persist() -> bool {
    true
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            persist: default_persist(),
            credential_file: None,
        }
    }
}

/// The complete taskdesk.toml structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskdeskToml {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub session: SessionSection,
}

impl TaskdeskToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse taskdesk.toml")
    }

    /// Defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content =
            toml::to_string_pretty(self).context("Failed to serialize taskdesk.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(warning) = check_base_url(&self.api.base_url) {
            warnings.push(warning);
        }
        if self.api.timeout_secs == 0 {
            warnings.push("api.timeout_secs is 0: every request would time out".to_string());
        }
        if !self.session.persist && self.session.credential_file.is_some() {
            warnings.push(
                "session.credential_file is set but session.persist = false; it will be ignored"
                    .to_string(),
            );
        }
        warnings
    }
}

fn check_base_url(url: &str) -> Option<String> {
    match reqwest::Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => None,
        Ok(parsed) => Some(format!(
            "Invalid api.base_url '{}': scheme '{}' is not http or https",
            url,
            parsed.scheme()
        )),
        Err(e) => Some(format!("Invalid api.base_url '{}': {}", url, e)),
    }
}

/// Values taken from the environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvOverrides {
    pub api_url: Option<String>,
    pub timeout_secs: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            api_url: non_empty(API_URL_ENV),
            timeout_secs: non_empty(TIMEOUT_ENV),
        }
    }
}

/// Effective configuration, merged from file, environment and CLI.
#[derive(Debug, Clone)]
pub struct Config {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
    pub toml: TaskdeskToml,
    pub env: EnvOverrides,
    /// CLI override: `--api-url`
    pub cli_api_url: Option<String>,
}

impl Config {
    /// Load from `config_path` (or the default location) and the process
    /// environment.
    pub fn load(config_path: Option<PathBuf>, cli_api_url: Option<String>) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path,
            None => default_config_dir()?.join(CONFIG_FILE),
        };
        let toml = TaskdeskToml::load_or_default(&config_path)?;
        Ok(Self::from_parts(
            config_path,
            toml,
            EnvOverrides::from_env(),
            cli_api_url,
        ))
    }

    pub fn from_parts(
        config_path: PathBuf,
        toml: TaskdeskToml,
        env: EnvOverrides,
        cli_api_url: Option<String>,
    ) -> Self {
        let config_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            config_dir,
            config_path,
            toml,
            env,
            cli_api_url,
        }
    }

    /// API root (CLI → env → file).
    pub fn api_url(&self) -> String {
        self.cli_api_url
            .clone()
            .or_else(|| self.env.api_url.clone())
            .unwrap_or_else(|| self.toml.api.base_url.clone())
    }

    /// Request timeout (env → file). An unparseable env value is ignored.
    pub fn timeout(&self) -> Duration {
        let secs = self
            .env
            .timeout_secs
            .as_deref()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(self.toml.api.timeout_secs);
        Duration::from_secs(secs)
    }

    pub fn persist_session(&self) -> bool {
        self.toml.session.persist
    }

    pub fn credential_path(&self) -> PathBuf {
        self.toml
            .session
            .credential_file
            .clone()
            .unwrap_or_else(|| self.config_dir.join(CREDENTIAL_FILE))
    }

    pub fn validate(&self) -> Vec<String> {
        let mut warnings = self.toml.validate();
        if let Some(raw) = &self.env.timeout_secs {
            if raw.trim().parse::<u64>().is_err() {
                warnings.push(format!(
                    "{}='{}' is not a number of seconds; using the file value",
                    TIMEOUT_ENV, raw
                ));
            }
        }
        let effective = self.api_url();
        if effective != self.toml.api.base_url {
            if let Some(warning) = check_base_url(&effective) {
                warnings.push(warning);
            }
        }
        warnings
    }
}

/// `$TASKDESK_HOME`, or `<platform config dir>/taskdesk`.
pub fn default_config_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    dirs::config_dir()
        .map(|dir| dir.join("taskdesk"))
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory; set {}", HOME_ENV))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> EnvOverrides {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvOverrides::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let toml = TaskdeskToml::default();
        assert_eq!(toml.api.base_url, "http://localhost:8000");
        assert_eq!(toml.api.timeout_secs, 30);
        assert!(toml.session.persist);
        assert!(toml.validate().is_empty());
    }

    #[test]
    fn test_parse_partial_file_fills_defaults() {
        let toml =
            TaskdeskToml::parse("[api]\nbase_url = \"https://tasks.example.com\"\n").unwrap();
        assert_eq!(toml.api.base_url, "https://tasks.example.com");
        assert_eq!(toml.api.timeout_secs, 30);
        assert!(toml.session.persist);
    }

    #[test]
    fn test_parse_invalid_toml() {
        assert!(TaskdeskToml::parse("[api\nbase_url = ").is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub").join(CONFIG_FILE);
        let mut toml = TaskdeskToml::default();
        toml.api.timeout_secs = 5;
        toml.save(&path).unwrap();

        let loaded = TaskdeskToml::load_or_default(&path).unwrap();
        assert_eq!(loaded, toml);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = TempDir::new().unwrap();
        let loaded = TaskdeskToml::load_or_default(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(loaded, TaskdeskToml::default());
    }

    #[test]
    fn test_validate_flags_bad_values() {
        let mut toml = TaskdeskToml::default();
        toml.api.base_url = "ftp://files".into();
        toml.api.timeout_secs = 0;
        let warnings = toml.validate();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("ftp"));
        assert!(warnings[1].contains("timeout_secs"));
    }

    #[test]
    fn test_api_url_layering() {
        let path = PathBuf::from("/cfg/taskdesk.toml");
        let file_only =
            Config::from_parts(path.clone(), TaskdeskToml::default(), env(&[]), None);
        assert_eq!(file_only.api_url(), "http://localhost:8000");

        let with_env = Config::from_parts(
            path.clone(),
            TaskdeskToml::default(),
            env(&[(API_URL_ENV, "http://env:9000")]),
            None,
        );
        assert_eq!(with_env.api_url(), "http://env:9000");

        let with_cli = Config::from_parts(
            path,
            TaskdeskToml::default(),
            env(&[(API_URL_ENV, "http://env:9000")]),
            Some("http://cli:7000".into()),
        );
        assert_eq!(with_cli.api_url(), "http://cli:7000");
    }

    #[test]
    fn test_timeout_env_override_and_bad_value() {
        let path = PathBuf::from("/cfg/taskdesk.toml");
        let config = Config::from_parts(
            path.clone(),
            TaskdeskToml::default(),
            env(&[(TIMEOUT_ENV, "5")]),
            None,
        );
        assert_eq!(config.timeout(), Duration::from_secs(5));

        let config = Config::from_parts(
            path,
            TaskdeskToml::default(),
            env(&[(TIMEOUT_ENV, "soon")]),
            None,
        );
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.validate().iter().any(|w| w.contains(TIMEOUT_ENV)));
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let overrides = env(&[(API_URL_ENV, "  ")]);
        assert!(overrides.api_url.is_none());
    }

    #[test]
    fn test_credential_path_defaults_to_config_dir() {
        let config = Config::from_parts(
            PathBuf::from("/cfg/taskdesk.toml"),
            TaskdeskToml::default(),
            env(&[]),
            None,
        );
        assert_eq!(config.credential_path(), PathBuf::from("/cfg/credential"));

        let mut toml = TaskdeskToml::default();
        toml.session.credential_file = Some(PathBuf::from("/tmp/tok"));
        let config =
            Config::from_parts(PathBuf::from("/cfg/taskdesk.toml"), toml, env(&[]), None);
        assert_eq!(config.credential_path(), PathBuf::from("/tmp/tok"));
    }
}
