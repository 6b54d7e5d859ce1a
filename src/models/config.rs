//! Configuration models for onestroke.
//!
//! All I^R (resolvable ignorance) is parameterized here.
//! The user resolves these unknowns at runtime via config file or environment.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Top-level configuration for onestroke.
///
/// Every section is optional; an empty file is a valid config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Puzzle backend connection settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Local feasibility check settings
    #[serde(default)]
    pub check: CheckConfig,
}

/// Puzzle backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend (supports ${ENV_VAR} expansion)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable that overrides `base_url` when set
    #[serde(default = "default_base_url_env")]
    pub base_url_env: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Total attempts per request (1 = no retry)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Extra headers sent with every request.
    /// Values can contain ${ENV_VAR} for environment variable expansion
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_base_url_env() -> String {
    "ONESTROKE_BACKEND_URL".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            base_url_env: default_base_url_env(),
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            headers: HashMap::new(),
        }
    }
}

/// Feasibility check configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Also require the edge-bearing vertices to form one connected component
    #[serde(default)]
    pub require_connected: bool,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// B_i(file exists) → Result
    /// B_i(file is valid TOML) → Result
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: e,
        })
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Resolve the backend base URL.
    ///
    /// The override env var wins over the file value. The result has no
    /// trailing slash and must be an http(s) URL.
    pub fn resolve_base_url(&self) -> Result<String, ConfigError> {
        self.resolve_base_url_with(|name| std::env::var(name).ok())
    }

    /// [`resolve_base_url`](Self::resolve_base_url) against an arbitrary variable lookup.
    pub fn resolve_base_url_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<String, ConfigError> {
        let raw = match lookup(&self.backend.base_url_env) {
            Some(url) if !url.trim().is_empty() => url,
            _ => expand_env_vars_with(&self.backend.base_url, &lookup),
        };

        let url = raw.trim().trim_end_matches('/').to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(raw));
        }
        Ok(url)
    }

    /// Backend headers with environment variables expanded.
    pub fn resolve_headers(&self) -> HashMap<String, String> {
        expand_headers(&self.backend.headers)
    }
}

/// Expand environment variables in a string.
///
/// Supports ${VAR_NAME} syntax.
/// If the variable is not set, the placeholder is left unchanged.
pub fn expand_env_vars(s: &str) -> String {
    expand_env_vars_with(s, |name| std::env::var(name).ok())
}

/// Same as [`expand_env_vars`], resolving names through `lookup`.
pub fn expand_env_vars_with(s: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").expect("static regex is valid");

    re.replace_all(s, |caps: &regex::Captures<'_>| {
        lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

/// Expand environment variables in all headers.
pub fn expand_headers(headers: &HashMap<String, String>) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(k, v)| (k.clone(), expand_env_vars(v)))
        .collect()
}

/// Configuration errors.
///
/// Epistemic origin:
/// - B_i falsified: File not found, parse error
/// - I^B materialized: Backend URL unusable after resolution
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid backend base URL '{0}': must start with http:// or https://")]
    InvalidBaseUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_with_url(url: &str, env: &str) -> Config {
        Config {
            backend: BackendConfig {
                base_url: url.to_string(),
                base_url_env: env.to_string(),
                ..BackendConfig::default()
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.backend.max_retries, 3);
        assert!(!config.check.require_connected);
    }

    #[test]
    fn test_parse_full_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[backend]
base_url = "https://puzzles.example.com/api/"
timeout_secs = 5
max_retries = 1
headers = {{ "ngrok-skip-browser-warning" = "1" }}

[check]
require_connected = true
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.backend.timeout_secs, 5);
        assert_eq!(config.backend.max_retries, 1);
        assert_eq!(
            config.backend.headers.get("ngrok-skip-browser-warning"),
            Some(&"1".to_string())
        );
        assert!(config.check.require_connected);
    }

    #[test]
    fn test_parse_error_names_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[backend\nbase_url = 3").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.backend.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_resolve_base_url_trims_trailing_slash() {
        let config = config_with_url("http://127.0.0.1:9000/api/", "ONESTROKE_TEST_UNSET_URL");
        assert_eq!(config.resolve_base_url().unwrap(), "http://127.0.0.1:9000/api");
    }

    #[test]
    fn test_resolve_base_url_rejects_non_http() {
        let config = config_with_url("localhost:8000", "ONESTROKE_TEST_UNSET_URL");
        assert!(matches!(
            config.resolve_base_url(),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_resolve_base_url_env_override() {
        let config = config_with_url("http://localhost:8000", "ONESTROKE_BACKEND_URL");
        let url = config
            .resolve_base_url_with(vars(&[("ONESTROKE_BACKEND_URL", "https://override.test/")]))
            .unwrap();
        assert_eq!(url, "https://override.test");
    }

    #[test]
    fn test_resolve_base_url_blank_override_is_ignored() {
        let config = config_with_url("https://${PUZZLE_HOST}/", "ONESTROKE_BACKEND_URL");
        let url = config
            .resolve_base_url_with(vars(&[
                ("ONESTROKE_BACKEND_URL", "   "),
                ("PUZZLE_HOST", "puzzles.test"),
            ]))
            .unwrap();
        assert_eq!(url, "https://puzzles.test");
    }

    #[test]
    fn test_expand_env_vars() {
        let lookup = vars(&[("ONESTROKE_TEST_HOST", "puzzles.test")]);
        assert_eq!(
            expand_env_vars_with("https://${ONESTROKE_TEST_HOST}/api", &lookup),
            "https://puzzles.test/api"
        );
        assert_eq!(
            expand_env_vars_with("${ONESTROKE_TEST_DEFINITELY_UNSET}", &lookup),
            "${ONESTROKE_TEST_DEFINITELY_UNSET}"
        );
        assert_eq!(
            expand_env_vars("${ONESTROKE_TEST_DEFINITELY_UNSET}"),
            "${ONESTROKE_TEST_DEFINITELY_UNSET}"
        );
    }
}
