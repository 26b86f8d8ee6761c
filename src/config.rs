//! Configuration file parser for ~/.config/rdpanel/config.toml.
//!
//! The config file is optional. A missing file yields `Config::default()`.
//! Unknown keys are accepted by serde but logged as a warning, since they
//! are most likely typos.
use secrecy::SecretString;
use serde::Deserialize;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Env var that overrides `password` from the file.
pub const PASSWORD_ENV: &str = "RDPANEL_PASSWORD";
/// Env var that overrides `rd_api_key` from the file.
pub const API_KEY_ENV: &str = "RD_API_KEY";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level client configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// The Debug impl masks `password` and `rd_api_key`.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the panel is served, e.g. `http://127.0.0.1:10500`.
    pub base_url: String,

    /// Per-request timeout in seconds, covering send and body read.
    pub request_timeout_secs: u64,

    /// Account used for the form login.
    pub username: String,

    /// Panel password. `RDPANEL_PASSWORD` takes precedence.
    /// When neither is set the CLI does not log in.
    pub password: Option<String>,

    /// Default for `save-settings` when `--api-key` is not given.
    /// `RD_API_KEY` takes precedence.
    pub rd_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:10500".to_string(),
            request_timeout_secs: 30,
            username: "admin".to_string(),
            password: None,
            rd_api_key: None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("rd_api_key", &self.rd_api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 5] = [
        "base_url",
        "request_timeout_secs",
        "username",
        "password",
        "rd_api_key",
    ];

    /// Effective configuration: the TOML file at `path` (optional), then
    /// `RDPANEL_PASSWORD` and `RD_API_KEY` from the environment on top.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::from_file(path)?;
        Ok(config.with_env_overrides(|name| std::env::var(name).ok()))
    }

    /// Parse the file alone. No file, or a blank one, gives the defaults.
    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let Some(text) = read_config_text(path)? else {
            return Ok(Self::default());
        };

        let table: toml::Table = text.parse()?;
        let unknown: Vec<&str> = table
            .keys()
            .map(String::as_str)
            .filter(|key| !Self::KNOWN_KEYS.contains(key))
            .collect();
        if !unknown.is_empty() {
            tracing::warn!(keys = ?unknown, path = %path.display(), "Ignoring unknown config keys");
        }

        let config: Config = toml::Value::Table(table).try_into()?;
        tracing::info!(path = %path.display(), base_url = %config.base_url, "Loaded configuration");
        Ok(config)
    }

    /// Replace the secrets with non-empty values returned by `lookup`.
    fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.is_empty());
        if let Some(password) = non_empty(PASSWORD_ENV) {
            tracing::debug!(var = PASSWORD_ENV, "Password taken from environment");
            self.password = Some(password);
        }
        if let Some(key) = non_empty(API_KEY_ENV) {
            tracing::debug!(var = API_KEY_ENV, "API key taken from environment");
            self.rd_api_key = Some(key);
        }
        self
    }

    /// A zero timeout would fail every request, so it falls back to 1s.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn password(&self) -> Option<SecretString> {
        self.password.clone().map(SecretString::from)
    }

    pub fn rd_api_key(&self) -> Option<SecretString> {
        self.rd_api_key.clone().map(SecretString::from)
    }
}

/// Read at most one byte past the size cap. `None` when there is nothing
/// to parse.
fn read_config_text(path: &Path) -> Result<Option<String>, ConfigError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No config file found, using defaults");
            return Ok(None);
        }
        Err(e) => return Err(ConfigError::Io(e)),
    };

    let mut text = String::new();
    file.take(Config::MAX_FILE_SIZE + 1).read_to_string(&mut text)?;
    if text.len() as u64 > Config::MAX_FILE_SIZE {
        return Err(ConfigError::TooLarge(format!(
            "{} exceeds {} bytes",
            path.display(),
            Config::MAX_FILE_SIZE
        )));
    }

    if text.trim().is_empty() {
        tracing::debug!(path = %path.display(), "Config file is blank, using defaults");
        return Ok(None);
    }
    Ok(Some(text))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn write_config(name: &str, content: &str) -> (std::path::PathBuf, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("rdpanel_config_test_{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://127.0.0.1:10500");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.username, "admin");
        assert!(config.password.is_none());
        assert!(config.rd_api_key.is_none());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/rdpanel_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.username, "admin");
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let (dir, path) = write_config("whitespace", "   \n  \n  ");
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let (dir, path) = write_config("partial", "base_url = \"https://panel.example.com\"\n");
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.base_url, "https://panel.example.com");
        assert_eq!(config.request_timeout_secs, 30); // default
        assert_eq!(config.username, "admin"); // default
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let content = r#"
base_url = "http://192.168.1.20:10500"
request_timeout_secs = 5
username = "ops"
password = "hunter2"
rd_api_key = "rd-123"
"#;
        let (dir, path) = write_config("full", content);
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.base_url, "http://192.168.1.20:10500");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.username, "ops");
        assert_eq!(config.password.as_deref(), Some("hunter2"));
        assert_eq!(config.rd_api_key.as_deref(), Some("rd-123"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let (dir, path) = write_config("invalid", "this is not [valid toml");
        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let (dir, path) = write_config("wrongtype", "request_timeout_secs = \"soon\"\n");
        assert!(Config::from_file(&path).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let (dir, path) = write_config("unknown", "username = \"ops\"\nfeeds = []\n");
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.username, "ops");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let (dir, path) = write_config("too_large", &"a".repeat(1_048_577));
        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_zero_timeout_clamped() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_env_secret_wins_over_file() {
        let file = Config {
            password: Some("from-file".to_string()),
            rd_api_key: Some("key-from-file".to_string()),
            ..Config::default()
        };

        let config = file.clone().with_env_overrides(|name| match name {
            PASSWORD_ENV => Some("from-env".to_string()),
            _ => None,
        });
        assert_eq!(config.password().unwrap().expose_secret(), "from-env");
        assert_eq!(config.rd_api_key().unwrap().expose_secret(), "key-from-file");

        // Empty env values count as unset
        let config = file.with_env_overrides(|_| Some(String::new()));
        assert_eq!(config.password().unwrap().expose_secret(), "from-file");

        let config = Config::default().with_env_overrides(|_| None);
        assert!(config.password().is_none());
        assert!(config.rd_api_key().is_none());
    }

    #[test]
    fn test_env_supplies_secret_missing_from_file() {
        let config = Config::default().with_env_overrides(|name| {
            (name == API_KEY_ENV).then(|| "rd-env".to_string())
        });
        assert_eq!(config.rd_api_key().unwrap().expose_secret(), "rd-env");
        assert!(config.password.is_none());
    }

    #[test]
    fn test_debug_masks_secrets() {
        let config = Config {
            password: Some("super-secret-password".to_string()),
            rd_api_key: Some("super-secret-key".to_string()),
            ..Config::default()
        };
        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("super-secret-password"));
        assert!(!debug_output.contains("super-secret-key"));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
