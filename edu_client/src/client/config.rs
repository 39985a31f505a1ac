//! Client configuration from defaults, environment variables, or a TOML file.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use super::error::{ClientError, ClientResult};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_LOGIN_PATH: &str = "/login";

pub const BASE_URL_ENV: &str = "EDU_API_URL";
pub const TIMEOUT_ENV: &str = "EDU_API_TIMEOUT_MS";

/// Settings shared by every request the client sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix every resource path is appended to
    pub base_url: String,
    /// Whole-request timeout
    pub timeout: Duration,
    /// Login entry point handed to the unauthorized hook
    pub login_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }
}

/// TOML layout accepted by [`ClientConfig::from_file`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    client: ClientSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ClientSettings {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    timeout_ms: Option<u64>,
    #[serde(default)]
    login_path: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    /// Create a configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `EDU_API_URL` (optional, default: `http://localhost:3001/api`): API base URL.
    ///   An empty value falls back to the default.
    /// - `EDU_API_TIMEOUT_MS` (optional, default: 10000): request timeout in milliseconds
    ///
    /// # Errors
    /// Returns a configuration error if the timeout is not a positive integer
    /// or the base URL does not parse.
    pub fn from_env() -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(base_url) = env::var(BASE_URL_ENV).ok().filter(|v| !v.trim().is_empty()) {
            config.base_url = base_url.trim().to_string();
        }

        if let Some(raw) = env::var(TIMEOUT_ENV).ok().filter(|v| !v.trim().is_empty()) {
            config.timeout = parse_timeout_ms(&raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load the configuration from a TOML file with a `[client]` table.
    ///
    /// Missing keys keep their defaults:
    ///
    /// ```toml
    /// [client]
    /// base_url = "https://edu.example.com/api"
    /// timeout_ms = 5000
    /// login_path = "/signin"
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> ClientResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ClientError::Config(format!("Failed to read config file: {}", e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse the `[client]` TOML layout from a string.
    pub fn from_toml_str(content: &str) -> ClientResult<Self> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| {
            ClientError::Config(format!("Failed to parse config file: {}", e))
        })?;

        let mut config = Self::default();
        if let Some(base_url) = file.client.base_url {
            config.base_url = base_url;
        }
        if let Some(timeout_ms) = file.client.timeout_ms {
            if timeout_ms == 0 {
                return Err(ClientError::Config("timeout_ms must be positive".to_string()));
            }
            config.timeout = Duration::from_millis(timeout_ms);
        }
        if let Some(login_path) = file.client.login_path {
            config.login_path = login_path;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse the base URL, rejecting URLs that cannot carry a path.
    pub fn parsed_base_url(&self) -> ClientResult<Url> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        if url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!(
                "{}: not a hierarchical URL",
                self.base_url
            )));
        }
        Ok(url)
    }

    fn validate(&self) -> ClientResult<()> {
        self.parsed_base_url().map(|_| ())
    }
}

fn parse_timeout_ms(raw: &str) -> ClientResult<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ClientError::Config(format!(
            "{} must be a positive number of milliseconds, got '{}'",
            TIMEOUT_ENV, raw
        ))),
    }
}
