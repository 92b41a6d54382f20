//! Top-level settings
//!
//! Reads `apptester.toml`: where the management server lives, who to log in
//! as, where to build, and which application matrix to use.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::remote::{ClientOptions, Credentials, ServerHandle};

/// Settings loaded from the settings file
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Management server host
    pub host: String,

    /// Management server port
    pub port: u16,

    /// User name for basic authentication
    pub user: String,

    /// Password for basic authentication
    pub password: String,

    /// Root of all build trees; cleared before every run
    pub builddir: PathBuf,

    /// Application matrix file, relative to the settings file
    pub appconfig: PathBuf,

    /// HTTP client tuning
    #[serde(default)]
    pub http: HttpSettings,
}

/// Optional HTTP client tuning
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpSettings {
    /// Whole-request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Connect timeout in seconds
    pub connect_timeout_secs: Option<u64>,

    /// Maximum attempts per request
    pub max_retries: Option<u32>,

    /// Base backoff delay in milliseconds
    pub retry_delay_ms: Option<u64>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("builddir", &self.builddir)
            .field("appconfig", &self.appconfig)
            .field("http", &self.http)
            .finish()
    }
}

impl Settings {
    /// Load settings from `path`
    ///
    /// Unlike the application matrix there is no usable default, so a missing
    /// file is an error.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_toml(&content).map_err(|e| match e {
            ConfigError::ParseError { error, .. } => ConfigError::ParseError {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Apply `-s`/`-p` command-line overrides
    #[must_use]
    pub fn with_overrides(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// Resolve the application matrix path
    ///
    /// Relative paths are taken from the directory holding the settings file.
    pub fn appconfig_path(&self, settings_path: &Path) -> PathBuf {
        if self.appconfig.is_absolute() {
            return self.appconfig.clone();
        }
        settings_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(&self.appconfig)
    }

    /// Server address
    pub fn server(&self) -> ServerHandle {
        ServerHandle::new(self.host.clone(), self.port)
    }

    /// Login for REST calls
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.user.clone(), self.password.clone())
    }

    /// HTTP client options with defaults filled in
    pub fn client_options(&self) -> ClientOptions {
        let defaults = ClientOptions::default();
        ClientOptions {
            timeout: self
                .http
                .timeout_secs
                .map_or(defaults.timeout, Duration::from_secs),
            connect_timeout: self
                .http
                .connect_timeout_secs
                .map_or(defaults.connect_timeout, Duration::from_secs),
            max_retries: self.http.max_retries.unwrap_or(defaults.max_retries),
            base_delay_ms: self.http.retry_delay_ms.unwrap_or(defaults.base_delay_ms),
        }
    }
}
