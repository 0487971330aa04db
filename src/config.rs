//! Proxy configuration.
//!
//! Loaded once at startup from TOML, with a handful of environment
//! overrides for container deployments. Every section falls back to its
//! defaults for missing fields.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sigproxy_search::{BackendConfig, SearchSettings};

use crate::error::{ProxyError, Result};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "SIGPROXY_CONFIG";
/// Overrides `backend.endpoint`.
pub const ENDPOINT_ENV: &str = "SIGPROXY_ENDPOINT";
/// Overrides `backend.region`.
pub const REGION_ENV: &str = "SIGPROXY_REGION";
/// Overrides `backend.service`.
pub const SERVICE_ENV: &str = "SIGPROXY_SERVICE";
/// Overrides `server.port`.
pub const PORT_ENV: &str = "SIGPROXY_PORT";

/// Top-level proxy configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listen address.
    pub server: ServerConfig,
    /// Search backend and signing parameters.
    pub backend: BackendConfig,
    /// Document field lists used for query building.
    pub search: SearchSettings,
}

/// Where the edge listens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port. `0` lets the OS pick one.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8787,
        }
    }
}

impl ProxyConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ProxyError::Config(e.to_string()))
    }

    /// Returns the default config file path: `~/.config/sigproxy/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("sigproxy").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("sigproxy")
                .join("config.toml")
        } else {
            PathBuf::from("/etc/sigproxy/config.toml")
        }
    }

    /// Resolves the effective configuration for this process.
    ///
    /// Reads `$SIGPROXY_CONFIG` if set (the file must exist), otherwise the
    /// default path if it exists, otherwise built-in defaults. Environment
    /// overrides are applied last and the result is validated.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file cannot be loaded, an override is
    /// unparseable, or validation fails.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => {
                let path = Self::default_config_path();
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    Self::default()
                }
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `SIGPROXY_*` overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Config`] if the port override is not a valid
    /// port number.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(endpoint) = lookup(ENDPOINT_ENV) {
            self.backend.endpoint = endpoint;
        }
        if let Some(region) = lookup(REGION_ENV) {
            self.backend.region = region;
        }
        if let Some(service) = lookup(SERVICE_ENV) {
            self.backend.service = service;
        }
        if let Some(port) = lookup(PORT_ENV) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| ProxyError::Config(format!("invalid {PORT_ENV} {port:?}: {e}")))?;
        }
        Ok(())
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure found.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(ProxyError::Config("server.host must not be empty".into()));
        }
        self.backend.validate()?;
        self.search.validate()?;
        Ok(())
    }
}
