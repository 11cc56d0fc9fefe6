//! Proxy configuration.
//!
//! Loaded from TOML. Every section is optional and falls back to its
//! defaults, so a file only needs the values that differ. Credentials can
//! be supplied through environment variables instead of the file.

use pricescout_core::BackendConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ProxyError, Result};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "PRICESCOUT_CONFIG";
/// Environment variable overriding `backend.url`.
pub const BACKEND_URL_ENV: &str = "PRICESCOUT_BACKEND_URL";
/// Environment variable overriding `backend.api_token`.
pub const API_TOKEN_ENV: &str = "PRICESCOUT_API_TOKEN";
/// Environment variable overriding `server.port`.
pub const PORT_ENV: &str = "PRICESCOUT_PORT";

/// Top-level configuration for the proxy process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Inference backend settings.
    pub backend: BackendConfig,
    /// Log filter settings.
    pub logging: LoggingConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port (`0` picks a free port).
    pub port: u16,
    /// Path of the search endpoint.
    pub route: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8787,
            route: "/api/search".to_owned(),
        }
    }
}

/// Log filter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive string. `RUST_LOG` takes precedence.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "pricescout=info,pricescout_core=info".to_owned(),
        }
    }
}

impl ProxyConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ProxyError::Config(format!("{}: {e}", path.display())))
    }

    /// Returns the default config file path:
    /// `<platform config dir>/pricescout/config.toml`.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("pricescout")
            .join("config.toml")
    }

    /// Load configuration from the process environment.
    ///
    /// Uses the file named by `PRICESCOUT_CONFIG` if set, else the default
    /// path if it exists, else built-in defaults. Environment overrides are
    /// applied afterwards and the result is validated.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file cannot be loaded, an override is
    /// malformed, or the final configuration is invalid.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// [`load`](Self::load) with an explicit variable lookup.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match lookup(CONFIG_ENV).filter(|p| !p.trim().is_empty()) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => {
                let path = Self::default_config_path();
                if path.is_file() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PRICESCOUT_BACKEND_URL`, `PRICESCOUT_API_TOKEN` and
    /// `PRICESCOUT_PORT` from `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Config`] if the port override is not a valid port.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup(BACKEND_URL_ENV) {
            self.backend.url = url;
        }
        if let Some(token) = lookup(API_TOKEN_ENV) {
            self.backend.api_token = token;
        }
        if let Some(port) = lookup(PORT_ENV) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| ProxyError::Config(format!("{PORT_ENV}={port:?}: {e}")))?;
        }
        Ok(())
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend settings are invalid or the search
    /// route is not an absolute path distinct from `/health`.
    pub fn validate(&self) -> Result<()> {
        self.backend.validate()?;
        let route = self.server.route.as_str();
        if !route.starts_with('/') || route.len() < 2 {
            return Err(ProxyError::Config(format!(
                "server.route must be an absolute path, got {route:?}"
            )));
        }
        if route == crate::server::HEALTH_ROUTE {
            return Err(ProxyError::Config(
                "server.route must not shadow the health probe".to_owned(),
            ));
        }
        Ok(())
    }

    /// `host:port` string for binding the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = ProxyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.route, "/api/search");
        assert_eq!(config.bind_addr(), "127.0.0.1:8787");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[backend]\nurl = \"http://localhost:9000/run\"\ntimeout_ms = 5000\n",
        )
        .unwrap();

        let config = ProxyConfig::from_file(&path).unwrap();
        assert_eq!(config.backend.url, "http://localhost:9000/run");
        assert_eq!(config.backend.timeout_ms, 5_000);
        assert_eq!(config.backend.query_field, "in-0");
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.logging.filter, "pricescout=info,pricescout_core=info");
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = ProxyConfig::from_file(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(ProxyError::Io(_))));
    }

    #[test]
    fn from_file_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();
        assert!(matches!(
            ProxyConfig::from_file(&path),
            Err(ProxyError::Config(_))
        ));
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = ProxyConfig::default_config_path();
        let path_str = path.to_string_lossy();
        assert!(path_str.ends_with("config.toml"));
        assert!(path_str.contains("pricescout"));
    }

    #[test]
    fn load_reads_explicit_file_then_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxy.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9000\n\n[backend]\napi_token = \"from-file\"\n",
        )
        .unwrap();
        let path_str = path.to_string_lossy().into_owned();

        let config = ProxyConfig::load_with(env(&[
            (CONFIG_ENV, path_str.as_str()),
            (API_TOKEN_ENV, "from-env"),
            (BACKEND_URL_ENV, "https://backend.example.com/run"),
        ]))
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.backend.api_token, "from-env");
        assert_eq!(config.backend.url, "https://backend.example.com/run");
    }

    #[test]
    fn load_missing_explicit_file_is_an_error() {
        let result = ProxyConfig::load_with(env(&[(CONFIG_ENV, "/nonexistent/pricescout.toml")]));
        assert!(result.is_err());
    }

    #[test]
    fn port_override_must_parse() {
        let mut config = ProxyConfig::default();
        config.apply_overrides(env(&[(PORT_ENV, "8080")])).unwrap();
        assert_eq!(config.server.port, 8080);

        let err = config
            .apply_overrides(env(&[(PORT_ENV, "eighty")]))
            .unwrap_err();
        assert!(err.to_string().contains(PORT_ENV));
    }

    #[test]
    fn invalid_backend_override_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();
        let path_str = path.to_string_lossy().into_owned();

        let result = ProxyConfig::load_with(env(&[
            (CONFIG_ENV, path_str.as_str()),
            (BACKEND_URL_ENV, "ftp://backend.example.com"),
        ]));
        assert!(matches!(result, Err(ProxyError::Core(_))));
    }

    #[test]
    fn route_must_be_absolute() {
        let mut config = ProxyConfig::default();
        config.server.route = "api/search".to_owned();
        assert!(config.validate().is_err());
        config.server.route = "/health".to_owned();
        assert!(config.validate().is_err());
        config.server.route = "/search".to_owned();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_serializes_to_toml() {
        let toml_str = toml::to_string_pretty(&ProxyConfig::default()).unwrap();
        assert!(toml_str.contains("[backend]"));
        assert!(toml_str.contains("output_slot"));
    }
}
