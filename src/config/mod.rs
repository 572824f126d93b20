//! Configuration loading for the Weather Proxy.
//!
//! Loads layered `.env` files and environment variables prefixed with
//! `WEATHER_PROXY_`, producing a typed [`AppConfig`]. The OpenWeatherMap
//! credential is the one unprefixed setting (`WEATHERAPP_ID`) so it can be
//! shared with other tooling that reads the same variable.

use std::{collections::BTreeMap, env, net::SocketAddr, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Environment variables consumed without the `WEATHER_PROXY_` prefix.
const UNPREFIXED_KEYS: &[&str] = &["WEATHERAPP_ID"];

/// Application configuration derived from `WEATHER_PROXY_*` environment
/// variables plus the bare `WEATHERAPP_ID` credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_api_bind_addr")]
    pub api_bind_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// OpenWeatherMap API key. Absence is not a startup failure; requests
    /// that need it are rejected per-call and `/health` reports the gap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_upstream_base_url")]
    pub upstream_base_url: String,
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            api_bind_addr: default_api_bind_addr(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            api_key: None,
            upstream_base_url: default_upstream_base_url(),
            upstream_timeout_secs: default_upstream_timeout_secs(),
            cors_allowed_origins: default_cors_allowed_origins(),
        }
    }
}

impl AppConfig {
    /// Returns the configured bind address as a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.api_bind_addr.parse()
    }

    /// Returns the API key if one is set to a non-blank value.
    pub fn configured_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Returns the upstream request timeout as a [`Duration`].
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Returns a redacted JSON representation (secrets are redacted).
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        let mut config = self.clone();
        if config.api_key.is_some() {
            config.api_key = Some("[REDACTED]".to_string());
        }
        serde_json::to_string_pretty(&config)
    }

    /// Validates the configuration, returning an error for malformed settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let upstream = Url::parse(&self.upstream_base_url).map_err(|source| {
            ConfigError::InvalidUpstreamUrl {
                value: self.upstream_base_url.clone(),
                source,
            }
        })?;
        if !matches!(upstream.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUpstreamScheme {
                value: self.upstream_base_url.clone(),
            });
        }

        if self.upstream_timeout_secs == 0 {
            return Err(ConfigError::InvalidUpstreamTimeout {
                value: self.upstream_timeout_secs,
            });
        }

        // Origins must be bare scheme://host[:port] values; anything with a
        // path or query would never match a browser Origin header.
        for origin in &self.cors_allowed_origins {
            let parsed = Url::parse(origin).map_err(|_| ConfigError::InvalidCorsOrigin {
                origin: origin.clone(),
            })?;
            let bare = matches!(parsed.scheme(), "http" | "https")
                && parsed.host_str().is_some()
                && parsed.path() == "/"
                && parsed.query().is_none()
                && parsed.fragment().is_none()
                && !origin.ends_with('/');
            if !bare {
                return Err(ConfigError::InvalidCorsOrigin {
                    origin: origin.clone(),
                });
            }
        }

        Ok(())
    }
}

fn default_profile() -> String {
    "local".to_string()
}

fn default_api_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_upstream_base_url() -> String {
    "https://api.openweathermap.org/data/2.5/weather".to_string()
}

fn default_upstream_timeout_secs() -> u64 {
    10
}

fn default_cors_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("invalid api bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid upstream base URL '{value}': {source}")]
    InvalidUpstreamUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("upstream base URL '{value}' must use http or https")]
    InvalidUpstreamScheme { value: String },
    #[error("upstream timeout must be at least 1 second, got {value}")]
    InvalidUpstreamTimeout { value: u64 },
    #[error("invalid CORS allowed origin '{origin}'; expected scheme://host[:port]")]
    InvalidCorsOrigin { origin: String },
}

/// Loads configuration using layered `.env` files and `WEATHER_PROXY_*` env vars.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Loads configuration from layered env files, then the process
    /// environment, then defaults for anything still unset.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let (mut layered, profile_hint) = self.collect_layered_env()?;

        // Overlay process environment last so it wins.
        for (key, value) in env::vars() {
            if let Some(setting) = setting_name(&key) {
                layered.insert(setting.to_string(), value);
            }
        }

        let profile = layered
            .remove("PROFILE")
            .filter(|v| !v.is_empty())
            .unwrap_or(profile_hint);
        let api_bind_addr = layered
            .remove("API_BIND_ADDR")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_api_bind_addr);
        let log_level = layered
            .remove("LOG_LEVEL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_log_level);
        let log_format = layered
            .remove("LOG_FORMAT")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_log_format);

        // Blank values count as unset so that `WEATHERAPP_ID=` in a dotenv
        // file does not masquerade as a configured credential.
        let api_key = layered.remove("WEATHERAPP_ID").and_then(|val| {
            let trimmed = val.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        });

        let upstream_base_url = layered
            .remove("UPSTREAM_BASE_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_upstream_base_url);
        let upstream_timeout_secs = layered
            .remove("UPSTREAM_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_upstream_timeout_secs);
        let cors_allowed_origins = layered
            .remove("CORS_ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(default_cors_allowed_origins);

        let config = AppConfig {
            profile,
            api_bind_addr,
            log_level,
            log_format,
            api_key,
            upstream_base_url,
            upstream_timeout_secs,
            cors_allowed_origins,
        };

        config.validate()?;

        match config.bind_addr() {
            Ok(_) => Ok(config),
            Err(source) => Err(ConfigError::InvalidBindAddr {
                value: config.api_bind_addr.clone(),
                source,
            }),
        }
    }

    fn collect_layered_env(&self) -> Result<(BTreeMap<String, String>, String), ConfigError> {
        let mut values = BTreeMap::new();

        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;

        let profile = env::var("WEATHER_PROXY_PROFILE")
            .ok()
            .or_else(|| values.get("PROFILE").cloned())
            .unwrap_or_else(default_profile);

        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}", &profile)),
            &mut values,
        )?;
        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}.local", &profile)),
            &mut values,
        )?;

        Ok((values, profile))
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                        path: path.clone(),
                        source,
                    })?;
                    if let Some(setting) = setting_name(&key) {
                        values.insert(setting.to_string(), value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(err) => Err(ConfigError::EnvFile { path, source: err }),
        }
    }
}

/// Maps an environment variable name to its setting name, if it is one of
/// ours. Prefixed variables are stripped; allowlisted bare names pass through.
fn setting_name(key: &str) -> Option<&str> {
    if let Some(stripped) = key.strip_prefix("WEATHER_PROXY_") {
        Some(stripped)
    } else if UNPREFIXED_KEYS.contains(&key) {
        Some(key)
    } else {
        None
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.bind_addr().is_ok());
        assert_eq!(config.profile, "local");
        assert_eq!(config.upstream_timeout_secs, 10);
        assert_eq!(config.cors_allowed_origins.len(), 4);
    }

    #[test]
    fn test_configured_api_key_requires_non_blank_value() {
        let mut config = AppConfig::default();
        assert_eq!(config.configured_api_key(), None);

        config.api_key = Some("   ".to_string());
        assert_eq!(config.configured_api_key(), None);

        config.api_key = Some(" abc123 ".to_string());
        assert_eq!(config.configured_api_key(), Some("abc123"));
    }

    #[test]
    fn test_upstream_timeout_conversion() {
        let mut config = AppConfig::default();
        config.upstream_timeout_secs = 3;
        assert_eq!(config.upstream_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = AppConfig::default();
        config.upstream_timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUpstreamTimeout { value: 0 })
        ));
    }

    #[test]
    fn test_validate_rejects_malformed_upstream_url() {
        let mut config = AppConfig::default();
        config.upstream_base_url = "not a url".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUpstreamUrl { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_non_http_upstream_scheme() {
        let mut config = AppConfig::default();
        config.upstream_base_url = "ftp://api.openweathermap.org/data".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUpstreamScheme { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_origin_without_scheme() {
        let mut config = AppConfig::default();
        config.cors_allowed_origins = vec!["localhost:3000".to_string()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCorsOrigin { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_origin_with_path() {
        let mut config = AppConfig::default();
        config.cors_allowed_origins = vec!["http://localhost:3000/app".to_string()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCorsOrigin { .. })
        ));
    }

    #[test]
    fn test_redacted_json_hides_api_key() {
        let mut config = AppConfig::default();
        config.api_key = Some("super-secret".to_string());
        let json = config.redacted_json().unwrap();
        assert!(json.contains("[REDACTED]"));
        assert!(!json.contains("super-secret"));
    }

    #[test]
    fn test_setting_name_mapping() {
        assert_eq!(setting_name("WEATHER_PROXY_LOG_LEVEL"), Some("LOG_LEVEL"));
        assert_eq!(setting_name("WEATHERAPP_ID"), Some("WEATHERAPP_ID"));
        assert_eq!(setting_name("PATH"), None);
        assert_eq!(setting_name("WEATHERAPP_ID_EXTRA"), None);
    }
}
