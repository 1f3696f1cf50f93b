//! # Server Configuration
//!
//! Read once from the environment at startup and injected into
//! [`AppState`](crate::state::AppState).
//!
//! | Variable     | Default       | Meaning                                   |
//! |--------------|---------------|-------------------------------------------|
//! | `HOST`       | `0.0.0.0`     | Bind address                              |
//! | `PORT`       | `8080`        | Bind port                                 |
//! | `PLUGIN_DIR` | unset         | Directory of declarative plugins to merge |
//! | `LOG_FORMAT` | `pretty`      | `pretty` or `json`                        |
//! | `APP_ENV`    | `development` | Deployment environment label              |

use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Invalid configuration values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid HOST {value:?}: expected an IP address")]
    InvalidHost { value: String },

    #[error("invalid PORT {value:?}: expected an integer in 0..=65535")]
    InvalidPort { value: String },

    #[error("invalid LOG_FORMAT {value:?}: expected \"pretty\" or \"json\"")]
    InvalidLogFormat { value: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidLogFormat {
                value: s.to_string(),
            }),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub plugin_dir: Option<PathBuf>,
    pub log_format: LogFormat,
    pub environment: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 8080,
            plugin_dir: None,
            log_format: LogFormat::Pretty,
            environment: "development".to_string(),
        }
    }
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Unset and empty variables take
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let host = match get("HOST") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidHost { value })?,
            None => defaults.host,
        };

        let port = match get("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort { value })?,
            None => defaults.port,
        };

        let log_format = match get("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => defaults.log_format,
        };

        Ok(Self {
            host,
            port,
            plugin_dir: get("PLUGIN_DIR").map(PathBuf::from),
            log_format,
            environment: get("APP_ENV").unwrap_or(defaults.environment),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.port, 8080);
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn reads_all_variables() {
        let config = AppConfig::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("PLUGIN_DIR", "/etc/gatehouse/plugins"),
            ("LOG_FORMAT", "JSON"),
            ("APP_ENV", "production"),
        ]))
        .unwrap();
        assert_eq!(config.host, IpAddr::from([127, 0, 0, 1]));
        assert_eq!(config.port, 3000);
        assert_eq!(config.plugin_dir, Some(PathBuf::from("/etc/gatehouse/plugins")));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.environment, "production");
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("PORT", ""), ("PLUGIN_DIR", " ")])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.plugin_dir, None);
    }

    #[test]
    fn invalid_values_are_errors() {
        assert_eq!(
            AppConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err(),
            ConfigError::InvalidPort { value: "eighty".into() }
        );
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("LOG_FORMAT", "xml")])),
            Err(ConfigError::InvalidLogFormat { .. })
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("HOST", "localhost:80")])),
            Err(ConfigError::InvalidHost { .. })
        ));
    }
}
