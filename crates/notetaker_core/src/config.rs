//! Runtime configuration resolved from environment variables.
//!
//! # Responsibility
//! - Name every supported variable in one place.
//! - Validate values up front so later layers never see half-valid config.
//!
//! # Invariants
//! - A GraphQL backend always has an `http(s)` endpoint.
//! - `request_timeout` is never zero.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable names.
pub mod env_vars {
    pub const BACKEND: &str = "NOTETAKER_BACKEND";
    pub const GRAPHQL_ENDPOINT: &str = "NOTETAKER_GRAPHQL_ENDPOINT";
    pub const API_KEY: &str = "NOTETAKER_API_KEY";
    pub const AUTH_TOKEN: &str = "NOTETAKER_AUTH_TOKEN";
    pub const USER: &str = "NOTETAKER_USER";
    pub const DB_PATH: &str = "NOTETAKER_DB_PATH";
    pub const TIMEOUT_SECS: &str = "NOTETAKER_TIMEOUT_SECS";
    pub const LOG_LEVEL: &str = "NOTETAKER_LOG_LEVEL";
    pub const LOG_DIR: &str = "NOTETAKER_LOG_DIR";
}

/// Default values.
pub mod defaults {
    pub const DB_PATH: &str = "notetaker.sqlite3";
    pub const TIMEOUT_SECS: u64 = 30;
}

/// Which note store the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// Managed GraphQL endpoint.
    GraphQl {
        endpoint: String,
        api_key: Option<String>,
        auth_token: Option<String>,
    },
    /// Local SQLite file acting as the store.
    Sqlite { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub backend: BackendConfig,
    /// Principal shown in the greeting. Required for GraphQL; local
    /// sessions fall back to a default.
    pub user: Option<String>,
    /// Per-request timeout applied by the HTTP transport.
    pub request_timeout: Duration,
    /// Explicit log level; `None` uses the build-mode default.
    pub log_level: Option<String>,
    /// Absolute directory for rolling log files; `None` logs to stderr,
    /// at `warn` unless `log_level` says otherwise.
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::Sqlite {
                path: PathBuf::from(defaults::DB_PATH),
            },
            user: None,
            request_timeout: Duration::from_secs(defaults::TIMEOUT_SECS),
            log_level: None,
            log_dir: None,
        }
    }
}

/// Configuration rejected at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required variable is unset or blank.
    Missing(&'static str),
    /// Variable is set to an unusable value.
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(var) => write!(f, "missing required setting `{var}`"),
            Self::Invalid { var, value, reason } => {
                write!(f, "invalid value `{value}` for `{var}`: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

impl AppConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through `lookup`; blank values count as unset
    /// except for the user name.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let backend = match get(env_vars::BACKEND).as_deref() {
            None | Some("graphql") => {
                let endpoint = get(env_vars::GRAPHQL_ENDPOINT)
                    .ok_or(ConfigError::Missing(env_vars::GRAPHQL_ENDPOINT))?;
                if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                    return Err(ConfigError::Invalid {
                        var: env_vars::GRAPHQL_ENDPOINT,
                        value: endpoint,
                        reason: "expected an http:// or https:// URL",
                    });
                }
                BackendConfig::GraphQl {
                    endpoint,
                    api_key: get(env_vars::API_KEY),
                    auth_token: get(env_vars::AUTH_TOKEN),
                }
            }
            Some("sqlite") => BackendConfig::Sqlite {
                path: get(env_vars::DB_PATH)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(defaults::DB_PATH)),
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: env_vars::BACKEND,
                    value: other.to_string(),
                    reason: "expected graphql|sqlite",
                })
            }
        };

        let request_timeout = match get(env_vars::TIMEOUT_SECS) {
            None => Duration::from_secs(defaults::TIMEOUT_SECS),
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: env_vars::TIMEOUT_SECS,
                        value: raw,
                        reason: "expected a positive number of seconds",
                    })
                }
            },
        };

        Ok(Self {
            backend,
            // Kept raw: the auth gate rejects a blank user name.
            user: lookup(env_vars::USER),
            request_timeout,
            log_level: get(env_vars::LOG_LEVEL),
            log_dir: get(env_vars::LOG_DIR).map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{env_vars, AppConfig, BackendConfig, ConfigError};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn graphql_is_default_backend_and_needs_endpoint() {
        assert_eq!(
            load(&[]),
            Err(ConfigError::Missing(env_vars::GRAPHQL_ENDPOINT))
        );

        let config = load(&[
            (env_vars::GRAPHQL_ENDPOINT, "https://api.test/graphql"),
            (env_vars::API_KEY, " da2-key "),
        ])
        .expect("graphql config");
        assert_eq!(
            config.backend,
            BackendConfig::GraphQl {
                endpoint: "https://api.test/graphql".to_string(),
                api_key: Some("da2-key".to_string()),
                auth_token: None,
            }
        );
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn sqlite_backend_uses_default_path() {
        let config = load(&[(env_vars::BACKEND, "sqlite")]).expect("sqlite config");
        assert_eq!(
            config.backend,
            BackendConfig::Sqlite {
                path: PathBuf::from("notetaker.sqlite3")
            }
        );
    }

    #[test]
    fn rejects_unknown_backend_bad_endpoint_and_zero_timeout() {
        assert!(matches!(
            load(&[(env_vars::BACKEND, "rest")]),
            Err(ConfigError::Invalid { var, .. }) if var == env_vars::BACKEND
        ));
        assert!(matches!(
            load(&[(env_vars::GRAPHQL_ENDPOINT, "ftp://nope")]),
            Err(ConfigError::Invalid { var, .. }) if var == env_vars::GRAPHQL_ENDPOINT
        ));
        assert!(matches!(
            load(&[(env_vars::BACKEND, "sqlite"), (env_vars::TIMEOUT_SECS, "0")]),
            Err(ConfigError::Invalid { var, .. }) if var == env_vars::TIMEOUT_SECS
        ));
    }

    #[test]
    fn optional_settings_are_carried_through() {
        let config = load(&[
            (env_vars::BACKEND, "sqlite"),
            (env_vars::USER, "ada"),
            (env_vars::TIMEOUT_SECS, "5"),
            (env_vars::LOG_LEVEL, "debug"),
            (env_vars::LOG_DIR, "/tmp/notetaker-logs"),
        ])
        .expect("config");
        assert_eq!(config.user.as_deref(), Some("ada"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/notetaker-logs")));
    }
}
