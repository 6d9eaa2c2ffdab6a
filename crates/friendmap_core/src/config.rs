//! Runtime configuration.
//!
//! # Responsibility
//! - Collect geocoder, storage, map output and logging settings.
//! - Load overrides from `FRIENDMAP_*` environment variables.
//!
//! # Invariants
//! - Loading never panics; malformed values are reported with their key.
//! - No request timeout is applied unless one is configured.

use crate::geocode::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const ENV_WIKI_URL: &str = "FRIENDMAP_WIKI_URL";
pub const ENV_USER_AGENT: &str = "FRIENDMAP_USER_AGENT";
pub const ENV_TIMEOUT_SECS: &str = "FRIENDMAP_TIMEOUT_SECS";
pub const ENV_DB_PATH: &str = "FRIENDMAP_DB_PATH";
pub const ENV_MAP_DIR: &str = "FRIENDMAP_MAP_DIR";
pub const ENV_LOG_LEVEL: &str = "FRIENDMAP_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "FRIENDMAP_LOG_DIR";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {} value `{}`: {}", self.key, self.value, self.reason)
    }
}

impl Error for ConfigError {}

/// Application settings shared by core and CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Scheme and host of the encyclopedia, e.g. `https://pl.wikipedia.org`.
    pub wiki_base_url: String,
    pub user_agent: String,
    pub request_timeout: Option<Duration>,
    /// `None` keeps records in memory only.
    pub db_path: Option<PathBuf>,
    pub map_dir: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            wiki_base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: None,
            db_path: None,
            map_dir: PathBuf::from("."),
            log_level: default_log_level().to_string(),
            log_dir: std::env::temp_dir().join("friendmap").join("logs"),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns per key.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(value) = get(ENV_WIKI_URL) {
            config.wiki_base_url = parse_base_url(ENV_WIKI_URL, value)?;
        }
        if let Some(value) = get(ENV_USER_AGENT) {
            config.user_agent = value;
        }
        if let Some(value) = get(ENV_TIMEOUT_SECS) {
            config.request_timeout = Some(parse_timeout(ENV_TIMEOUT_SECS, value)?);
        }
        if let Some(value) = get(ENV_DB_PATH) {
            config.db_path = Some(PathBuf::from(value));
        }
        if let Some(value) = get(ENV_MAP_DIR) {
            config.map_dir = PathBuf::from(value);
        }
        if let Some(value) = get(ENV_LOG_LEVEL) {
            config.log_level = value;
        }
        if let Some(value) = get(ENV_LOG_DIR) {
            config.log_dir = PathBuf::from(value);
        }

        Ok(config)
    }

    /// Validates a caller-provided base URL override.
    pub fn set_wiki_base_url(&mut self, value: impl Into<String>) -> Result<(), ConfigError> {
        self.wiki_base_url = parse_base_url(ENV_WIKI_URL, value.into())?;
        Ok(())
    }

    /// Path of the standalone map for one location.
    pub fn single_map_path(&self, location: &str) -> PathBuf {
        self.map_dir
            .join(format!("{}.html", sanitize_file_stem(location)))
    }

    /// Path of the map with every record.
    pub fn common_map_path(&self) -> PathBuf {
        self.map_dir.join("common_map.html")
    }
}

fn parse_base_url(key: &'static str, value: String) -> Result<String, ConfigError> {
    match Url::parse(&value) {
        Ok(url) if !url.cannot_be_a_base() && matches!(url.scheme(), "http" | "https") => {
            Ok(value)
        }
        Ok(_) => Err(ConfigError {
            key,
            value,
            reason: "expected an http(s) base url".to_string(),
        }),
        Err(err) => Err(ConfigError {
            key,
            value,
            reason: err.to_string(),
        }),
    }
}

fn parse_timeout(key: &'static str, value: String) -> Result<Duration, ConfigError> {
    match value.parse::<u64>() {
        Ok(0) => Err(ConfigError {
            key,
            value,
            reason: "timeout must be positive".to_string(),
        }),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(err) => Err(ConfigError {
            key,
            value,
            reason: err.to_string(),
        }),
    }
}

fn sanitize_file_stem(value: &str) -> String {
    let stem: String = value
        .trim()
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            ch if ch.is_control() => '_',
            ch => ch,
        })
        .collect();
    match stem.trim_matches('.') {
        "" => "map".to_string(),
        trimmed => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ENV_DB_PATH, ENV_TIMEOUT_SECS, ENV_WIKI_URL};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_have_no_timeout_and_no_database() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.wiki_base_url, "https://pl.wikipedia.org");
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.db_path, None);
    }

    #[test]
    fn overrides_are_applied_and_blank_values_ignored() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_WIKI_URL, "https://en.wikipedia.org"),
            (ENV_TIMEOUT_SECS, "15"),
            (ENV_DB_PATH, "  "),
        ]))
        .unwrap();
        assert_eq!(config.wiki_base_url, "https://en.wikipedia.org");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.db_path, None);
    }

    #[test]
    fn malformed_values_name_their_key() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "soon")])).unwrap_err();
        assert_eq!(err.key, ENV_TIMEOUT_SECS);

        let err = AppConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "0")])).unwrap_err();
        assert!(err.reason.contains("positive"));

        let err = AppConfig::from_lookup(lookup(&[(ENV_WIKI_URL, "ftp://example.org")]))
            .unwrap_err();
        assert_eq!(err.key, ENV_WIKI_URL);
    }

    #[test]
    fn map_paths_sanitize_location_names() {
        let config = AppConfig {
            map_dir: PathBuf::from("out"),
            ..AppConfig::default()
        };
        assert_eq!(
            config.single_map_path("Warszawa"),
            PathBuf::from("out").join("Warszawa.html")
        );
        assert_eq!(
            config.single_map_path("../etc/passwd"),
            PathBuf::from("out").join("_etc_passwd.html")
        );
        assert_eq!(
            config.common_map_path(),
            PathBuf::from("out").join("common_map.html")
        );
    }
}
