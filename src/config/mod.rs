// * Runtime configuration for the sync loop
// * The core only ever sees a `SyncConfig` value; environment lookups live in `from_env`
// * and are used by the binary alone.

pub mod constants;

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use constants::*;

// * Environment variable prefix for binary-level overrides
const ENV_PREFIX: &str = "PROXY_SYNC_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid URL for {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("Invalid number for {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("Table id must not be empty")]
    EmptyTableId,

    #[error("Unknown log format '{0}', expected json or pretty")]
    InvalidLogFormat(String),
}

/// Output format of the stdout tracing layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event
    #[default]
    Json,
    /// Multi-line human readable output for development
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(ConfigError::InvalidLogFormat(value.to_string())),
        }
    }
}

/// Complete configuration of one sync process
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Page listing the proxies
    pub source_url: String,
    /// Collection endpoint receiving the delete-all request
    pub delete_url: String,
    /// Batch endpoint receiving the insert request
    pub insert_url: String,
    /// `id` attribute identifying the proxy table
    pub table_id: String,
    /// Where the raw page is written each cycle; `None` disables snapshots
    pub snapshot_path: Option<PathBuf>,
    pub request_timeout: Duration,
    pub cooldown: Duration,
    pub cycle_interval: Duration,
    pub progress_tick: Duration,
    pub alert_after_failures: u32,
    pub log_level: String,
    pub log_format: LogFormat,
    pub log_dir: Option<PathBuf>,
    pub metrics_port: Option<u16>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source_url: SOURCE_URL.to_string(),
            delete_url: STORE_DELETE_URL.to_string(),
            insert_url: STORE_INSERT_URL.to_string(),
            table_id: PROXY_TABLE_ID.to_string(),
            snapshot_path: Some(PathBuf::from(SNAPSHOT_DIR).join(SNAPSHOT_FILE)),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            cooldown: Duration::from_secs(COOLDOWN_SECS),
            cycle_interval: Duration::from_secs(CYCLE_INTERVAL_SECS),
            progress_tick: Duration::from_secs(PROGRESS_TICK_SECS),
            alert_after_failures: ALERT_AFTER_FAILURES,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: LogFormat::default(),
            log_dir: None,
            metrics_port: None,
        }
    }
}

impl SyncConfig {
    /// Builds the configuration from defaults plus `PROXY_SYNC_*` overrides
    ///
    /// Recognised variables: `SOURCE_URL`, `DELETE_URL`, `INSERT_URL`, `TABLE_ID`,
    /// `SNAPSHOT_PATH` (`off` disables), `REQUEST_TIMEOUT_SECS`, `COOLDOWN_SECS`,
    /// `CYCLE_INTERVAL_SECS`, `PROGRESS_TICK_SECS`, `ALERT_AFTER_FAILURES`,
    /// `LOG_LEVEL`, `LOG_FORMAT` (`json` or `pretty`), `LOG_DIR`, `METRICS_PORT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    // * Shared by `from_env` and tests; `lookup` receives the unprefixed key
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("SOURCE_URL") {
            config.source_url = v;
        }
        if let Some(v) = lookup("DELETE_URL") {
            config.delete_url = v;
        }
        if let Some(v) = lookup("INSERT_URL") {
            config.insert_url = v;
        }
        if let Some(v) = lookup("TABLE_ID") {
            config.table_id = v;
        }
        if let Some(v) = lookup("SNAPSHOT_PATH") {
            config.snapshot_path = match v.trim() {
                "" | "off" => None,
                path => Some(PathBuf::from(path)),
            };
        }
        if let Some(v) = lookup("REQUEST_TIMEOUT_SECS") {
            config.request_timeout = parse_secs("REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("COOLDOWN_SECS") {
            config.cooldown = parse_secs("COOLDOWN_SECS", &v)?;
        }
        if let Some(v) = lookup("CYCLE_INTERVAL_SECS") {
            config.cycle_interval = parse_secs("CYCLE_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = lookup("PROGRESS_TICK_SECS") {
            config.progress_tick = parse_secs("PROGRESS_TICK_SECS", &v)?;
        }
        if let Some(v) = lookup("ALERT_AFTER_FAILURES") {
            config.alert_after_failures = parse_number("ALERT_AFTER_FAILURES", &v)?;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(v) = lookup("LOG_FORMAT") {
            config.log_format = v.parse()?;
        }
        if let Some(v) = lookup("LOG_DIR") {
            config.log_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("METRICS_PORT") {
            config.metrics_port = Some(parse_number("METRICS_PORT", &v)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks URLs, the table id and that every timing is non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("source_url", &self.source_url)?;
        check_url("delete_url", &self.delete_url)?;
        check_url("insert_url", &self.insert_url)?;

        if self.table_id.trim().is_empty() {
            return Err(ConfigError::EmptyTableId);
        }

        for (name, value) in [
            ("request_timeout", self.request_timeout),
            ("cooldown", self.cooldown),
            ("cycle_interval", self.cycle_interval),
            ("progress_tick", self.progress_tick),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroDuration(name));
            }
        }

        Ok(())
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
        }),
    }
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn parse_secs(field: &'static str, value: &str) -> Result<Duration, ConfigError> {
    parse_number::<u64>(field, value).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_constants() {
        let config = SyncConfig::default();
        assert_eq!(config.source_url, SOURCE_URL);
        assert_eq!(config.table_id, "proxylisttable");
        assert_eq!(config.cooldown, Duration::from_secs(120));
        assert_eq!(config.cycle_interval, Duration::from_secs(300));
        assert_eq!(
            config.snapshot_path,
            Some(PathBuf::from("/tmp/free-proxy-list/index.html"))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_applied() {
        let config = SyncConfig::from_lookup(lookup_from(&[
            ("COOLDOWN_SECS", "5"),
            ("METRICS_PORT", "9100"),
            ("SNAPSHOT_PATH", "off"),
            ("TABLE_ID", "list"),
        ]))
        .unwrap();

        assert_eq!(config.cooldown, Duration::from_secs(5));
        assert_eq!(config.metrics_port, Some(9100));
        assert_eq!(config.snapshot_path, None);
        assert_eq!(config.table_id, "list");
    }

    #[test]
    fn test_log_format_selection() {
        assert_eq!(SyncConfig::default().log_format, LogFormat::Json);

        let config = SyncConfig::from_lookup(lookup_from(&[("LOG_FORMAT", "Pretty")])).unwrap();
        assert_eq!(config.log_format, LogFormat::Pretty);

        let err = SyncConfig::from_lookup(lookup_from(&[("LOG_FORMAT", "xml")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogFormat(ref v) if v == "xml"));
    }

    #[test]
    fn test_invalid_number_rejected() {
        let err = SyncConfig::from_lookup(lookup_from(&[("COOLDOWN_SECS", "two")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { field: "COOLDOWN_SECS", .. }));
    }

    #[test]
    fn test_zero_duration_rejected() {
        let err = SyncConfig::from_lookup(lookup_from(&[("PROGRESS_TICK_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroDuration("progress_tick")));
    }

    #[test]
    fn test_non_http_url_rejected() {
        let err = SyncConfig::from_lookup(lookup_from(&[("DELETE_URL", "ftp://store/proxies")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { field: "delete_url", .. }));
    }
}
