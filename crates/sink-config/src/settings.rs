use crate::{error::ConfigError, properties::Properties};
use connectors::sql::{base::adapter::DatabaseKind, mysql::adapter::ConnectionSettings};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, time::Duration};
use tracing::debug;

pub const DEFAULT_DIALECT: &str = "mysql";
pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:3306";
pub const DEFAULT_DATABASE: &str = "test_db";
pub const DEFAULT_TABLE: &str = "test";
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_LINGER: Duration = Duration::from_secs(60);
pub const DEFAULT_PORT: u16 = 3306;

/// What to bind when a field cannot be coerced for its column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoercionPolicy {
    /// Bind SQL NULL for the failing field, log a warning and keep the row.
    #[default]
    BindNull,
    /// Fail the whole batch before a transaction is opened.
    Abort,
}

impl FromStr for CoercionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "null" => Ok(CoercionPolicy::BindNull),
            "abort" => Ok(CoercionPolicy::Abort),
            _ => Err("expected 'null' or 'abort'".to_string()),
        }
    }
}

/// Validated settings for one sink instance.
#[derive(Clone)]
pub struct SinkConfig {
    pub dialect: DatabaseKind,
    pub user: String,
    pub password: String,
    pub address: String,
    pub database: String,
    pub table: String,
    pub batch_size: usize,
    pub ignore_columns: Vec<String>,
    pub linger: Duration,
    pub write_timeout: Option<Duration>,
    pub on_coercion_error: CoercionPolicy,
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig {
            dialect: DatabaseKind::MySql,
            user: DEFAULT_USER.to_string(),
            password: String::new(),
            address: DEFAULT_ADDRESS.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            table: DEFAULT_TABLE.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            ignore_columns: Vec::new(),
            linger: DEFAULT_LINGER,
            write_timeout: None,
            on_coercion_error: CoercionPolicy::default(),
        }
    }
}

impl SinkConfig {
    pub fn from_properties(props: &Properties) -> Result<Self, ConfigError> {
        let defaults = SinkConfig::default();

        let dialect_name = props.get("dialect").unwrap_or(DEFAULT_DIALECT);
        let dialect = match DatabaseKind::from_str(dialect_name) {
            Ok(DatabaseKind::MySql) => DatabaseKind::MySql,
            Ok(DatabaseKind::Other(name)) => return Err(ConfigError::UnsupportedDialect(name)),
            Err(reason) => return Err(ConfigError::invalid("dialect", dialect_name, reason)),
        };

        let batch_size = match props.get("batchSize") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(0) => return Err(ConfigError::invalid("batchSize", raw, "must be positive")),
                Ok(n) => n,
                Err(e) => return Err(ConfigError::invalid("batchSize", raw, e.to_string())),
            },
            None => defaults.batch_size,
        };

        let linger = match props.get("lingerDuration") {
            Some(raw) => parse_duration("lingerDuration", raw)?,
            None => defaults.linger,
        };

        let write_timeout = props
            .get("writeTimeout")
            .map(|raw| parse_duration("writeTimeout", raw))
            .transpose()?;

        let on_coercion_error = match props.get("onCoercionError") {
            Some(raw) => raw
                .parse::<CoercionPolicy>()
                .map_err(|reason| ConfigError::invalid("onCoercionError", raw, reason))?,
            None => defaults.on_coercion_error,
        };

        let ignore_columns = props
            .get("ignoreColumns")
            .map(|raw| raw.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        let config = SinkConfig {
            dialect,
            user: props.get("user").map(str::to_string).unwrap_or(defaults.user),
            password: props
                .get("password")
                .map(str::to_string)
                .unwrap_or(defaults.password),
            address: props
                .get("address")
                .map(str::to_string)
                .unwrap_or(defaults.address),
            database: props
                .get("database")
                .map(str::to_string)
                .unwrap_or(defaults.database),
            table: props.get("table").map(str::to_string).unwrap_or(defaults.table),
            batch_size,
            ignore_columns,
            linger,
            write_timeout,
            on_coercion_error,
        };

        // Surface a bad address at configuration time rather than on first connect.
        config.connection_settings()?;
        debug!(config = ?config, "Sink configuration loaded");

        Ok(config)
    }

    /// Splits `address` into host and port. The port defaults to 3306.
    pub fn host_and_port(&self) -> Result<(String, u16), ConfigError> {
        let address = self.address.as_str();
        let (host, port) = match address.rsplit_once(':') {
            // Bare IPv6 literal without a port.
            Some(_) if address.matches(':').count() > 1 && !address.starts_with('[') => {
                (address, DEFAULT_PORT)
            }
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|e| ConfigError::invalid("address", address, e.to_string()))?;
                (host, port)
            }
            None => (address, DEFAULT_PORT),
        };

        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(ConfigError::invalid("address", address, "empty host"));
        }

        Ok((host.to_string(), port))
    }

    pub fn connection_settings(&self) -> Result<ConnectionSettings, ConfigError> {
        let (host, port) = self.host_and_port()?;
        Ok(ConnectionSettings {
            user: self.user.clone(),
            password: self.password.clone(),
            host,
            port,
            database: self.database.clone(),
        })
    }

    /// Connection string with the password masked, for logs.
    pub fn dsn(&self) -> String {
        format!("{}:***@tcp({})/{}", self.user, self.address, self.database)
    }
}

impl fmt::Debug for SinkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkConfig")
            .field("dialect", &self.dialect)
            .field("dsn", &self.dsn())
            .field("table", &self.table)
            .field("batch_size", &self.batch_size)
            .field("ignore_columns", &self.ignore_columns)
            .field("linger", &self.linger)
            .field("write_timeout", &self.write_timeout)
            .field("on_coercion_error", &self.on_coercion_error)
            .finish()
    }
}

fn parse_duration(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(raw).map_err(|e| ConfigError::invalid(key, raw, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        Properties::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_defaults() {
        let config = SinkConfig::from_properties(&Properties::new()).unwrap();
        assert_eq!(config.dialect, DatabaseKind::MySql);
        assert_eq!(config.user, "root");
        assert_eq!(config.password, "");
        assert_eq!(config.database, "test_db");
        assert_eq!(config.table, "test");
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.linger, Duration::from_secs(60));
        assert!(config.write_timeout.is_none());
        assert!(config.ignore_columns.is_empty());
        assert_eq!(config.on_coercion_error, CoercionPolicy::BindNull);
        assert_eq!(config.host_and_port().unwrap(), ("127.0.0.1".to_string(), 3306));
    }

    #[test]
    fn test_overrides() {
        let config = SinkConfig::from_properties(&props(&[
            ("Dialect", "MariaDB"),
            ("Address", "db.internal:3307"),
            ("BatchSize", "25"),
            ("IgnoreColumns", " id  created_at "),
            ("LingerDuration", "500ms"),
            ("WriteTimeout", "5s"),
            ("OnCoercionError", "abort"),
        ]))
        .unwrap();

        assert_eq!(config.dialect, DatabaseKind::MySql);
        assert_eq!(config.batch_size, 25);
        assert_eq!(config.ignore_columns, vec!["id", "created_at"]);
        assert_eq!(config.linger, Duration::from_millis(500));
        assert_eq!(config.write_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.on_coercion_error, CoercionPolicy::Abort);

        let settings = config.connection_settings().unwrap();
        assert_eq!(settings.host, "db.internal");
        assert_eq!(settings.port, 3307);
    }

    #[test]
    fn test_empty_values_fall_back_to_defaults() {
        let config =
            SinkConfig::from_properties(&props(&[("table", ""), ("batchSize", "")])).unwrap();
        assert_eq!(config.table, "test");
        assert_eq!(config.batch_size, 100);
    }

    #[test]
    fn test_invalid_batch_size() {
        for raw in ["0", "-1", "ten"] {
            let err = SinkConfig::from_properties(&props(&[("batchSize", raw)])).unwrap_err();
            assert!(
                matches!(&err, ConfigError::InvalidValue { key, .. } if key == "batchSize"),
                "{raw}: {err}"
            );
        }
    }

    #[test]
    fn test_unsupported_dialect() {
        let err = SinkConfig::from_properties(&props(&[("dialect", "postgres")])).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedDialect(name) if name == "postgres"));
    }

    #[test]
    fn test_invalid_durations_and_policy() {
        assert!(SinkConfig::from_properties(&props(&[("lingerDuration", "soon")])).is_err());
        assert!(SinkConfig::from_properties(&props(&[("writeTimeout", "1 fortnight")])).is_err());
        assert!(SinkConfig::from_properties(&props(&[("onCoercionError", "skip")])).is_err());
    }

    #[test]
    fn test_address_forms() {
        let cases = [
            ("localhost", ("localhost", 3306)),
            ("[::1]:3310", ("::1", 3310)),
            ("::1", ("::1", 3306)),
        ];
        for (address, (host, port)) in cases {
            let config = SinkConfig {
                address: address.to_string(),
                ..SinkConfig::default()
            };
            assert_eq!(config.host_and_port().unwrap(), (host.to_string(), port));
        }

        let err = SinkConfig::from_properties(&props(&[("address", "db:port")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "address"));
    }

    #[test]
    fn test_dsn_and_debug_hide_password() {
        let config = SinkConfig::from_properties(&props(&[("password", "hunter2")])).unwrap();
        assert_eq!(config.dsn(), "root:***@tcp(127.0.0.1:3306)/test_db");
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
