use crate::{
    error::AdapterError,
    sql::{
        base::adapter::{DatabaseKind, SqlAdapter},
        mysql::adapter::{ConnectionSettings, MySqlAdapter},
    },
};
use std::sync::Arc;

#[derive(Clone)]
pub enum Adapter {
    MySql(MySqlAdapter),
}

impl Adapter {
    pub fn sql(kind: &DatabaseKind, settings: &ConnectionSettings) -> Result<Self, AdapterError> {
        match kind {
            DatabaseKind::MySql => Ok(Adapter::MySql(MySqlAdapter::from_settings(settings))),
            DatabaseKind::Other(name) => Err(AdapterError::UnsupportedDialect(name.clone())),
        }
    }

    pub fn from_url(kind: &DatabaseKind, url: &str) -> Result<Self, AdapterError> {
        match kind {
            DatabaseKind::MySql => Ok(Adapter::MySql(MySqlAdapter::from_url(url)?)),
            DatabaseKind::Other(name) => Err(AdapterError::UnsupportedDialect(name.clone())),
        }
    }

    pub fn into_sql(self) -> Arc<dyn SqlAdapter> {
        match self {
            Adapter::MySql(adapter) => Arc::new(adapter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_dialect() {
        let settings = ConnectionSettings {
            user: "root".into(),
            password: String::new(),
            host: "127.0.0.1".into(),
            port: 3306,
            database: "test_db".into(),
        };
        let kind: DatabaseKind = "postgres".parse().unwrap();
        assert!(matches!(
            Adapter::sql(&kind, &settings),
            Err(AdapterError::UnsupportedDialect(name)) if name == "postgres"
        ));
    }

    #[test]
    fn test_dialect_aliases() {
        assert_eq!("MySQL".parse::<DatabaseKind>().unwrap(), DatabaseKind::MySql);
        assert_eq!("mariadb".parse::<DatabaseKind>().unwrap(), DatabaseKind::MySql);
        assert!("".parse::<DatabaseKind>().is_err());
    }
}
