use connectors::{error::AdapterError, sql::base::error::DbError};
use sink_config::error::ConfigError;
use sink_core::error::SinkError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to initialize the sink: {0}")]
    Sink(#[from] SinkError),

    #[error("Failed to create the adapter: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Connection check failed: {0}")]
    Ping(#[from] DbError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(serde_json::Error),

    #[error("{0} flush(es) reported an error")]
    FlushFailed(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_failure_message() {
        assert_eq!(
            CliError::FlushFailed(2).to_string(),
            "2 flush(es) reported an error"
        );
    }
}
