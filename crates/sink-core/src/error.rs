use connectors::{error::AdapterError, sql::base::error::DbError};
use sink_config::error::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Cannot reach the store: {0}")]
    Connectivity(#[source] DbError),

    #[error("Failed to discover schema of table '{table}': {reason}")]
    SchemaDiscovery { table: String, reason: String },

    #[error(transparent)]
    Coercion(#[from] CoercionError),

    #[error("Failed to execute row {row} of batch '{batch_id}': {source}")]
    RowExecution {
        batch_id: String,
        row: usize,
        #[source]
        source: DbError,
    },

    #[error("Failed to begin transaction for batch '{batch_id}': {source}")]
    Begin {
        batch_id: String,
        #[source]
        source: DbError,
    },

    #[error("Failed to prepare insert for batch '{batch_id}': {source}")]
    Prepare {
        batch_id: String,
        #[source]
        source: DbError,
    },

    #[error("Failed to commit batch '{batch_id}': {source}")]
    Commit {
        batch_id: String,
        #[source]
        source: DbError,
    },

    #[error("Failed to roll back batch '{batch_id}': {source}")]
    Rollback {
        batch_id: String,
        #[source]
        source: DbError,
    },

    #[error("Batch '{batch_id}' timed out after {timeout_ms} ms")]
    Timeout { batch_id: String, timeout_ms: u128 },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),
}

/// A single field that could not be turned into a bindable value.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Failed to coerce field '{field}': {cause}")]
pub struct CoercionError {
    pub field: String,
    pub cause: CoercionCause,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoercionCause {
    #[error("map key of kind '{0}' has no text form")]
    NonTextKey(&'static str),

    #[error("non-finite float cannot be encoded as JSON")]
    NonFiniteFloat,

    #[error("JSON encoding failed: {0}")]
    Json(String),
}
