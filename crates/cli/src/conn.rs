use crate::error::CliError;
use connectors::adapter::Adapter;
use sink_config::settings::SinkConfig;
use tracing::{error, info};

/// Pings the configured store once and releases the pool.
pub async fn ping(config: &SinkConfig) -> Result<(), CliError> {
    info!(dsn = %config.dsn(), "Pinging {}", config.dialect);

    let adapter = Adapter::sql(&config.dialect, &config.connection_settings()?)?.into_sql();
    let result = adapter.ping().await;

    if let Err(e) = adapter.close().await {
        error!(error = %e, "Failed to close connection pool");
    }

    match result {
        Ok(()) => {
            info!(dsn = %config.dsn(), "Connection OK");
            Ok(())
        }
        Err(e) => {
            error!(dsn = %config.dsn(), error = %e, "Connection failed");
            Err(e.into())
        }
    }
}
