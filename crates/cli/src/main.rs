use crate::error::CliError;
use clap::Parser;
use commands::Commands;
use model::records::record::Record;
use sink_config::{properties::Properties, settings::SinkConfig};
use sink_core::instance::SinkInstance;
use sink_host::{
    plugin::{HostStatus, OutputPlugin},
    registry::InstanceHandle,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod conn;
mod error;
mod input;
mod shutdown;

#[derive(Parser)]
#[command(
    name = "logsink",
    version = "0.1.0",
    about = "Batched, schema-aware log output to MySQL"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Logs go to stderr, stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            tag,
            chunk_size,
        } => {
            let props = Properties::load_from_file(&config)?;
            info!(config = %config, properties = ?props.redacted(), "Loaded output properties");

            let plugin = OutputPlugin::new();
            let handle = plugin.init(&props).await?;

            let cancel = CancellationToken::new();
            shutdown::cancel_on_signal(cancel.clone());

            let failed = pump_stdin(&plugin, handle, &tag, chunk_size.max(1), &cancel).await?;

            if plugin.exit().await == HostStatus::Error {
                warn!("Some instances did not shut down cleanly");
            }

            if cancel.is_cancelled() {
                std::process::exit(shutdown::INTERRUPTED_EXIT_CODE);
            }
            if failed > 0 {
                error!(failed_flushes = failed, "Finished with errors");
                return Err(CliError::FlushFailed(failed));
            }
        }
        Commands::Describe { config, json } => {
            let props = Properties::load_from_file(&config)?;
            let instance = SinkInstance::init(&props).await?;
            let schema = instance.schema().clone();
            instance.shutdown().await?;

            if json {
                let json = serde_json::to_string_pretty(&schema).map_err(CliError::JsonSerialize)?;
                println!("{json}");
            } else {
                println!("Table '{}':", schema.table);
                println!("-----------------------------");
                for column in &schema.columns {
                    println!("{:<24} {:<20} {}", column.name, column.column_type, column.category);
                }
                println!();
                println!("{}", schema.insert_sql);
            }
        }
        Commands::TestConn { config } => {
            let props = Properties::load_from_file(&config)?;
            let config = SinkConfig::from_properties(&props)?;
            conn::ping(&config).await?;
        }
    }

    Ok(())
}

/// Reads records from stdin and delivers them in chunks. Returns the number
/// of flushes that reported an error.
async fn pump_stdin(
    plugin: &OutputPlugin,
    handle: InstanceHandle,
    tag: &str,
    chunk_size: usize,
    cancel: &CancellationToken,
) -> Result<usize, CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut chunk: Vec<Record> = Vec::with_capacity(chunk_size);
    let mut line_num = 0usize;
    let mut failed = 0usize;

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            debug!("End of input");
            break;
        };
        line_num += 1;

        match input::parse_line(&line) {
            Ok(Some(record)) => chunk.push(record),
            Ok(None) => {}
            Err(reason) => {
                warn!(line = line_num, reason = %reason, "Skipping undecodable input line");
            }
        }

        if chunk.len() >= chunk_size {
            failed += deliver(plugin, handle, tag, std::mem::take(&mut chunk)).await;
        }
    }

    if !chunk.is_empty() {
        failed += deliver(plugin, handle, tag, chunk).await;
    }

    Ok(failed)
}

async fn deliver(plugin: &OutputPlugin, handle: InstanceHandle, tag: &str, chunk: Vec<Record>) -> usize {
    let result = plugin.flush(handle, chunk, tag).await;
    match result.status {
        HostStatus::Ok => 0,
        HostStatus::Error => 1,
    }
}
