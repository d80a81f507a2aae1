use crate::registry::{InstanceHandle, InstanceRegistry};
use futures::FutureExt;
use model::records::record::Record;
use sink_config::properties::Properties;
use sink_core::{error::SinkError, instance::SinkInstance};
use std::panic::AssertUnwindSafe;
use tracing::{error, info, warn};

/// Status codes returned to the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum HostStatus {
    Error = 0,
    Ok = 1,
}

impl HostStatus {
    pub fn code(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushResult {
    pub status: HostStatus,
    pub events_count: usize,
    pub batches_written: usize,
    pub batches_failed: usize,
}

impl FlushResult {
    fn error() -> Self {
        FlushResult {
            status: HostStatus::Error,
            events_count: 0,
            batches_written: 0,
            batches_failed: 0,
        }
    }
}

/// Entry points the host calls: `init` once per configured output, `flush`
/// per delivery and `exit` at shutdown. No call panics into the host.
#[derive(Default)]
pub struct OutputPlugin {
    registry: InstanceRegistry,
}

impl OutputPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn init(&self, props: &Properties) -> Result<InstanceHandle, SinkError> {
        let instance = SinkInstance::init(props).await?;
        Ok(self.attach(instance).await)
    }

    /// Registers an already initialized instance.
    pub async fn attach(&self, instance: SinkInstance) -> InstanceHandle {
        let instance_id = instance.id().to_string();
        let handle = self.registry.register(instance).await;
        info!(handle = %handle, instance_id = %instance_id, "Sink instance registered");
        handle
    }

    pub async fn flush<I>(&self, handle: InstanceHandle, records: I, tag: &str) -> FlushResult
    where
        I: IntoIterator<Item = Record>,
        I::IntoIter: Send,
    {
        let Some(instance) = self.registry.get(handle).await else {
            error!(handle = %handle, tag = %tag, "Flush for unknown instance");
            return FlushResult::error();
        };

        match AssertUnwindSafe(instance.flush(records, tag))
            .catch_unwind()
            .await
        {
            Ok(report) => FlushResult {
                status: if report.is_ok() {
                    HostStatus::Ok
                } else {
                    HostStatus::Error
                },
                events_count: report.events_count,
                batches_written: report.batches_written,
                batches_failed: report.batches_failed,
            },
            Err(_) => {
                error!(
                    handle = %handle,
                    instance_id = %instance.id(),
                    tag = %tag,
                    "Flush panicked"
                );
                FlushResult::error()
            }
        }
    }

    /// Closes every instance's pool. Returns `Error` if any close failed.
    pub async fn exit(&self) -> HostStatus {
        let mut status = HostStatus::Ok;

        for (handle, instance) in self.registry.drain().await {
            if let Err(e) = instance.shutdown().await {
                warn!(handle = %handle, instance_id = %instance.id(), error = %e, "Failed to close instance");
                status = HostStatus::Error;
            }
        }

        status
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }
}
