use serde::{Deserialize, Serialize};
use sink_core::instance::SinkInstance;
use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tokio::sync::RwLock;

/// Opaque identifier the host keeps for an initialized instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceHandle(u64);

impl InstanceHandle {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for InstanceHandle {
    fn from(value: u64) -> Self {
        InstanceHandle(value)
    }
}

impl fmt::Display for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Live sink instances keyed by handle. Handles are never reused.
#[derive(Default)]
pub struct InstanceRegistry {
    next: AtomicU64,
    instances: RwLock<HashMap<InstanceHandle, Arc<SinkInstance>>>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, instance: SinkInstance) -> InstanceHandle {
        let handle = InstanceHandle(self.next.fetch_add(1, Ordering::Relaxed));
        self.instances
            .write()
            .await
            .insert(handle, Arc::new(instance));
        handle
    }

    pub async fn get(&self, handle: InstanceHandle) -> Option<Arc<SinkInstance>> {
        self.instances.read().await.get(&handle).cloned()
    }

    pub async fn remove(&self, handle: InstanceHandle) -> Option<Arc<SinkInstance>> {
        self.instances.write().await.remove(&handle)
    }

    /// Removes every instance, in handle order.
    pub async fn drain(&self) -> Vec<(InstanceHandle, Arc<SinkInstance>)> {
        let mut drained: Vec<_> = self.instances.write().await.drain().collect();
        drained.sort_by_key(|(handle, _)| *handle);
        drained
    }

    pub async fn len(&self) -> usize {
        self.instances.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.instances.read().await.is_empty()
    }
}
