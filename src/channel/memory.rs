//! In-memory configuration channel.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

use crate::channel::types::{ChannelResult, ConfigurationReadChannel, ConfigurationWriteChannel};

/// A thread-safe key → document map implementing both channel directions.
///
/// Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryChannel {
    inner: Arc<DashMap<String, Value>>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a key without going through `publish`.
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.inner.insert(key.into(), value);
    }

    /// Current value for a key.
    pub fn value(&self, key: &str) -> Option<Value> {
        self.inner.get(key).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl ConfigurationReadChannel for MemoryChannel {
    async fn get(&self, key: &str) -> ChannelResult<Option<Value>> {
        Ok(self.value(key))
    }
}

#[async_trait]
impl ConfigurationWriteChannel for MemoryChannel {
    async fn publish(&self, key: &str, value: &Value) -> ChannelResult<()> {
        self.inner.insert(key.to_string(), value.clone());
        tracing::debug!(key = %key, "Stored configuration in memory");
        Ok(())
    }
}
