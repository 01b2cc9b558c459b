//! The [`Store`] trait and its in-memory implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreResult;

/// Access to the shared hierarchical key-value store.
///
/// Paths are `/`-separated (`calendarTokens/u1`). Values are JSON trees.
/// Writes to the same path are last-write-wins; the store provides no
/// cross-path transactions and none are needed here.
#[async_trait]
pub trait Store: Send + Sync {
    /// Reads the value at `path`, if any.
    async fn get(&self, path: &str) -> StoreResult<Option<Value>>;

    /// Replaces the value at `path`.
    async fn set(&self, path: &str, value: Value) -> StoreResult<()>;

    /// Shallow-merges `patch` into the object at `path`.
    ///
    /// Fields present in `patch` overwrite the stored ones; fields absent
    /// from `patch` are left untouched. Writes `patch` as-is when nothing
    /// is stored at `path` yet.
    async fn update(&self, path: &str, patch: Value) -> StoreResult<()>;

    /// Removes the value at `path`. Removing an absent path is a no-op.
    async fn delete(&self, path: &str) -> StoreResult<()>;
}

/// In-memory [`Store`] used by tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, path: &str) -> StoreResult<Option<Value>> {
        Ok(self.entries.read().await.get(path).cloned())
    }

    async fn set(&self, path: &str, value: Value) -> StoreResult<()> {
        debug!(path, "store set");
        self.entries.write().await.insert(path.to_string(), value);
        Ok(())
    }

    async fn update(&self, path: &str, patch: Value) -> StoreResult<()> {
        debug!(path, "store update");
        let mut entries = self.entries.write().await;
        match entries.get_mut(path) {
            Some(Value::Object(existing)) => {
                if let Value::Object(fields) = patch {
                    for (key, value) in fields {
                        existing.insert(key, value);
                    }
                } else {
                    entries.insert(path.to_string(), patch);
                }
            }
            _ => {
                entries.insert(path.to_string(), patch);
            }
        }
        Ok(())
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        debug!(path, "store delete");
        self.entries.write().await.remove(path);
        Ok(())
    }
}
