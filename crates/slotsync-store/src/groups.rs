//! Typed read-only accessor for group snapshots.

use std::sync::Arc;

use crate::error::{StoreError, StoreResult};
use crate::records::GroupSnapshot;
use crate::store::Store;

/// Reads [`GroupSnapshot`]s under `groups/{groupId}`.
///
/// Group membership is owned by the CRUD layer; this engine only reads it.
#[derive(Clone)]
pub struct GroupStore {
    store: Arc<dyn Store>,
}

impl GroupStore {
    /// Creates a group accessor over the given store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Loads the group snapshot for `group_id`, if the group exists.
    pub async fn load(&self, group_id: &str) -> StoreResult<Option<GroupSnapshot>> {
        let path = format!("groups/{group_id}");
        match self.store.get(&path).await? {
            Some(value) => {
                let group = serde_json::from_value(value)
                    .map_err(|e| StoreError::serialization(&path, e))?;
                Ok(Some(group))
            }
            None => Ok(None),
        }
    }
}
