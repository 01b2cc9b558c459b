//! Typed accessor for appointment records.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::records::AppointmentRecord;
use crate::store::Store;

/// Reads appointments under `appointments/{uid}/{appointmentId}` and
/// maintains the weak link to an external calendar event.
#[derive(Clone)]
pub struct AppointmentStore {
    store: Arc<dyn Store>,
}

impl AppointmentStore {
    /// Creates an appointment accessor over the given store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn key(uid: &str, appointment_id: &str) -> String {
        format!("appointments/{uid}/{appointment_id}")
    }

    /// Loads the appointment owned by `uid`, if it exists.
    pub async fn load(
        &self,
        uid: &str,
        appointment_id: &str,
    ) -> StoreResult<Option<AppointmentRecord>> {
        let path = Self::key(uid, appointment_id);
        match self.store.get(&path).await? {
            Some(value) => {
                let record = serde_json::from_value(value)
                    .map_err(|e| StoreError::serialization(&path, e))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Records the external event id created for an appointment.
    ///
    /// Only the `googleEventId` field is touched.
    pub async fn link_event(
        &self,
        uid: &str,
        appointment_id: &str,
        event_id: &str,
    ) -> StoreResult<()> {
        debug!(uid, appointment_id, event_id, "linking calendar event");
        self.store
            .update(
                &Self::key(uid, appointment_id),
                json!({"googleEventId": event_id}),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn load_and_link() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                "appointments/u1/a1",
                json!({
                    "title": "standup",
                    "startsAt": "2025-02-05T09:00:00Z",
                    "endsAt": "2025-02-05T09:15:00Z",
                }),
            )
            .await
            .unwrap();

        let appointments = AppointmentStore::new(store);
        let record = appointments.load("u1", "a1").await.unwrap().unwrap();
        assert!(record.google_event_id.is_none());

        appointments.link_event("u1", "a1", "ev-42").await.unwrap();
        let record = appointments.load("u1", "a1").await.unwrap().unwrap();
        assert_eq!(record.google_event_id.as_deref(), Some("ev-42"));
    }

    #[tokio::test]
    async fn load_is_owner_scoped() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                "appointments/u1/a1",
                json!({
                    "title": "standup",
                    "startsAt": "2025-02-05T09:00:00Z",
                    "endsAt": "2025-02-05T09:15:00Z",
                }),
            )
            .await
            .unwrap();

        let appointments = AppointmentStore::new(store);
        assert!(appointments.load("u2", "a1").await.unwrap().is_none());
    }
}
