use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope for a published message: identity + publish time + payload.
///
/// The id is a UUIDv7, so envelopes sort by publish order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<E> {
    event_id: Uuid,
    published_at: DateTime<Utc>,
    payload: E,
}

impl<E> Envelope<E> {
    pub fn new(payload: E) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            published_at: Utc::now(),
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
