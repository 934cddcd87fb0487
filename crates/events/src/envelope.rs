use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stash_core::OwnerId;

use crate::event::Event;

/// Envelope for a published event, carrying owner + channel metadata.
///
/// Notes:
/// - `channel` names the notification channel of the owner kind
///   (e.g. "player.inventory"); subscribers filter on it.
/// - `event_type` is copied from the payload so consumers can route without
///   matching on the payload type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    owner_id: OwnerId,
    channel: String,
    event_type: String,
    occurred_at: DateTime<Utc>,
    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        owner_id: OwnerId,
        channel: impl Into<String>,
        event_type: impl Into<String>,
        occurred_at: DateTime<Utc>,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            owner_id,
            channel: channel.into(),
            event_type: event_type.into(),
            occurred_at,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn owner_id(&self) -> OwnerId {
        self.owner_id
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}

impl<E: Event> EventEnvelope<E> {
    /// Wrap a typed event, deriving type and time from the payload itself.
    pub fn wrap(owner_id: OwnerId, channel: impl Into<String>, payload: E) -> Self {
        Self::new(
            Uuid::now_v7(),
            owner_id,
            channel,
            payload.event_type(),
            payload.occurred_at(),
            payload,
        )
    }
}
