//! Append-only draft event model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::{ClientId, ClientIdentity, SessionId};
use crate::models::draft::DraftId;
use crate::util::now_ms;

/// A unique identifier for an event, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    /// Create a new unique event ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The kinds of state transition a draft can record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DraftEventType {
    DraftCreated,
    FieldUpdated,
    StepChanged,
    AutosaveTriggered,
    ManualSave,
    SyncCompleted,
    ConflictDetected,
    ConflictResolved,
}

/// An immutable fact describing one draft state transition.
///
/// Events are append-only; they are never mutated or deleted and form the
/// audit trail for "what happened and in what order" across writers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftEvent {
    pub id: EventId,
    pub draft_id: DraftId,
    pub event_type: DraftEventType,
    /// Opaque per-type details (old/new values, conflict counts, ...)
    pub payload: serde_json::Value,
    /// Unix ms at the time of the transition
    pub timestamp: i64,
    pub owner_id: String,
    pub session_id: SessionId,
    pub client_id: ClientId,
    /// Draft version after the transition
    pub version: u64,
}

impl DraftEvent {
    /// Record a transition stamped with the writer's identity
    #[must_use]
    pub fn record(
        draft_id: DraftId,
        event_type: DraftEventType,
        payload: serde_json::Value,
        owner_id: impl Into<String>,
        identity: ClientIdentity,
        version: u64,
    ) -> Self {
        Self {
            id: EventId::new(),
            draft_id,
            event_type,
            payload,
            timestamp: now_ms(),
            owner_id: owner_id.into(),
            session_id: identity.session_id,
            client_id: identity.client_id,
            version,
        }
    }
}
