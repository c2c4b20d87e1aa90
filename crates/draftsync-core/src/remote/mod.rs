//! Remote store and audit sink contracts.
//!
//! The remote store holds the last-synchronized copy of each draft and is the
//! arbiter when two clients disagree; the audit sink receives every event,
//! write-only. Both are injected into the engine as trait objects.

mod http;
mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use http::HttpRemoteStore;
pub use memory::{MemoryEventSink, MemoryRemoteStore};

use crate::error::Result;
use crate::identity::{ClientId, SessionId};
use crate::models::{CampaignFormData, DraftEvent, DraftId, DraftMetadata, DraftState};

/// The wire record held by the remote store, one per draft id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDraft {
    pub id: DraftId,
    pub owner_id: String,
    pub title: String,
    pub form_data: CampaignFormData,
    pub current_step: u32,
    pub version: u64,
    pub metadata: DraftMetadata,
    /// Unix ms of the writer's last local mutation
    pub last_modified_at: i64,
    /// Client that produced this copy
    pub client_id: ClientId,
    /// Session that produced this copy
    pub session_id: SessionId,
}

impl RemoteDraft {
    /// Snapshot a local draft into its wire form, stamped with the writer
    #[must_use]
    pub fn from_state(draft: &DraftState, client_id: ClientId, session_id: SessionId) -> Self {
        Self {
            id: draft.id,
            owner_id: draft.owner_id.clone(),
            title: draft.title.clone(),
            form_data: draft.form_data.clone(),
            current_step: draft.current_step,
            version: draft.version,
            metadata: draft.metadata.clone(),
            last_modified_at: draft.last_modified_at,
            client_id,
            session_id,
        }
    }
}

/// Point read / upsert access to the last-synchronized draft copies
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the remote copy, `None` when the draft has never been pushed
    async fn fetch(&self, id: DraftId) -> Result<Option<RemoteDraft>>;

    /// Create or replace the remote copy
    async fn upsert(&self, draft: &RemoteDraft) -> Result<()>;
}

/// Append-only audit sink for draft events
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Append one event; the engine treats failures as non-fatal
    async fn append(&self, event: &DraftEvent) -> Result<()>;
}
