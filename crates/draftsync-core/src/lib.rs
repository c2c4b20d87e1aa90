//! draftsync-core - Local-first campaign draft engine
//!
//! An event-sourced draft store with optimistic local mutations, debounced
//! background synchronization against a remote store, and deterministic
//! field-level conflict resolution. Shared by every Draftsync interface.

pub mod cache;
pub mod engine;
pub mod error;
pub mod identity;
pub mod models;
pub mod remote;
pub mod util;

pub use engine::{
    DraftEngine, DraftQuery, EngineConfig, SortBy, SortOrder, Subscription, SyncResult,
};
pub use error::{Error, Result};
pub use identity::{ClientId, ClientIdentity, SessionId};
pub use models::{
    CampaignFormData, ConflictResolution, DraftConflict, DraftEvent, DraftEventType, DraftId,
    DraftState, DraftStatus, FieldValue, FormField,
};
