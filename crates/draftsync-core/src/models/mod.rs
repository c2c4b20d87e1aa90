//! Data models for Draftsync

mod conflict;
mod draft;
mod event;
mod form;

pub use conflict::{ConflictId, ConflictResolution, DraftConflict};
pub use draft::{completion_percentage, DraftId, DraftMetadata, DraftState, DraftStatus, UNTITLED};
pub use event::{DraftEvent, DraftEventType, EventId};
pub use form::{CampaignFormData, FieldValue, FormField};
