//! Draft state model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::conflict::DraftConflict;
use crate::models::form::{CampaignFormData, FormField};
use crate::util::{now_ms, word_count};

/// A unique identifier for a draft, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DraftId(Uuid);

impl DraftId {
    /// Create a new unique draft ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for DraftId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DraftId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Where a draft sits in its synchronization lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DraftStatus {
    /// Built locally, first sync not yet completed
    Creating,
    /// A sync is in flight or scheduled for pending local edits
    Syncing,
    /// Last sync succeeded with no unresolved conflicts
    Synced,
    /// Last sync detected (and auto-resolved) field disagreements
    Conflict,
    /// Remote store unreachable; edits continue locally
    Offline,
    /// Last sync failed for a non-connectivity reason
    Error,
}

/// Derived per-draft statistics, recomputed on every mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftMetadata {
    /// Operating system of the writing client
    pub device_os: String,
    /// Library identification, the closest analog of a browser user agent
    pub client_agent: String,
    /// Milliseconds since the draft was created in this session
    pub session_duration_ms: i64,
    /// Word count of the description field
    pub word_count: usize,
    /// Share of required fields filled in, 0-100
    pub completion_percentage: u8,
    /// Syncs triggered by the debounce timer
    pub auto_save_count: u32,
    /// Syncs triggered explicitly by the user
    pub manual_save_count: u32,
}

/// Fields that must be filled for a draft to count as complete
const REQUIRED_FIELDS: [FormField; 4] = [
    FormField::Title,
    FormField::Description,
    FormField::BitcoinAddress,
    FormField::GoalAmount,
];

impl DraftMetadata {
    /// Build metadata for a fresh draft
    #[must_use]
    pub fn new(form: &CampaignFormData) -> Self {
        Self {
            device_os: std::env::consts::OS.to_string(),
            client_agent: concat!("draftsync-core/", env!("CARGO_PKG_VERSION")).to_string(),
            session_duration_ms: 0,
            word_count: word_count(&form.description),
            completion_percentage: completion_percentage(form),
            auto_save_count: 0,
            manual_save_count: 0,
        }
    }

    /// Recompute the derived statistics after a form mutation
    pub fn recompute(&mut self, form: &CampaignFormData, created_at: i64, now: i64) {
        self.word_count = word_count(&form.description);
        self.completion_percentage = completion_percentage(form);
        self.session_duration_ms = (now - created_at).max(0);
    }
}

/// Percentage of required fields that are filled in
#[must_use]
pub fn completion_percentage(form: &CampaignFormData) -> u8 {
    let completed = REQUIRED_FIELDS
        .iter()
        .filter(|field| form.get(**field).is_present())
        .count();
    u8::try_from(completed * 100 / REQUIRED_FIELDS.len()).unwrap_or(100)
}

/// The authoritative working copy of one in-progress campaign form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftState {
    /// Unique identifier, assigned at creation
    pub id: DraftId,
    /// User who owns this draft (immutable)
    pub owner_id: String,
    /// Display title, falls back to a placeholder while the form is empty
    pub title: String,
    /// The business payload being edited
    pub form_data: CampaignFormData,
    /// Position within the multi-step wizard
    pub current_step: u32,
    /// Logical clock, incremented on every local mutation
    pub version: u64,
    /// Remote version last incorporated by this client
    pub last_synced_version: u64,
    /// Synchronization lifecycle state
    pub status: DraftStatus,
    /// Derived statistics
    pub metadata: DraftMetadata,
    /// Field-level conflicts from the most recent reconciliation
    pub conflicts: Vec<DraftConflict>,
    /// Unix ms of the last successful sync (0 before the first)
    pub last_synced_at: i64,
    /// Unix ms of the last local mutation
    pub last_modified_at: i64,
    /// Unix ms of creation
    pub created_at: i64,
}

/// Placeholder title until the user names the campaign
pub const UNTITLED: &str = "Untitled Campaign";

impl DraftState {
    /// Build a new draft for `owner_id`, optionally seeded with form data
    #[must_use]
    pub fn new(owner_id: impl Into<String>, initial: Option<CampaignFormData>) -> Self {
        let form_data = initial.unwrap_or_default();
        let now = now_ms();
        Self {
            id: DraftId::new(),
            owner_id: owner_id.into(),
            title: display_title(&form_data),
            metadata: DraftMetadata::new(&form_data),
            form_data,
            current_step: 1,
            version: 1,
            last_synced_version: 0,
            status: DraftStatus::Creating,
            conflicts: Vec::new(),
            last_synced_at: 0,
            last_modified_at: now,
            created_at: now,
        }
    }

    /// Refresh the display title and derived metadata after a form change
    pub fn refresh_derived(&mut self, now: i64) {
        self.title = display_title(&self.form_data);
        self.metadata
            .recompute(&self.form_data, self.created_at, now);
    }
}

fn display_title(form: &CampaignFormData) -> String {
    if form.title.trim().is_empty() {
        UNTITLED.to_string()
    } else {
        form.title.clone()
    }
}
