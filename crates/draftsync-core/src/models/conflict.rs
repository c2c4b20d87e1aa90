//! Field-level sync conflict model

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::form::{FieldValue, FormField};

/// A unique identifier for a recorded conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConflictId(Uuid);

impl ConflictId {
    /// Create a new unique conflict ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ConflictId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConflictId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side a resolved conflict kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictResolution {
    Local,
    Remote,
    Merge,
}

/// One field-level disagreement between the local and remote copies.
///
/// Created during reconciliation and resolved within the same pass; the
/// resolved record stays on the draft as an informational trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftConflict {
    pub id: ConflictId,
    pub field: FormField,
    pub local_value: FieldValue,
    pub remote_value: FieldValue,
    /// Unix ms when the divergence was observed
    pub detected_at: i64,
    pub resolved: bool,
    pub resolution: Option<ConflictResolution>,
}

impl DraftConflict {
    /// Record a freshly-detected, unresolved disagreement
    #[must_use]
    pub fn detected(
        field: FormField,
        local_value: FieldValue,
        remote_value: FieldValue,
        detected_at: i64,
    ) -> Self {
        Self {
            id: ConflictId::new(),
            field,
            local_value,
            remote_value,
            detected_at,
            resolved: false,
            resolution: None,
        }
    }

    /// Mark this conflict resolved with the chosen side
    pub fn resolve(&mut self, resolution: ConflictResolution) {
        self.resolved = true;
        self.resolution = Some(resolution);
    }
}
