//! The synchronization coordinator: reconcile one draft with the remote
//! store, resolving field-level conflicts deterministically.

use crate::engine::resolve::choose_side;
use crate::engine::{DraftEngine, SyncResult};
use crate::error::{Error, Result};
use crate::models::{
    ConflictResolution, DraftConflict, DraftEvent, DraftEventType, DraftId, DraftState,
    DraftStatus, FormField,
};
use crate::remote::RemoteDraft;
use crate::util::now_ms;

impl DraftEngine {
    /// Reconcile one draft with the remote store.
    ///
    /// Fetches the remote copy, detects and resolves field conflicts when the
    /// remote has versions this client has not incorporated, then pushes the
    /// merged state. Remote failures are captured in the returned
    /// [`SyncResult`] and the draft's status, never propagated as `Err`;
    /// `Err` here means only that the draft id is unknown.
    ///
    /// The coordinator does not retry: the next timer tick or explicit save
    /// owns that.
    pub async fn sync_draft(&self, id: DraftId) -> Result<SyncResult> {
        let local = self
            .draft(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let remote_copy = match self.remote.fetch(id).await {
            Ok(copy) => copy,
            Err(err) => return Ok(self.sync_failed(id, &local, &err)),
        };

        let mut conflicts = Vec::new();
        let mut push_state = local;
        if let Some(remote) = &remote_copy {
            if remote.version > push_state.last_synced_version {
                conflicts = detect_conflicts(&push_state, remote);
                if !conflicts.is_empty() {
                    push_state = self.resolve_conflicts(id, remote, &mut conflicts)?;
                }
            }
        }

        let record = RemoteDraft::from_state(
            &push_state,
            self.identity.client_id,
            self.identity.session_id,
        );
        if let Err(err) = self.remote.upsert(&record).await {
            return Ok(self.sync_failed(id, &push_state, &err));
        }

        let now = now_ms();
        let synced = {
            let mut inner = self.state();
            let draft = inner.draft_mut(id)?;
            draft.last_synced_at = now;
            draft.last_synced_version = record.version.max(draft.last_synced_version);
            draft.conflicts = conflicts.clone();
            if draft.version == record.version {
                draft.status = DraftStatus::Synced;
            }
            // Otherwise a mutation landed while the push was in flight; the
            // draft stays Syncing and the scheduled pass will carry it.
            draft.clone()
        };

        self.persist_snapshot(&synced);
        self.emit(DraftEvent::record(
            id,
            DraftEventType::SyncCompleted,
            serde_json::json!({ "conflicts": conflicts.len() }),
            synced.owner_id.clone(),
            self.identity,
            synced.version,
        ));
        self.notify(&synced);

        Ok(SyncResult {
            success: true,
            conflicts,
            new_version: synced.version,
            synced_at: now,
            error: None,
        })
    }

    /// Resolve detected conflicts against the live draft and surface the
    /// transient `Conflict` status to subscribers.
    fn resolve_conflicts(
        &self,
        id: DraftId,
        remote: &RemoteDraft,
        conflicts: &mut Vec<DraftConflict>,
    ) -> Result<DraftState> {
        self.emit(DraftEvent::record(
            id,
            DraftEventType::ConflictDetected,
            serde_json::json!({
                "fields": conflicts.iter().map(|c| c.field).collect::<Vec<_>>(),
            }),
            remote.owner_id.clone(),
            self.identity,
            remote.version,
        ));

        let resolved = {
            let mut inner = self.state();
            let draft = inner.draft_mut(id)?;
            for conflict in conflicts.iter_mut() {
                let side = choose_side(conflict, draft.last_modified_at, remote.last_modified_at);
                if side == ConflictResolution::Remote {
                    draft
                        .form_data
                        .set(conflict.field, conflict.remote_value.clone())?;
                }
                conflict.resolve(side);
            }
            draft.status = DraftStatus::Conflict;
            draft.conflicts = conflicts.clone();
            draft.refresh_derived(now_ms());
            draft.clone()
        };

        self.notify(&resolved);
        self.emit(DraftEvent::record(
            id,
            DraftEventType::ConflictResolved,
            serde_json::json!({
                "resolutions": conflicts
                    .iter()
                    .map(|c| (c.field, c.resolution))
                    .collect::<Vec<_>>(),
            }),
            resolved.owner_id.clone(),
            self.identity,
            resolved.version,
        ));
        tracing::info!(
            draft_id = %id,
            conflicts = conflicts.len(),
            "resolved sync conflicts"
        );
        Ok(resolved)
    }

    /// Record a failed pass: flip the status, tell subscribers, and hand the
    /// error back inside the result so background timers never crash.
    fn sync_failed(&self, id: DraftId, last_known: &DraftState, err: &Error) -> SyncResult {
        let status = if err.is_offline() {
            DraftStatus::Offline
        } else {
            DraftStatus::Error
        };
        let failed = {
            let mut inner = self.state();
            inner.draft_mut(id).ok().map(|draft| {
                draft.status = status;
                draft.clone()
            })
        };
        if let Some(failed) = &failed {
            self.notify(failed);
        }
        tracing::warn!(draft_id = %id, %err, ?status, "sync failed");

        SyncResult {
            success: false,
            conflicts: Vec::new(),
            new_version: last_known.version,
            synced_at: last_known.last_synced_at,
            error: Some(err.to_string()),
        }
    }
}

/// Structurally compare every tracked field of the two copies
pub(crate) fn detect_conflicts(local: &DraftState, remote: &RemoteDraft) -> Vec<DraftConflict> {
    let now = now_ms();
    FormField::TRACKED
        .into_iter()
        .filter_map(|field| {
            let local_value = local.form_data.get(field);
            let remote_value = remote.form_data.get(field);
            (local_value != remote_value)
                .then(|| DraftConflict::detected(field, local_value, remote_value, now))
        })
        .collect()
}
