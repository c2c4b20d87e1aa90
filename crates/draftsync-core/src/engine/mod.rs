//! The draft engine: state store, mutation API, subscriptions, and timers.
//!
//! One engine instance owns every draft of a session. Dependencies (remote
//! store, audit sink, snapshot cache) are constructor-injected so callers can
//! share a single instance explicitly instead of reaching for a global.
//!
//! All in-memory mutations are synchronous and run to completion; only the
//! remote calls inside [`DraftEngine::sync_draft`] and the debounce/periodic
//! timers suspend. Engine methods must be called from within a Tokio runtime
//! because mutations spawn timer and audit tasks.

mod query;
mod resolve;
mod sync;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub use query::{DraftQuery, SortBy, SortOrder};
pub use resolve::{policy_for, ResolutionPolicy};

use crate::cache::{draft_key, SnapshotCache};
use crate::error::{Error, Result};
use crate::identity::ClientIdentity;
use crate::models::{
    CampaignFormData, DraftConflict, DraftEvent, DraftEventType, DraftId, DraftState, DraftStatus,
    FieldValue, FormField,
};
use crate::remote::{EventSink, RemoteStore};
use crate::util::now_ms;

/// Default quiet period before an edit burst triggers a sync
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Default period of the background sync timer
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(30);

/// Engine timing configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Background sync period; `None` disables the periodic timer
    pub sync_interval: Option<Duration>,
    /// Trailing-edge debounce window for edit-triggered syncs
    pub debounce_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sync_interval: Some(DEFAULT_SYNC_INTERVAL),
            debounce_interval: DEFAULT_DEBOUNCE,
        }
    }
}

impl EngineConfig {
    /// Set the background sync period
    #[must_use]
    pub const fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = Some(interval);
        self
    }

    /// Disable background sync (debounced and explicit syncs only)
    #[must_use]
    pub const fn without_auto_sync(mut self) -> Self {
        self.sync_interval = None;
        self
    }

    /// Set the debounce window for edit-triggered syncs
    #[must_use]
    pub const fn with_debounce_interval(mut self, interval: Duration) -> Self {
        self.debounce_interval = interval;
        self
    }
}

/// Outcome of one synchronization pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    pub success: bool,
    /// Conflicts detected (and resolved) during this pass
    pub conflicts: Vec<DraftConflict>,
    pub new_version: u64,
    /// Unix ms of the completed sync, or the previous one on failure
    pub synced_at: i64,
    pub error: Option<String>,
}

type SubscriberFn = Arc<dyn Fn(&DraftState) + Send + Sync>;

struct EngineInner {
    drafts: HashMap<DraftId, DraftState>,
    events: Vec<DraftEvent>,
    subscribers: HashMap<DraftId, Vec<(u64, SubscriberFn)>>,
    next_token: u64,
    debounce_timers: HashMap<DraftId, JoinHandle<()>>,
    periodic_timers: HashMap<DraftId, JoinHandle<()>>,
}

impl EngineInner {
    fn draft_mut(&mut self, id: DraftId) -> Result<&mut DraftState> {
        self.drafts
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }
}

/// Event-sourced draft store with optimistic mutations and background sync.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct DraftEngine {
    inner: Arc<Mutex<EngineInner>>,
    remote: Arc<dyn RemoteStore>,
    sink: Option<Arc<dyn EventSink>>,
    cache: Arc<dyn SnapshotCache>,
    identity: ClientIdentity,
    config: EngineConfig,
}

impl DraftEngine {
    /// Create an engine with a fresh client identity
    #[must_use]
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        cache: Arc<dyn SnapshotCache>,
        config: EngineConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(EngineInner {
                drafts: HashMap::new(),
                events: Vec::new(),
                subscribers: HashMap::new(),
                next_token: 0,
                debounce_timers: HashMap::new(),
                periodic_timers: HashMap::new(),
            })),
            remote,
            sink: None,
            cache,
            identity: ClientIdentity::generate(),
            config,
        }
    }

    /// Forward every event to an external audit sink (fire-and-forget)
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Use a persisted client identity instead of a generated one
    #[must_use]
    pub fn with_identity(mut self, identity: ClientIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// The identity stamped onto this engine's events and upserts
    #[must_use]
    pub const fn identity(&self) -> ClientIdentity {
        self.identity
    }

    fn state(&self) -> MutexGuard<'_, EngineInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a new draft for `owner_id`, optionally seeded with form data.
    ///
    /// The draft starts at version 1 in [`DraftStatus::Creating`]; its
    /// background sync timer starts immediately.
    pub fn create_draft(
        &self,
        owner_id: impl Into<String>,
        initial: Option<CampaignFormData>,
    ) -> Result<DraftState> {
        let draft = DraftState::new(owner_id, initial);
        let id = draft.id;

        self.state().drafts.insert(id, draft.clone());
        self.persist_snapshot(&draft);
        self.emit(DraftEvent::record(
            id,
            DraftEventType::DraftCreated,
            serde_json::json!({ "initial": draft.form_data }),
            draft.owner_id.clone(),
            self.identity,
            draft.version,
        ));
        self.start_auto_sync(id);

        tracing::info!(draft_id = %id, owner = %draft.owner_id, "draft created");
        Ok(draft)
    }

    /// Apply one field edit optimistically and schedule a debounced sync.
    ///
    /// The mutation is visible to subscribers before this call returns;
    /// repeated calls within the debounce window collapse into one sync.
    pub fn update_field(
        &self,
        id: DraftId,
        field: FormField,
        value: impl Into<FieldValue>,
    ) -> Result<DraftState> {
        let value = value.into();
        let now = now_ms();

        let (updated, previous) = {
            let mut inner = self.state();
            let draft = inner.draft_mut(id)?;
            let previous = draft.form_data.get(field);
            draft.form_data.set(field, value.clone())?;
            draft.version += 1;
            draft.last_modified_at = now;
            draft.status = DraftStatus::Syncing;
            draft.refresh_derived(now);
            (draft.clone(), previous)
        };

        self.persist_snapshot(&updated);
        self.emit(DraftEvent::record(
            id,
            DraftEventType::FieldUpdated,
            serde_json::json!({
                "field": field,
                "value": value,
                "previous": previous,
            }),
            updated.owner_id.clone(),
            self.identity,
            updated.version,
        ));
        self.notify(&updated);
        self.schedule_debounced_sync(id);
        Ok(updated)
    }

    /// Move the wizard position and schedule a debounced sync
    pub fn set_step(&self, id: DraftId, step: u32) -> Result<DraftState> {
        let now = now_ms();
        let (updated, from) = {
            let mut inner = self.state();
            let draft = inner.draft_mut(id)?;
            let from = draft.current_step;
            draft.current_step = step;
            draft.version += 1;
            draft.last_modified_at = now;
            draft.status = DraftStatus::Syncing;
            draft.refresh_derived(now);
            (draft.clone(), from)
        };

        self.persist_snapshot(&updated);
        self.emit(DraftEvent::record(
            id,
            DraftEventType::StepChanged,
            serde_json::json!({ "from": from, "to": step }),
            updated.owner_id.clone(),
            self.identity,
            updated.version,
        ));
        self.notify(&updated);
        self.schedule_debounced_sync(id);
        Ok(updated)
    }

    /// Run an immediate, non-debounced sync at the user's request
    pub async fn manual_save(&self, id: DraftId) -> Result<SyncResult> {
        let updated = {
            let mut inner = self.state();
            if let Some(timer) = inner.debounce_timers.remove(&id) {
                timer.abort();
            }
            let draft = inner.draft_mut(id)?;
            draft.metadata.manual_save_count += 1;
            draft.clone()
        };

        self.emit(DraftEvent::record(
            id,
            DraftEventType::ManualSave,
            serde_json::json!({}),
            updated.owner_id.clone(),
            self.identity,
            updated.version,
        ));
        self.notify(&updated);
        self.sync_draft(id).await
    }

    /// Receive the full draft state on every transition.
    ///
    /// Callbacks run synchronously on the mutating call. The returned handle
    /// unsubscribes explicitly; dropping it keeps the subscription alive.
    pub fn subscribe(
        &self,
        id: DraftId,
        callback: impl Fn(&DraftState) + Send + Sync + 'static,
    ) -> Subscription {
        let mut inner = self.state();
        let token = inner.next_token;
        inner.next_token += 1;
        inner
            .subscribers
            .entry(id)
            .or_default()
            .push((token, Arc::new(callback)));
        Subscription {
            inner: Arc::clone(&self.inner),
            draft_id: id,
            token,
        }
    }

    /// Read the current working copy of a draft
    #[must_use]
    pub fn draft(&self, id: DraftId) -> Option<DraftState> {
        self.state().drafts.get(&id).cloned()
    }

    /// The audit log entries recorded for one draft, oldest first
    #[must_use]
    pub fn events(&self, id: DraftId) -> Vec<DraftEvent> {
        self.state()
            .events
            .iter()
            .filter(|event| event.draft_id == id)
            .cloned()
            .collect()
    }

    /// Filter, sort, and paginate the known drafts
    #[must_use]
    pub fn query_drafts(&self, query: &DraftQuery) -> Vec<DraftState> {
        let drafts: Vec<DraftState> = self.state().drafts.values().cloned().collect();
        query::run_query(drafts, query)
    }

    /// Reload persisted snapshots into the state store after a restart.
    ///
    /// Live drafts are never overwritten; unparseable snapshots are skipped
    /// with a warning. Restored drafts stay timer-less until touched. Returns
    /// the number of drafts restored.
    pub fn restore_from_cache(&self) -> Result<usize> {
        let mut restored = 0;
        for key in self.cache.keys()? {
            if !key.starts_with("draft_") {
                continue;
            }
            let Some(raw) = self.cache.get(&key)? else {
                continue;
            };
            match serde_json::from_str::<DraftState>(&raw) {
                Ok(draft) => {
                    let mut inner = self.state();
                    if !inner.drafts.contains_key(&draft.id) {
                        inner.drafts.insert(draft.id, draft);
                        restored += 1;
                    }
                }
                Err(err) => {
                    tracing::warn!(%key, %err, "skipping unparseable draft snapshot");
                }
            }
        }
        tracing::info!(restored, "restored drafts from snapshot cache");
        Ok(restored)
    }

    /// Abort all timers. Call when discarding a long-lived engine.
    pub fn shutdown(&self) {
        let mut inner = self.state();
        for (_, timer) in inner.debounce_timers.drain() {
            timer.abort();
        }
        for (_, timer) in inner.periodic_timers.drain() {
            timer.abort();
        }
    }

    /// Persist a snapshot, logging and swallowing failures: the in-memory
    /// copy remains authoritative for the session.
    fn persist_snapshot(&self, draft: &DraftState) {
        let result = serde_json::to_string(draft)
            .map_err(Error::from)
            .and_then(|json| self.cache.set(&draft_key(draft.id), &json));
        if let Err(err) = result {
            tracing::warn!(draft_id = %draft.id, %err, "failed to persist draft snapshot");
        }
    }

    /// Append to the in-memory log and forward to the audit sink.
    ///
    /// Sink writes are fire-and-forget so mutations stay synchronous.
    fn emit(&self, event: DraftEvent) {
        if let Some(sink) = &self.sink {
            let sink = Arc::clone(sink);
            let event = event.clone();
            tokio::spawn(async move {
                if let Err(err) = sink.append(&event).await {
                    tracing::warn!(event_id = %event.id, %err, "audit sink append failed");
                }
            });
        }
        self.state().events.push(event);
    }

    /// Invoke subscribers outside the state lock so callbacks may re-enter
    /// the engine.
    fn notify(&self, draft: &DraftState) {
        let callbacks: Vec<SubscriberFn> = {
            let inner = self.state();
            inner
                .subscribers
                .get(&draft.id)
                .map(|subs| subs.iter().map(|(_, cb)| Arc::clone(cb)).collect())
                .unwrap_or_default()
        };
        for callback in callbacks {
            callback(draft);
        }
    }

    /// Trailing-edge debounce: cancel any pending timer for this draft and
    /// start a fresh one.
    fn schedule_debounced_sync(&self, id: DraftId) {
        let engine = self.clone();
        let delay = self.config.debounce_interval;
        let mut inner = self.state();
        if let Some(timer) = inner.debounce_timers.remove(&id) {
            timer.abort();
        }
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            engine.debounce_fired(id).await;
        });
        inner.debounce_timers.insert(id, handle);
    }

    /// The quiet period elapsed: count an autosave and run the sync pass
    async fn debounce_fired(&self, id: DraftId) {
        let autosaved = {
            let mut inner = self.state();
            inner.debounce_timers.remove(&id);
            let Ok(draft) = inner.draft_mut(id) else {
                return;
            };
            draft.metadata.auto_save_count += 1;
            draft.clone()
        };

        self.emit(DraftEvent::record(
            id,
            DraftEventType::AutosaveTriggered,
            serde_json::json!({ "auto_save_count": autosaved.metadata.auto_save_count }),
            autosaved.owner_id.clone(),
            self.identity,
            autosaved.version,
        ));
        if let Err(err) = self.sync_draft(id).await {
            tracing::warn!(draft_id = %id, %err, "debounced sync failed");
        }
    }

    /// Start the periodic background sync for a draft, at most once
    fn start_auto_sync(&self, id: DraftId) {
        let Some(period) = self.config.sync_interval else {
            return;
        };
        let mut inner = self.state();
        if inner.periodic_timers.contains_key(&id) {
            return;
        }
        let engine = self.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; skip it so the timer
            // fires one full period after creation.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match engine.draft(id).map(|draft| draft.status) {
                    // Draft removed; stop the timer.
                    None => break,
                    // A sync is already in flight or scheduled.
                    Some(DraftStatus::Syncing) => {}
                    Some(_) => {
                        if let Err(err) = engine.sync_draft(id).await {
                            tracing::warn!(draft_id = %id, %err, "background sync failed");
                            break;
                        }
                    }
                }
            }
        });
        inner.periodic_timers.insert(id, handle);
    }
}

/// Handle for one registered subscriber
pub struct Subscription {
    inner: Arc<Mutex<EngineInner>>,
    draft_id: DraftId,
    token: u64,
}

impl Subscription {
    /// Stop receiving notifications. Calling this more than once is a no-op.
    pub fn unsubscribe(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(subs) = inner.subscribers.get_mut(&self.draft_id) {
            subs.retain(|(token, _)| *token != self.token);
        }
    }
}
