//! In-process remote store and event sink.
//!
//! Backs local-only mode and the test suite. The offline switch makes every
//! call fail with a connectivity-style error so status transitions can be
//! exercised deterministically.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::{DraftEvent, DraftId};
use crate::remote::{EventSink, RemoteDraft, RemoteStore};

/// Remote store backed by a process-local map
#[derive(Debug, Default)]
pub struct MemoryRemoteStore {
    drafts: Mutex<HashMap<DraftId, RemoteDraft>>,
    offline: AtomicBool,
    upserts: AtomicUsize,
}

impl MemoryRemoteStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate losing (or regaining) connectivity
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of upserts accepted so far
    pub fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    /// Seed or overwrite a remote copy directly (acts as "another client")
    pub fn put(&self, draft: RemoteDraft) {
        let mut drafts = self.drafts.lock().unwrap_or_else(PoisonError::into_inner);
        drafts.insert(draft.id, draft);
    }

    /// Read a remote copy without going through the trait
    pub fn get(&self, id: DraftId) -> Option<RemoteDraft> {
        let drafts = self.drafts.lock().unwrap_or_else(PoisonError::into_inner);
        drafts.get(&id).cloned()
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(Error::Unreachable("remote store offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn fetch(&self, id: DraftId) -> Result<Option<RemoteDraft>> {
        self.check_online()?;
        Ok(self.get(id))
    }

    async fn upsert(&self, draft: &RemoteDraft) -> Result<()> {
        self.check_online()?;
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.put(draft.clone());
        Ok(())
    }
}

/// Event sink collecting events in memory
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<DraftEvent>>,
}

impl MemoryEventSink {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything appended so far, in arrival order
    pub fn events(&self) -> Vec<DraftEvent> {
        let events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        events.clone()
    }
}

#[async_trait]
impl EventSink for MemoryEventSink {
    async fn append(&self, event: &DraftEvent) -> Result<()> {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        events.push(event.clone());
        Ok(())
    }
}
