//! End-to-end engine tests: optimistic mutations, debounce coalescing,
//! conflict resolution, offline handling, and crash recovery.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;

use draftsync_core::cache::{MemoryCache, SnapshotCache};
use draftsync_core::remote::{MemoryEventSink, MemoryRemoteStore, RemoteDraft};
use draftsync_core::{
    CampaignFormData, ClientIdentity, ConflictResolution, DraftEngine, DraftEventType, DraftQuery,
    DraftStatus, EngineConfig, FormField, SortBy, SortOrder,
};

struct Harness {
    engine: DraftEngine,
    remote: Arc<MemoryRemoteStore>,
    sink: Arc<MemoryEventSink>,
    cache: Arc<MemoryCache>,
}

fn harness(config: EngineConfig) -> Harness {
    let remote = Arc::new(MemoryRemoteStore::new());
    let sink = Arc::new(MemoryEventSink::new());
    let cache = Arc::new(MemoryCache::new());
    let engine = DraftEngine::new(remote.clone(), cache.clone(), config)
        .with_event_sink(sink.clone());
    Harness {
        engine,
        remote,
        sink,
        cache,
    }
}

fn quiet_config() -> EngineConfig {
    EngineConfig::default()
        .without_auto_sync()
        .with_debounce_interval(Duration::from_millis(50))
}

/// Simulate another client bumping the remote copy of a draft.
fn remote_write(
    remote: &MemoryRemoteStore,
    base: &RemoteDraft,
    mutate: impl FnOnce(&mut RemoteDraft),
) {
    let other = ClientIdentity::generate();
    let mut copy = base.clone();
    copy.client_id = other.client_id;
    copy.session_id = other.session_id;
    copy.version += 1;
    mutate(&mut copy);
    remote.put(copy);
}

#[tokio::test]
async fn updates_are_last_write_wins_and_version_counts_calls() {
    let h = harness(quiet_config());
    let draft = h.engine.create_draft("u1", None).unwrap();

    h.engine
        .update_field(draft.id, FormField::Title, "first")
        .unwrap();
    h.engine
        .update_field(draft.id, FormField::Title, "second")
        .unwrap();
    h.engine
        .update_field(draft.id, FormField::GoalAmount, 1_000u64)
        .unwrap();
    let latest = h
        .engine
        .update_field(draft.id, FormField::Title, "final")
        .unwrap();

    assert_eq!(latest.form_data.title, "final");
    assert_eq!(latest.form_data.goal_amount, 1_000);
    assert_eq!(latest.version, draft.version + 4);
    assert_eq!(latest.status, DraftStatus::Syncing);
}

#[tokio::test]
async fn update_on_unknown_draft_is_not_found() {
    let h = harness(quiet_config());
    let missing = draftsync_core::DraftId::new();
    let err = h
        .engine
        .update_field(missing, FormField::Title, "x")
        .unwrap_err();
    assert!(matches!(err, draftsync_core::Error::NotFound(_)));
}

#[tokio::test]
async fn debounce_coalesces_edit_bursts_into_one_sync() {
    let h = harness(quiet_config());
    let draft = h.engine.create_draft("u1", None).unwrap();

    for i in 0..5 {
        h.engine
            .update_field(draft.id, FormField::Title, format!("title {i}"))
            .unwrap();
    }
    tokio::time::sleep(Duration::from_millis(250)).await;

    assert_eq!(h.remote.upsert_count(), 1);
    let synced = h.engine.draft(draft.id).unwrap();
    assert_eq!(synced.status, DraftStatus::Synced);
    assert_eq!(synced.form_data.title, "title 4");
    assert_eq!(synced.metadata.auto_save_count, 1);
}

#[tokio::test]
async fn sync_is_idempotent_without_changes() {
    let h = harness(quiet_config());
    let draft = h.engine.create_draft("u1", None).unwrap();

    let first = h.engine.sync_draft(draft.id).await.unwrap();
    let second = h.engine.sync_draft(draft.id).await.unwrap();

    assert!(first.success);
    assert!(second.success);
    assert_eq!(first.conflicts, Vec::new());
    assert_eq!(second.conflicts, Vec::new());
    assert_eq!(h.engine.draft(draft.id).unwrap().status, DraftStatus::Synced);
}

#[tokio::test]
async fn longer_remote_title_wins_and_is_marked_remote() {
    let h = harness(quiet_config());
    let draft = h.engine.create_draft("u1", None).unwrap();
    h.engine.sync_draft(draft.id).await.unwrap();

    let base = h.remote.get(draft.id).unwrap();
    remote_write(&h.remote, &base, |copy| {
        copy.form_data.title = "ABCDE".to_string();
    });
    h.engine
        .update_field(draft.id, FormField::Title, "A")
        .unwrap();

    let result = h.engine.sync_draft(draft.id).await.unwrap();
    assert!(result.success);
    assert_eq!(result.conflicts.len(), 1);
    let conflict = &result.conflicts[0];
    assert_eq!(conflict.field, FormField::Title);
    assert!(conflict.resolved);
    assert_eq!(conflict.resolution, Some(ConflictResolution::Remote));

    let merged = h.engine.draft(draft.id).unwrap();
    assert_eq!(merged.form_data.title, "ABCDE");
    assert_eq!(merged.status, DraftStatus::Synced);
    assert_eq!(merged.conflicts.len(), 1);
}

#[tokio::test]
async fn non_zero_goal_wins_in_both_directions() {
    // Local zero, remote non-zero.
    let h = harness(quiet_config());
    let draft = h.engine.create_draft("u1", None).unwrap();
    h.engine.sync_draft(draft.id).await.unwrap();
    let base = h.remote.get(draft.id).unwrap();
    remote_write(&h.remote, &base, |copy| {
        copy.form_data.goal_amount = 5;
    });
    // Touch an unrelated field so the local copy has pending changes to push.
    h.engine
        .update_field(draft.id, FormField::Description, "desc")
        .unwrap();
    let result = h.engine.sync_draft(draft.id).await.unwrap();
    let goal = result
        .conflicts
        .iter()
        .find(|c| c.field == FormField::GoalAmount)
        .unwrap();
    assert_eq!(goal.resolution, Some(ConflictResolution::Remote));
    assert_eq!(h.engine.draft(draft.id).unwrap().form_data.goal_amount, 5);

    // Local non-zero, remote zero.
    let h = harness(quiet_config());
    let draft = h.engine.create_draft("u1", None).unwrap();
    h.engine.sync_draft(draft.id).await.unwrap();
    let base = h.remote.get(draft.id).unwrap();
    remote_write(&h.remote, &base, |copy| {
        copy.form_data.description = "remote description".to_string();
    });
    h.engine
        .update_field(draft.id, FormField::GoalAmount, 5u64)
        .unwrap();
    let result = h.engine.sync_draft(draft.id).await.unwrap();
    let goal = result
        .conflicts
        .iter()
        .find(|c| c.field == FormField::GoalAmount)
        .unwrap();
    assert_eq!(goal.resolution, Some(ConflictResolution::Local));
    assert_eq!(h.engine.draft(draft.id).unwrap().form_data.goal_amount, 5);
}

#[tokio::test]
async fn completion_percentage_tracks_required_fields() {
    let h = harness(quiet_config());
    let draft = h
        .engine
        .create_draft(
            "u1",
            Some(CampaignFormData {
                title: String::new(),
                description: String::new(),
                ..CampaignFormData::default()
            }),
        )
        .unwrap();
    assert_eq!(draft.metadata.completion_percentage, 0);

    h.engine
        .update_field(draft.id, FormField::Title, "Orange node")
        .unwrap();
    h.engine
        .update_field(draft.id, FormField::Description, "Fund a node")
        .unwrap();
    h.engine
        .update_field(draft.id, FormField::BitcoinAddress, "bc1qexample")
        .unwrap();
    let full = h
        .engine
        .update_field(draft.id, FormField::GoalAmount, 100_000u64)
        .unwrap();
    assert_eq!(full.metadata.completion_percentage, 100);
}

#[tokio::test]
async fn query_sorts_titles_ascending() {
    let h = harness(quiet_config());
    for title in ["Zebra", "Apple"] {
        h.engine
            .create_draft(
                "u1",
                Some(CampaignFormData {
                    title: title.to_string(),
                    ..CampaignFormData::default()
                }),
            )
            .unwrap();
    }
    h.engine.create_draft("u2", None).unwrap();

    let query = DraftQuery {
        owner_id: Some("u1".to_string()),
        sort_by: SortBy::Title,
        sort_order: SortOrder::Asc,
        ..DraftQuery::default()
    };
    let results = h.engine.query_drafts(&query);
    let titles: Vec<&str> = results.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles, vec!["Apple", "Zebra"]);
}

#[tokio::test]
async fn subscribers_see_each_mutation_until_unsubscribed() {
    let h = harness(quiet_config());
    let draft = h.engine.create_draft("u1", None).unwrap();

    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let subscription = h.engine.subscribe(draft.id, move |state| {
        sink.lock().unwrap().push(state.form_data.title.clone());
    });

    h.engine
        .update_field(draft.id, FormField::Title, "one")
        .unwrap();
    h.engine
        .update_field(draft.id, FormField::Title, "two")
        .unwrap();
    assert_eq!(seen.lock().unwrap().clone(), vec!["one", "two"]);

    subscription.unsubscribe();
    subscription.unsubscribe(); // idempotent
    h.engine
        .update_field(draft.id, FormField::Title, "three")
        .unwrap();
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn offline_remote_flips_status_and_recovers() {
    let h = harness(quiet_config());
    let draft = h.engine.create_draft("u1", None).unwrap();

    h.remote.set_offline(true);
    let failed = h.engine.sync_draft(draft.id).await.unwrap();
    assert!(!failed.success);
    assert!(failed.error.is_some());
    assert_eq!(h.engine.draft(draft.id).unwrap().status, DraftStatus::Offline);

    // Edits are still accepted while offline.
    h.engine
        .update_field(draft.id, FormField::Title, "queued edit")
        .unwrap();

    h.remote.set_offline(false);
    let recovered = h.engine.sync_draft(draft.id).await.unwrap();
    assert!(recovered.success);
    assert_eq!(h.engine.draft(draft.id).unwrap().status, DraftStatus::Synced);
    assert_eq!(
        h.remote.get(draft.id).unwrap().form_data.title,
        "queued edit"
    );
}

#[tokio::test]
async fn manual_save_syncs_immediately_and_counts() {
    let h = harness(quiet_config());
    let draft = h.engine.create_draft("u1", None).unwrap();
    h.engine
        .update_field(draft.id, FormField::Title, "manual")
        .unwrap();

    let result = h.engine.manual_save(draft.id).await.unwrap();
    assert!(result.success);
    assert_eq!(h.remote.upsert_count(), 1);

    let saved = h.engine.draft(draft.id).unwrap();
    assert_eq!(saved.status, DraftStatus::Synced);
    assert_eq!(saved.metadata.manual_save_count, 1);

    // The pending debounce was cancelled; no second sync follows.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(h.remote.upsert_count(), 1);
}

#[tokio::test]
async fn snapshots_restore_into_a_fresh_engine() {
    let h = harness(quiet_config());
    let draft = h.engine.create_draft("u1", None).unwrap();
    let edited = h
        .engine
        .update_field(draft.id, FormField::Title, "survives restart")
        .unwrap();

    // A second engine sharing the same cache, as after a process restart.
    let second = DraftEngine::new(
        Arc::new(MemoryRemoteStore::new()),
        h.cache.clone() as Arc<dyn SnapshotCache>,
        quiet_config(),
    );
    let restored = second.restore_from_cache().unwrap();
    assert_eq!(restored, 1);
    assert_eq!(second.draft(draft.id), Some(edited));

    // Restoring again does not duplicate or clobber.
    assert_eq!(second.restore_from_cache().unwrap(), 0);
}

#[tokio::test]
async fn background_timer_syncs_without_edits() {
    let h = harness(
        EngineConfig::default()
            .with_sync_interval(Duration::from_millis(50))
            .with_debounce_interval(Duration::from_millis(10)),
    );
    let draft = h.engine.create_draft("u1", None).unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(h.remote.upsert_count() >= 1);
    assert_eq!(h.engine.draft(draft.id).unwrap().status, DraftStatus::Synced);

    h.engine.shutdown();
}

#[tokio::test]
async fn audit_trail_records_the_session_story() {
    let h = harness(quiet_config());
    let draft = h.engine.create_draft("u1", None).unwrap();
    h.engine
        .update_field(draft.id, FormField::Title, "audited")
        .unwrap();
    h.engine.set_step(draft.id, 2).unwrap();
    // Manual save cancels the pending debounce, keeping the log deterministic.
    h.engine.manual_save(draft.id).await.unwrap();

    let types: Vec<DraftEventType> = h
        .engine
        .events(draft.id)
        .iter()
        .map(|event| event.event_type)
        .collect();
    assert_eq!(
        types,
        vec![
            DraftEventType::DraftCreated,
            DraftEventType::FieldUpdated,
            DraftEventType::StepChanged,
            DraftEventType::ManualSave,
            DraftEventType::SyncCompleted,
        ]
    );

    // The sink receives the same events asynchronously.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(h.sink.events().len(), 5);
}
