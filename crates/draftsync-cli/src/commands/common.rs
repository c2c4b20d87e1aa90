use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use draftsync_core::cache::FsCache;
use draftsync_core::remote::{HttpRemoteStore, MemoryRemoteStore};
use draftsync_core::{DraftEngine, DraftId, DraftState, EngineConfig};
use serde::Serialize;

use crate::error::CliError;

/// JSON shape for `show`/`list --json`
#[derive(Debug, Serialize)]
pub struct DraftListItem {
    pub id: String,
    pub title: String,
    pub owner_id: String,
    pub status: String,
    pub version: u64,
    pub current_step: u32,
    pub completion_percentage: u8,
    pub conflicts: usize,
    pub last_modified_at: i64,
    pub last_modified_iso: String,
}

pub fn draft_to_item(draft: &DraftState) -> DraftListItem {
    DraftListItem {
        id: draft.id.to_string(),
        title: draft.title.clone(),
        owner_id: draft.owner_id.clone(),
        status: format!("{:?}", draft.status).to_uppercase(),
        version: draft.version,
        current_step: draft.current_step,
        completion_percentage: draft.metadata.completion_percentage,
        conflicts: draft.conflicts.len(),
        last_modified_at: draft.last_modified_at,
        last_modified_iso: iso_time(draft.last_modified_at),
    }
}

pub fn format_draft_lines(drafts: &[DraftState]) -> Vec<String> {
    drafts
        .iter()
        .map(|draft| {
            format!(
                "{}  [{:<8}] v{:<3} {:>3}%  {}",
                draft.id,
                format!("{:?}", draft.status).to_uppercase(),
                draft.version,
                draft.metadata.completion_percentage,
                draft.title,
            )
        })
        .collect()
}

fn iso_time(unix_ms: i64) -> String {
    Utc.timestamp_millis_opt(unix_ms)
        .single()
        .map(|ts| ts.to_rfc3339())
        .unwrap_or_default()
}

/// Resolve the snapshot directory: explicit flag, else platform data dir
pub fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    dirs::data_dir()
        .map(|dir| dir.join("draftsync"))
        .ok_or(CliError::NoDataDir)
}

/// Open an engine over the local snapshot cache, restoring persisted drafts.
///
/// With an endpoint the engine syncs over HTTP; without one it runs in
/// local-only mode against an in-process store and `sync` is rejected.
pub fn open_engine(data_dir: &Path, endpoint: Option<&str>) -> Result<DraftEngine, CliError> {
    let cache = Arc::new(FsCache::open(data_dir)?);
    // One-shot process: the background timer would never get to fire.
    let config = EngineConfig::default().without_auto_sync();

    let engine = match endpoint {
        Some(endpoint) => {
            tracing::info!(%endpoint, "sync enabled");
            let remote = Arc::new(HttpRemoteStore::new(endpoint)?);
            DraftEngine::new(remote.clone(), cache, config).with_event_sink(remote)
        }
        None => {
            tracing::info!("running in local-only mode (no sync endpoint)");
            DraftEngine::new(Arc::new(MemoryRemoteStore::new()), cache, config)
        }
    };
    engine.restore_from_cache()?;
    Ok(engine)
}

/// Parse a draft id argument
pub fn parse_draft_id(raw: &str) -> Result<DraftId, CliError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CliError::EmptyDraftId);
    }
    raw.parse()
        .map_err(|_| CliError::InvalidDraftId(raw.to_string()))
}

/// Look up a draft or fail with a CLI-friendly error
pub fn require_draft(engine: &DraftEngine, id: DraftId) -> Result<DraftState, CliError> {
    engine
        .draft(id)
        .ok_or_else(|| CliError::DraftNotFound(id.to_string()))
}
