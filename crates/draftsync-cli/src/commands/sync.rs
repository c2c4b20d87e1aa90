use draftsync_core::DraftEngine;

use crate::commands::common::parse_draft_id;
use crate::error::CliError;

pub async fn run_sync(
    engine: &DraftEngine,
    id: &str,
    sync_configured: bool,
) -> Result<(), CliError> {
    if !sync_configured {
        return Err(CliError::SyncNotConfigured);
    }
    let id = parse_draft_id(id)?;

    let result = engine.manual_save(id).await?;
    if result.success {
        if result.conflicts.is_empty() {
            println!("Sync completed (v{})", result.new_version);
        } else {
            println!(
                "Sync completed (v{}) with {} resolved conflict(s)",
                result.new_version,
                result.conflicts.len()
            );
        }
    } else {
        println!(
            "Sync failed: {}",
            result.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    Ok(())
}
