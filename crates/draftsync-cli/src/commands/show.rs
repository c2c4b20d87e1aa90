use draftsync_core::DraftEngine;

use crate::commands::common::{draft_to_item, parse_draft_id, require_draft};
use crate::error::CliError;

pub fn run_show(engine: &DraftEngine, id: &str, as_json: bool) -> Result<(), CliError> {
    let id = parse_draft_id(id)?;
    let draft = require_draft(engine, id)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&draft)?);
        return Ok(());
    }

    let item = draft_to_item(&draft);
    println!("id:         {}", item.id);
    println!("title:      {}", item.title);
    println!("owner:      {}", item.owner_id);
    println!("status:     {}", item.status);
    println!("version:    {}", item.version);
    println!("step:       {}", item.current_step);
    println!("complete:   {}%", item.completion_percentage);
    println!("modified:   {}", item.last_modified_iso);
    if !draft.conflicts.is_empty() {
        println!("conflicts:");
        for conflict in &draft.conflicts {
            println!(
                "  {} -> {:?} ({})",
                conflict.field,
                conflict.resolution,
                if conflict.resolved { "resolved" } else { "open" },
            );
        }
    }
    Ok(())
}
