use draftsync_core::{DraftEngine, DraftQuery, SortBy, SortOrder};

use crate::commands::common::{draft_to_item, format_draft_lines, DraftListItem};
use crate::error::CliError;

pub fn run_list(
    engine: &DraftEngine,
    owner: Option<&str>,
    sort_by: SortBy,
    sort_order: SortOrder,
    limit: usize,
    offset: usize,
    as_json: bool,
) -> Result<(), CliError> {
    let query = DraftQuery {
        owner_id: owner.map(ToString::to_string),
        status: None,
        sort_by,
        sort_order,
        limit,
        offset,
    };
    let drafts = engine.query_drafts(&query);

    if as_json {
        let items: Vec<DraftListItem> = drafts.iter().map(draft_to_item).collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if drafts.is_empty() {
        println!("No drafts found.");
    } else {
        for line in format_draft_lines(&drafts) {
            println!("{line}");
        }
    }
    Ok(())
}
