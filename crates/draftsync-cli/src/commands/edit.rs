use draftsync_core::{DraftEngine, FieldValue, FormField};

use crate::commands::common::parse_draft_id;
use crate::error::CliError;

pub fn run_edit(engine: &DraftEngine, id: &str, field: &str, value: &str) -> Result<(), CliError> {
    let id = parse_draft_id(id)?;
    let field: FormField = field.parse()?;
    let value = FieldValue::parse_for(field, value)?;

    let updated = engine.update_field(id, field, value)?;
    println!(
        "{} = updated (v{}, {}% complete)",
        field, updated.version, updated.metadata.completion_percentage
    );
    Ok(())
}

pub fn run_step(engine: &DraftEngine, id: &str, step: u32) -> Result<(), CliError> {
    let id = parse_draft_id(id)?;
    let updated = engine.set_step(id, step)?;
    println!("step = {} (v{})", updated.current_step, updated.version);
    Ok(())
}
