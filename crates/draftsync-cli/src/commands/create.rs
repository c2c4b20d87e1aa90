use draftsync_core::{CampaignFormData, DraftEngine};

use crate::error::CliError;

pub fn run_create(
    engine: &DraftEngine,
    owner: &str,
    title: Option<&str>,
    description: Option<&str>,
    goal: Option<u64>,
) -> Result<(), CliError> {
    let initial = CampaignFormData {
        title: title.unwrap_or_default().to_string(),
        description: description.unwrap_or_default().to_string(),
        goal_amount: goal.unwrap_or_default(),
        ..CampaignFormData::default()
    };

    let draft = engine.create_draft(owner, Some(initial))?;
    println!("{}", draft.id);
    Ok(())
}
