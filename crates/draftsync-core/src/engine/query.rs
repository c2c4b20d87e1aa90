//! Query interface over the in-memory draft set.
//!
//! Pure functions: filtering, sorting, and pagination never trigger a sync.

use serde::{Deserialize, Serialize};

use crate::models::{DraftState, DraftStatus};

/// Sort key for draft queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    LastModified,
    Created,
    Title,
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filter/sort/pagination parameters for [`crate::DraftEngine::query_drafts`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftQuery {
    /// Keep only drafts owned by this user
    pub owner_id: Option<String>,
    /// Keep only drafts in one of these statuses
    pub status: Option<Vec<DraftStatus>>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub limit: usize,
    pub offset: usize,
}

impl Default for DraftQuery {
    fn default() -> Self {
        Self {
            owner_id: None,
            status: None,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
            limit: 50,
            offset: 0,
        }
    }
}

impl DraftQuery {
    /// Query limited to one owner, otherwise defaults
    #[must_use]
    pub fn for_owner(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
            ..Self::default()
        }
    }
}

/// Apply a query to a snapshot of the draft set
pub(crate) fn run_query(mut drafts: Vec<DraftState>, query: &DraftQuery) -> Vec<DraftState> {
    if let Some(owner_id) = &query.owner_id {
        drafts.retain(|draft| &draft.owner_id == owner_id);
    }
    if let Some(statuses) = &query.status {
        drafts.retain(|draft| statuses.contains(&draft.status));
    }

    drafts.sort_by(|a, b| match query.sort_by {
        SortBy::LastModified => a.last_modified_at.cmp(&b.last_modified_at),
        SortBy::Created => a.created_at.cmp(&b.created_at),
        SortBy::Title => a.title.cmp(&b.title),
    });
    if query.sort_order == SortOrder::Desc {
        drafts.reverse();
    }

    drafts.into_iter().skip(query.offset).take(query.limit).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::CampaignFormData;

    fn draft(owner: &str, title: &str, modified: i64) -> DraftState {
        let mut draft = DraftState::new(
            owner,
            Some(CampaignFormData {
                title: title.to_string(),
                ..CampaignFormData::default()
            }),
        );
        draft.last_modified_at = modified;
        draft
    }

    fn titles(drafts: &[DraftState]) -> Vec<&str> {
        drafts.iter().map(|d| d.title.as_str()).collect()
    }

    #[test]
    fn filters_by_owner() {
        let drafts = vec![draft("u1", "Mine", 1), draft("u2", "Theirs", 2)];
        let result = run_query(drafts, &DraftQuery::for_owner("u1"));
        assert_eq!(titles(&result), vec!["Mine"]);
    }

    #[test]
    fn filters_by_status_set() {
        let mut synced = draft("u1", "Synced", 1);
        synced.status = DraftStatus::Synced;
        let creating = draft("u1", "Creating", 2);

        let query = DraftQuery {
            status: Some(vec![DraftStatus::Synced]),
            ..DraftQuery::default()
        };
        let result = run_query(vec![synced, creating], &query);
        assert_eq!(titles(&result), vec!["Synced"]);
    }

    #[test]
    fn sorts_by_title_ascending() {
        let drafts = vec![draft("u1", "Zebra", 1), draft("u1", "Apple", 2)];
        let query = DraftQuery {
            owner_id: Some("u1".to_string()),
            sort_by: SortBy::Title,
            sort_order: SortOrder::Asc,
            ..DraftQuery::default()
        };
        let result = run_query(drafts, &query);
        assert_eq!(titles(&result), vec!["Apple", "Zebra"]);
    }

    #[test]
    fn default_sort_is_last_modified_descending() {
        let drafts = vec![draft("u1", "Old", 10), draft("u1", "New", 20)];
        let result = run_query(drafts, &DraftQuery::default());
        assert_eq!(titles(&result), vec!["New", "Old"]);
    }

    #[test]
    fn paginates_with_offset_and_limit() {
        let drafts = vec![
            draft("u1", "C", 1),
            draft("u1", "B", 2),
            draft("u1", "A", 3),
        ];
        let query = DraftQuery {
            sort_by: SortBy::Title,
            sort_order: SortOrder::Asc,
            offset: 1,
            limit: 1,
            ..DraftQuery::default()
        };
        let result = run_query(drafts, &query);
        assert_eq!(titles(&result), vec!["B"]);
    }
}
