//! Field-aware conflict resolution policies.
//!
//! Each form field maps to one policy variant; resolution evaluates the
//! policy uniformly over the conflicting values, with recency as the shared
//! tie-break. Adding a field means adding one arm to [`policy_for`].

use crate::models::{ConflictResolution, DraftConflict, FieldValue, FormField};

/// How a field-level disagreement gets decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPolicy {
    /// Keep the longer string: more content reflects more editing intent
    PreferLonger,
    /// Keep the non-zero amount; recency decides when both sides are set
    PreferNonZero,
    /// Keep whichever side was modified more recently
    PreferRecent,
}

/// The policy governing one form field
#[must_use]
pub const fn policy_for(field: FormField) -> ResolutionPolicy {
    match field {
        FormField::Title | FormField::Description => ResolutionPolicy::PreferLonger,
        FormField::GoalAmount => ResolutionPolicy::PreferNonZero,
        _ => ResolutionPolicy::PreferRecent,
    }
}

/// Decide which side of a conflict to keep.
///
/// `local_modified` / `remote_modified` are the last-modified timestamps of
/// the two copies, used by `PreferRecent` and as the tie-break everywhere.
pub(crate) fn choose_side(
    conflict: &DraftConflict,
    local_modified: i64,
    remote_modified: i64,
) -> ConflictResolution {
    let by_recency = || {
        if local_modified > remote_modified {
            ConflictResolution::Local
        } else {
            ConflictResolution::Remote
        }
    };

    match policy_for(conflict.field) {
        ResolutionPolicy::PreferLonger => {
            match conflict.local_value.text_len().cmp(&conflict.remote_value.text_len()) {
                std::cmp::Ordering::Greater => ConflictResolution::Local,
                std::cmp::Ordering::Less => ConflictResolution::Remote,
                std::cmp::Ordering::Equal => by_recency(),
            }
        }
        ResolutionPolicy::PreferNonZero => {
            match (&conflict.local_value, &conflict.remote_value) {
                (FieldValue::Amount(local), FieldValue::Amount(remote)) => {
                    if *local > 0 && *remote == 0 {
                        ConflictResolution::Local
                    } else if *remote > 0 && *local == 0 {
                        ConflictResolution::Remote
                    } else {
                        by_recency()
                    }
                }
                _ => by_recency(),
            }
        }
        ResolutionPolicy::PreferRecent => by_recency(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn conflict(field: FormField, local: FieldValue, remote: FieldValue) -> DraftConflict {
        DraftConflict::detected(field, local, remote, 0)
    }

    #[test]
    fn policy_table_covers_field_classes() {
        assert_eq!(policy_for(FormField::Title), ResolutionPolicy::PreferLonger);
        assert_eq!(
            policy_for(FormField::Description),
            ResolutionPolicy::PreferLonger
        );
        assert_eq!(
            policy_for(FormField::GoalAmount),
            ResolutionPolicy::PreferNonZero
        );
        assert_eq!(
            policy_for(FormField::BitcoinAddress),
            ResolutionPolicy::PreferRecent
        );
        assert_eq!(policy_for(FormField::Tags), ResolutionPolicy::PreferRecent);
    }

    #[test]
    fn longer_string_wins_either_direction() {
        let c = conflict(FormField::Title, "A".into(), "ABCDE".into());
        assert_eq!(choose_side(&c, 10, 5), ConflictResolution::Remote);

        let c = conflict(FormField::Title, "ABCDE".into(), "A".into());
        assert_eq!(choose_side(&c, 5, 10), ConflictResolution::Local);
    }

    #[test]
    fn equal_length_falls_back_to_recency() {
        let c = conflict(FormField::Title, "abc".into(), "xyz".into());
        assert_eq!(choose_side(&c, 20, 10), ConflictResolution::Local);
        assert_eq!(choose_side(&c, 10, 20), ConflictResolution::Remote);
    }

    #[test]
    fn non_zero_amount_wins() {
        let c = conflict(FormField::GoalAmount, 0u64.into(), 5u64.into());
        assert_eq!(choose_side(&c, 99, 1), ConflictResolution::Remote);

        let c = conflict(FormField::GoalAmount, 5u64.into(), 0u64.into());
        assert_eq!(choose_side(&c, 1, 99), ConflictResolution::Local);
    }

    #[test]
    fn both_non_zero_amounts_fall_back_to_recency() {
        let c = conflict(FormField::GoalAmount, 5u64.into(), 7u64.into());
        assert_eq!(choose_side(&c, 20, 10), ConflictResolution::Local);
        assert_eq!(choose_side(&c, 10, 20), ConflictResolution::Remote);
    }

    #[test]
    fn recent_side_wins_for_other_fields() {
        let c = conflict(
            FormField::Tags,
            vec!["a".to_string()].into(),
            vec!["b".to_string()].into(),
        );
        assert_eq!(choose_side(&c, 2, 1), ConflictResolution::Local);
        // Ties go to the remote copy, the arbiter of record.
        assert_eq!(choose_side(&c, 1, 1), ConflictResolution::Remote);
    }
}
