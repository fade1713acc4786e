//! The grouping and ordering contract handed to changelog writers.

use std::cmp::Ordering;

use serde::Serialize;
use strum::{Display, EnumString};

use crate::git::{CommitRecord, Note};

/// A commit field usable as a group or sort key
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommitField {
    Type,
    Scope,
    Subject,
    Hash,
}

impl CommitField {
    pub fn get(self, commit: &CommitRecord) -> Option<&str> {
        match self {
            CommitField::Type => commit.commit_type.as_deref(),
            CommitField::Scope => commit.scope.as_deref(),
            CommitField::Subject => commit.subject.as_deref(),
            CommitField::Hash => commit.hash.as_deref(),
        }
    }
}

/// Declares how transformed commits are grouped and ordered.
///
/// Groups (commit groups and note groups alike) are ordered by title.
/// Comparisons are plain code point order, and a missing value sorts before
/// any present one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortKeys {
    /// The field commits are grouped by
    pub group_by: CommitField,
    /// The fields commits within a group are ordered by, in priority order
    pub commits_sort: Vec<CommitField>,
}

impl Default for SortKeys {
    fn default() -> Self {
        SortKeys {
            group_by: CommitField::Type,
            commits_sort: vec![CommitField::Scope, CommitField::Subject],
        }
    }
}

impl SortKeys {
    /// The title of the group a commit belongs to, empty when the group-by
    /// field is missing
    pub fn group_title(&self, commit: &CommitRecord) -> String {
        self.group_by.get(commit).unwrap_or_default().to_owned()
    }

    pub fn compare_groups(&self, a: &str, b: &str) -> Ordering {
        a.cmp(b)
    }

    pub fn compare_commits(&self, a: &CommitRecord, b: &CommitRecord) -> Ordering {
        self.commits_sort
            .iter()
            .map(|field| field.get(a).cmp(&field.get(b)))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    pub fn compare_note_groups(&self, a: &str, b: &str) -> Ordering {
        a.cmp(b)
    }

    /// Notes within a group stay in the order of the commits they came from
    pub fn compare_notes(&self, _a: &Note, _b: &Note) -> Ordering {
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commits_by_scope_then_subject() {
        let keys = SortKeys::default();
        let mut commits = vec![
            CommitRecord::new("fix", "b").scope("core"),
            CommitRecord::new("fix", "a").scope("core"),
            CommitRecord::new("fix", "z").scope(""),
            CommitRecord::new("fix", "y"),
            CommitRecord::new("fix", "c").scope("api"),
        ];
        commits.sort_by(|a, b| keys.compare_commits(a, b));

        let order: Vec<_> = commits.iter().filter_map(|c| c.subject.as_deref()).collect();
        assert_eq!(order, vec!["y", "z", "c", "a", "b"]);
    }

    #[test]
    fn code_point_order() {
        let keys = SortKeys::default();
        let upper = CommitRecord::new("fix", "Zebra");
        let lower = CommitRecord::new("fix", "apple");
        assert_eq!(keys.compare_commits(&upper, &lower), Ordering::Less);
        assert_eq!(keys.compare_groups("Bug Fixes", "Features"), Ordering::Less);
    }

    #[test]
    fn group_title() {
        let keys = SortKeys::default();
        assert_eq!(keys.group_title(&CommitRecord::new("Features", "x")), "Features");
        assert_eq!(keys.group_title(&CommitRecord::default()), "");
    }

    #[test]
    fn field_names() {
        assert_eq!("scope".parse::<CommitField>().unwrap(), CommitField::Scope);
        assert_eq!(CommitField::Type.to_string(), "type");
    }
}
