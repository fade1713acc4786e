use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    git::{CommitRecord, Note},
    sort::SortKeys,
};

/// Commits sharing a display label, e.g. all "Bug Fixes"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitGroup {
    pub title: String,
    pub commits: Vec<CommitRecord>,
}

/// A note together with the commit it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedNote {
    #[serde(flatten)]
    pub note: Note,
    pub scope: Option<String>,
    pub hash: Option<String>,
}

/// Notes sharing a title, e.g. all "BREAKING CHANGES"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteGroup {
    pub title: String,
    pub notes: Vec<GroupedNote>,
}

/// The grouped and ordered commits of a release, which writers walk in
/// order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionMap {
    pub commit_groups: Vec<CommitGroup>,
    pub note_groups: Vec<NoteGroup>,
}

impl SectionMap {
    /// Creates a section map from already transformed commits, which we can
    /// then iterate through and write. All sorts are stable, so equal keys
    /// keep their input order.
    ///
    /// # Example
    ///
    /// ```
    /// # use clog_writer::{Changelog, CommitRecord, Config, Context, SectionMap};
    /// let changelog = Changelog::with_config(Config::default());
    /// let commits = changelog.transform_all(
    ///     vec![CommitRecord::new("fix", "b"), CommitRecord::new("feat", "a")],
    ///     &Context::default(),
    /// );
    ///
    /// let sm = SectionMap::from_commits(commits, &changelog.sort_keys);
    /// assert_eq!(sm.commit_groups[0].title, "Bug Fixes");
    /// assert_eq!(sm.commit_groups[1].title, "Features");
    /// ```
    pub fn from_commits(commits: Vec<CommitRecord>, keys: &SortKeys) -> SectionMap {
        let mut groups: IndexMap<String, Vec<CommitRecord>> = IndexMap::new();
        let mut notes: IndexMap<String, Vec<GroupedNote>> = IndexMap::new();

        for entry in commits {
            for note in &entry.notes {
                notes.entry(note.title.clone()).or_insert_with(Vec::new).push(GroupedNote {
                    note: note.clone(),
                    scope: entry.scope.clone(),
                    hash: entry.hash.clone(),
                });
            }
            groups.entry(keys.group_title(&entry)).or_insert_with(Vec::new).push(entry);
        }

        let mut commit_groups: Vec<_> = groups
            .into_iter()
            .map(|(title, mut commits)| {
                commits.sort_by(|a, b| keys.compare_commits(a, b));
                CommitGroup { title, commits }
            })
            .collect();
        commit_groups.sort_by(|a, b| keys.compare_groups(&a.title, &b.title));

        let mut note_groups: Vec<_> = notes
            .into_iter()
            .map(|(title, mut notes)| {
                notes.sort_by(|a, b| keys.compare_notes(&a.note, &b.note));
                NoteGroup { title, notes }
            })
            .collect();
        note_groups.sort_by(|a, b| keys.compare_note_groups(&a.title, &b.title));

        SectionMap {
            commit_groups,
            note_groups,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.commit_groups.is_empty() && self.note_groups.is_empty()
    }
}
