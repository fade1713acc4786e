//! Turns parsed conventional commits into changelog-ready records: picks the
//! commits worth listing, relabels them by category, links issues and
//! mentions, and groups them in a fixed order for a writer to render.
//!
//! ```
//! use clog_writer::{Changelog, CommitRecord, Config, Context};
//!
//! let changelog = Changelog::with_config(Config::default().emojis(true));
//! let ctx = Context::hosted("https://github.com", "me", "repo");
//!
//! let sm = changelog.section_map(
//!     vec![
//!         CommitRecord::new("feat", "thanks @alice"),
//!         CommitRecord::new("wip", "never listed"),
//!     ],
//!     &ctx,
//! );
//! assert_eq!(sm.commit_groups.len(), 1);
//! assert_eq!(sm.commit_groups[0].title, "✨ Features");
//! ```

#[macro_use]
mod macros;
mod changelog;
mod commit_type;
pub mod config;
pub mod error;
pub mod fmt;
pub mod git;
pub mod references;
mod sectionmap;
pub mod sort;

pub use changelog::{Changelog, BREAKING_CHANGES};
pub use commit_type::CommitType;
pub use config::{AuthorAttribution, Config};
pub use git::{CommitRecord, Context, Note, Reference};
pub use sectionmap::{CommitGroup, GroupedNote, NoteGroup, SectionMap};
pub use sort::SortKeys;

// The default settings file, read from the current directory
const DEFAULT_CONFIG_FILE: &str = "package.json";
