use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// The known conventional commit categories, declared in classification
/// priority order.
///
/// # Example
///
/// ```
/// # use clog_writer::CommitType;
/// let ty: CommitType = "perf".parse().unwrap();
/// assert_eq!(ty.label(false), "Performance Improvements");
/// assert_eq!(ty.label(true), "⚡ Performance Improvements");
/// ```
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum CommitType {
    Feat,
    Fix,
    Perf,
    Revert,
    Docs,
    Style,
    Refactor,
    Test,
    Build,
    Ci,
    Chore,
}

impl CommitType {
    /// The raw tag as written in a commit header, e.g. `"feat"`
    pub fn tag(self) -> &'static str {
        self.into()
    }

    /// The plain section title, e.g. `"Bug Fixes"`
    pub fn plain_label(self) -> &'static str {
        match self {
            CommitType::Feat => "Features",
            CommitType::Fix => "Bug Fixes",
            CommitType::Perf => "Performance Improvements",
            CommitType::Revert => "Reverts",
            CommitType::Docs => "Documentation",
            CommitType::Style => "Styles",
            CommitType::Refactor => "Code Refactoring",
            CommitType::Test => "Tests",
            CommitType::Build => "Build System",
            CommitType::Ci => "Continuous Integration",
            CommitType::Chore => "Chores",
        }
    }

    /// The section title prefixed with the category glyph, e.g. `"🐛 Bug Fixes"`
    pub fn emoji_label(self) -> &'static str {
        match self {
            CommitType::Feat => "✨ Features",
            CommitType::Fix => "🐛 Bug Fixes",
            CommitType::Perf => "⚡ Performance Improvements",
            CommitType::Revert => "⏪ Reverts",
            CommitType::Docs => "📝 Documentation",
            CommitType::Style => "💄 Styles",
            CommitType::Refactor => "♻ Code Refactoring",
            CommitType::Test => "✅ Tests",
            // the construction worker glyph carries a trailing zero-width joiner
            CommitType::Build => "👷\u{200d} Build System",
            CommitType::Ci => "🔧 Continuous Integration",
            CommitType::Chore => "🎫 Chores",
        }
    }

    pub fn label(self, emojis: bool) -> &'static str {
        if emojis {
            self.emoji_label()
        } else {
            self.plain_label()
        }
    }

    /// Finds the category whose tag is exactly `tag`. Matching is case
    /// sensitive, so `"Feat"` is not a known category.
    pub fn from_tag(tag: &str) -> Option<CommitType> {
        CommitType::iter().find(|ty| ty.tag() == tag)
    }
}
