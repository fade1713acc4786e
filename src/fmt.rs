mod json_writer;
mod md_writer;

use std::result::Result as StdResult;

use serde::{de, Deserialize, Deserializer};
use strum::{Display, EnumString};

pub use self::{json_writer::JsonWriter, md_writer::MarkdownWriter};
use crate::{changelog::Changelog, error::Result, git::Context, sectionmap::SectionMap};

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum ChangelogFormat {
    Json,
    #[default]
    Markdown,
}

// Read from the `outputFormat` setting
impl<'de> Deserialize<'de> for ChangelogFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> StdResult<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        ChangelogFormat::parse_name(&name).map_err(de::Error::custom)
    }
}

impl ChangelogFormat {
    /// Parses a format name, case insensitively
    pub fn parse_name(s: &str) -> Result<Self> {
        s.parse()
            .map_err(|_| crate::error::Error::ChangelogFormat(s.to_owned()))
    }
}

/// A trait that allows writing the grouped commits of a release in an
/// arbitrary format. The single required function `write_changelog()`
/// accepts a `SectionMap`, whose groups are already in their final order.
///
/// Two implementors are provided, `MarkdownWriter` and `JsonWriter`.
pub trait FormatWriter {
    /// Writes a changelog from a given `SectionMap`
    fn write_changelog(
        &mut self,
        options: &Changelog,
        ctx: &Context,
        section_map: &SectionMap,
    ) -> Result<()>;
}
