use std::io;

use log::debug;
use serde::Serialize;

use crate::{
    changelog::Changelog, error::Result, fmt::FormatWriter, git::Context, sectionmap::SectionMap,
    sort::SortKeys,
};

/// Wraps a `std::io::Write` object to write changelog output as a single
/// JSON document
///
/// # Example
///
/// ```no_run
/// # use std::io::{stdout, BufWriter};
/// # use clog_writer::{Changelog, Context, fmt::JsonWriter};
/// let changelog = Changelog::new().unwrap();
///
/// let out = stdout();
/// let mut out_buf = BufWriter::new(out.lock());
/// let mut writer = JsonWriter::new(&mut out_buf);
///
/// changelog
///     .write_changelog_with(&mut writer, vec![], &Context::default())
///     .unwrap();
/// ```
pub struct JsonWriter<'a>(&'a mut dyn io::Write);

impl<'a> JsonWriter<'a> {
    /// Creates a new instance of the `JsonWriter` struct using a
    /// `std::io::Write` object.
    pub fn new<T: io::Write + 'a>(writer: &'a mut T) -> JsonWriter<'a> {
        JsonWriter(writer)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Header<'a> {
    version: Option<&'a str>,
    title: Option<&'a str>,
    date: Option<&'a str>,
    patch_version: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Document<'a> {
    header: Header<'a>,
    sort_keys: &'a SortKeys,
    git_user_info: &'static str,
    #[serde(flatten)]
    sections: &'a SectionMap,
}

impl<'a> FormatWriter for JsonWriter<'a> {
    fn write_changelog(
        &mut self,
        options: &Changelog,
        ctx: &Context,
        sm: &SectionMap,
    ) -> Result<()> {
        debug!("Writing JSON changelog");
        let doc = Document {
            header: Header {
                version: ctx.version.as_deref(),
                title: ctx.title.as_deref(),
                date: ctx.date.as_deref(),
                patch_version: ctx.is_patch,
            },
            sort_keys: &options.sort_keys,
            git_user_info: options.config.author_attribution.template(),
            sections: sm,
        };
        serde_json::to_writer(&mut *self.0, &doc)?;

        debug!("Finished writing sections, flushing");
        self.0.flush().map_err(Into::into)
    }
}
