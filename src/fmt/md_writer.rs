use std::io;

use log::debug;
use time::{macros::format_description, OffsetDateTime};

use crate::{
    changelog::Changelog,
    error::Result,
    fmt::FormatWriter,
    git::{CommitRecord, Context, Reference},
    sectionmap::{CommitGroup, NoteGroup, SectionMap},
};

/// Wraps a `std::io::Write` object to write changelog output in a Markdown
/// format
///
/// # Example
///
/// ```no_run
/// # use std::fs::File;
/// # use clog_writer::{Changelog, Context, fmt::MarkdownWriter};
/// let changelog = Changelog::new().unwrap();
///
/// // Create a file to hold our results, which the MarkdownWriter will wrap
/// let mut file = File::create("my_changelog.md").unwrap();
/// let mut writer = MarkdownWriter::new(&mut file);
///
/// changelog
///     .write_changelog_with(&mut writer, vec![], &Context::default())
///     .unwrap();
/// ```
pub struct MarkdownWriter<'a>(&'a mut dyn io::Write);

impl<'a> MarkdownWriter<'a> {
    /// Creates a new instance of the `MarkdownWriter` struct using a
    /// `std::io::Write` object.
    pub fn new<T: io::Write + 'a>(writer: &'a mut T) -> MarkdownWriter<'a> {
        MarkdownWriter(writer)
    }

    fn write_header(&mut self, ctx: &Context) -> Result<()> {
        let version = ctx.version.clone().unwrap_or_default();
        let heading = if ctx.is_patch { "###" } else { "##" };

        let linked_version = match (ctx.link_compare, compare_link(ctx)) {
            (true, Some(link)) => format!("[{version}]({link})"),
            _ => version.clone(),
        };
        let title = ctx
            .title
            .as_deref()
            .map(|t| format!(" \"{t}\""))
            .unwrap_or_default();
        let date = match ctx.date.clone() {
            Some(d) => d,
            None => OffsetDateTime::now_utc().format(format_description!("[year]-[month]-[day]"))?,
        };

        writeln!(
            self.0,
            "<a name=\"{version}\"></a>\n{heading} {linked_version}{title} ({date})\n"
        )
        .map_err(Into::into)
    }

    /// Writes a particular section of a changelog
    fn write_section(
        &mut self,
        options: &Changelog,
        ctx: &Context,
        group: &CommitGroup,
    ) -> Result<()> {
        if group.commits.is_empty() {
            return Ok(());
        }

        writeln!(self.0, "\n### {}\n", group.title)?;

        for entry in &group.commits {
            write!(
                self.0,
                "*{} {}",
                scope_prefix(entry.scope.as_deref()),
                entry.subject.as_deref().unwrap_or_default()
            )?;

            if let Some(hash) = entry.hash.as_deref() {
                match ctx.base_url() {
                    Some(base) => write!(self.0, " ([{hash}]({base}/commit/{hash}))")?,
                    None => write!(self.0, " ({hash})")?,
                }
            }

            if !entry.references.is_empty() {
                let refs = entry
                    .references
                    .iter()
                    .map(|r| reference_link(r, ctx))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(self.0, ", closes {refs}")?;
            }

            let attribution = attribution(options, entry);
            if !attribution.is_empty() {
                write!(self.0, " {attribution}")?;
            }

            writeln!(self.0)?;
        }

        Ok(())
    }

    fn write_notes(&mut self, group: &NoteGroup) -> Result<()> {
        writeln!(self.0, "\n### {}\n", group.title)?;
        for entry in &group.notes {
            writeln!(self.0, "*{} {}", scope_prefix(entry.scope.as_deref()), entry.note.text)?;
        }
        Ok(())
    }
}

fn scope_prefix(scope: Option<&str>) -> String {
    match scope {
        Some(s) if !s.is_empty() => format!(" **{s}:**"),
        _ => String::new(),
    }
}

fn compare_link(ctx: &Context) -> Option<String> {
    let base = ctx.base_url()?;
    let (prev, cur) = (ctx.previous_tag.as_deref()?, ctx.current_tag.as_deref()?);
    Some(format!("{base}/compare/{prev}...{cur}"))
}

// Issue tracker URL when configured, else the repository's issue list
fn reference_link(r: &Reference, ctx: &Context) -> String {
    let url = match r.bugs_url.as_deref() {
        Some(bugs) => Some(format!("{}/{}", bugs.trim_end_matches('/'), r.issue)),
        None => ctx.issues_url().map(|u| format!("{u}{}", r.issue)),
    };
    match url {
        Some(url) => format!("[#{}]({url})", r.issue),
        None => format!("#{}", r.issue),
    }
}

fn attribution(options: &Changelog, entry: &CommitRecord) -> String {
    options
        .config
        .author_attribution
        .render(entry.author_name.as_deref(), entry.author_email.as_deref())
}

impl<'a> FormatWriter for MarkdownWriter<'a> {
    fn write_changelog(
        &mut self,
        options: &Changelog,
        ctx: &Context,
        sm: &SectionMap,
    ) -> Result<()> {
        debug!("Writing Markdown changelog");
        self.write_header(ctx)?;

        for group in &sm.commit_groups {
            self.write_section(options, ctx, group)?;
        }
        for group in &sm.note_groups {
            self.write_notes(group)?;
        }

        self.0.flush().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthorAttribution, Config};

    fn render(changelog: &Changelog, commits: Vec<CommitRecord>, ctx: &Context) -> String {
        let mut out = Vec::new();
        {
            let mut writer = MarkdownWriter::new(&mut out);
            changelog.write_changelog_with(&mut writer, commits, ctx).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    fn ctx() -> Context {
        Context {
            date: Some("2024-05-01".into()),
            ..Context::hosted("https://h", "me", "repo").version("1.2.0")
        }
    }

    #[test]
    fn header() {
        let changelog = Changelog::with_config(Config::default());
        let out = render(&changelog, vec![], &ctx());
        assert_eq!(out, "<a name=\"1.2.0\"></a>\n## 1.2.0 (2024-05-01)\n\n");

        let ctx = Context {
            is_patch: true,
            link_compare: true,
            previous_tag: Some("v1.1.9".into()),
            current_tag: Some("v1.2.0".into()),
            title: Some("Spring".into()),
            ..ctx()
        };
        let out = render(&changelog, vec![], &ctx);
        let header =
            "### [1.2.0](https://h/me/repo/compare/v1.1.9...v1.2.0) \"Spring\" (2024-05-01)";
        assert!(out.contains(header), "{out}");
    }

    #[test]
    fn sections_and_notes() {
        let changelog = Changelog::with_config(Config::default());
        let commits = vec![
            CommitRecord::new("feat", "add export")
                .scope("cli")
                .hash("abcdef1234")
                .reference(Reference::new("12")),
            CommitRecord::new("fix", "handle #3").hash("1234567890"),
            CommitRecord::new("feat", "drop v1 api").note("BREAKING CHANGE", "v1 is gone"),
        ];
        let out = render(&changelog, commits, &ctx());

        let fixes = out.find("### Bug Fixes").unwrap();
        let features = out.find("### Features").unwrap();
        let breaking = out.find("### BREAKING CHANGES").unwrap();
        assert!(fixes < features && features < breaking, "{out}");

        let fix = "* handle [#3](https://h/me/repo/issues/3) \
                   ([1234567](https://h/me/repo/commit/1234567))\n";
        assert!(out.contains(fix), "{out}");
        let feat = "* **cli:** add export ([abcdef1](https://h/me/repo/commit/abcdef1)), \
                    closes [#12](https://h/me/repo/issues/12)\n";
        assert!(out.contains(feat), "{out}");
        assert!(out.contains("* v1 is gone\n"), "{out}");
    }

    #[test]
    fn bugs_url_and_attribution() {
        let changelog = Changelog::with_config(
            Config::default()
                .bugs_url("https://bugs/")
                .author_attribution(AuthorAttribution::Name),
        );
        let commits = vec![CommitRecord::new("perf", "faster")
            .author(Some("Jane"), None)
            .reference(Reference::new("9"))];
        let out = render(&changelog, commits, &Context::default().version("0.1.0"));

        assert!(out.contains("* faster, closes [#9](https://bugs/9) by: **Jane**\n"), "{out}");
    }
}
