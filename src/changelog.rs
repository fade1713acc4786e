use std::{
    env,
    fs::File,
    io::{stdout, BufWriter, Write},
    path::Path,
};

use log::{debug, trace};
use strum::IntoEnumIterator;

use crate::{
    commit_type::CommitType,
    config::Config,
    error::{Error, Result},
    fmt::{ChangelogFormat, FormatWriter, JsonWriter, MarkdownWriter},
    git::{CommitRecord, Context},
    references,
    sectionmap::SectionMap,
    sort::SortKeys,
    DEFAULT_CONFIG_FILE,
};

/// The title every breaking change note is filed under
pub const BREAKING_CHANGES: &str = "BREAKING CHANGES";

/// The base struct used to transform commits and write changelogs.
///
/// A `Changelog` is immutable once built, so one instance can transform any
/// number of commits, in any order, from any thread.
#[derive(Debug, Clone)]
pub struct Changelog {
    /// The resolved rule set
    pub config: Config,
    /// The keys used to group and order the transformed commits
    pub sort_keys: SortKeys,
    /// The format used by `write_changelog_to` (Defaults to the config's)
    pub out_format: ChangelogFormat,
}

impl Changelog {
    /// Creates a `Changelog` from the `changelog` section of the
    /// `package.json` in the current working directory.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use clog_writer::Changelog;
    /// let changelog = Changelog::new().unwrap();
    /// ```
    pub fn new() -> Result<Self> {
        debug!("Creating changelog from the default config file");
        let cwd = env::current_dir().map_err(|_| Error::CurrentDir)?;
        Changelog::from_file(cwd.join(DEFAULT_CONFIG_FILE))
    }

    /// Creates a `Changelog` from a settings file, either a JSON manifest
    /// or a TOML file with a `[changelog]` table.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use clog_writer::Changelog;
    /// let changelog = Changelog::from_file("/myproject/changelog.toml").unwrap();
    /// ```
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        Ok(Changelog::with_config(Config::from_file(file)?))
    }

    /// Creates a `Changelog` from an already resolved config. The output
    /// format is taken from the config.
    ///
    /// # Example
    ///
    /// ```
    /// # use clog_writer::{Changelog, Config};
    /// let changelog = Changelog::with_config(Config::default().emojis(true));
    /// ```
    pub fn with_config(config: Config) -> Self {
        Changelog {
            sort_keys: SortKeys::default(),
            out_format: config.output_format,
            config,
        }
    }

    /// Overrides the configured output format for `write_changelog_to`
    pub fn output_format(mut self, f: ChangelogFormat) -> Changelog {
        self.out_format = f;
        self
    }

    /// Substitutes the configured attribution line into a commit partial
    pub fn commit_partial(&self, partial: &str) -> String {
        self.config.commit_partial(partial)
    }

    /// Finds the display label for a raw type tag, `None` when the tag is
    /// unknown or not picked.
    pub fn classify(&self, tag: &str) -> Option<&'static str> {
        CommitType::iter()
            .filter(|ty| self.config.is_picked(*ty))
            .find(|ty| ty.tag() == tag)
            .map(|ty| ty.label(self.config.emojis))
    }

    /// Transforms a single parsed commit, returning `None` when the commit
    /// does not belong in the changelog.
    ///
    /// Commits with breaking change notes are always kept, even when their
    /// type is unknown or not picked. Every record must go through here
    /// exactly once: a second pass sees a display label instead of a type tag.
    ///
    /// # Example
    ///
    /// ```
    /// # use clog_writer::{Changelog, CommitRecord, Config, Context};
    /// let changelog = Changelog::with_config(Config::default());
    /// let ctx = Context::hosted("https://github.com", "me", "repo");
    ///
    /// let commit = CommitRecord::new("fix", "handle #3").hash("0123456789");
    /// let commit = changelog.transform(commit, &ctx).unwrap();
    ///
    /// assert_eq!(commit.commit_type.as_deref(), Some("Bug Fixes"));
    /// assert_eq!(commit.hash.as_deref(), Some("0123456"));
    /// assert_eq!(
    ///     commit.subject.as_deref(),
    ///     Some("handle [#3](https://github.com/me/repo/issues/3)")
    /// );
    /// ```
    pub fn transform(&self, mut commit: CommitRecord, ctx: &Context) -> Option<CommitRecord> {
        let has_notes = commit.is_breaking();
        for note in commit.notes.iter_mut() {
            note.title = BREAKING_CHANGES.to_owned();
        }

        match commit.commit_type.as_deref().and_then(|t| self.classify(t)) {
            Some(label) => commit.commit_type = Some(label.to_owned()),
            None if has_notes => {}
            None => {
                trace!("Discarding commit {:?} of type {:?}", commit.hash, commit.commit_type);
                return None;
            }
        }

        if commit.scope.as_deref() == Some("*") {
            commit.scope = Some(String::new());
        }

        if let Some(hash) = commit.hash.as_mut() {
            let cut = hash.char_indices().nth(7).map(|(idx, _)| idx);
            if let Some(idx) = cut {
                hash.truncate(idx);
            }
        }

        let linked = match commit.subject.as_mut() {
            Some(subject) => references::rewrite_subject(subject, ctx),
            None => vec![],
        };

        let refs = std::mem::take(&mut commit.references);
        commit.references =
            references::dedup_references(refs, &linked, self.config.bugs_url.as_deref());

        Some(commit)
    }

    /// Transforms a batch of commits, leaving out the discarded ones. The
    /// relative order of the kept commits is preserved.
    pub fn transform_all<I>(&self, commits: I, ctx: &Context) -> Vec<CommitRecord>
    where
        I: IntoIterator<Item = CommitRecord>,
    {
        let kept: Vec<_> = commits
            .into_iter()
            .filter_map(|c| self.transform(c, ctx))
            .collect();
        debug!("Kept {} commits", kept.len());
        kept
    }

    /// Transforms the commits and groups them with this changelog's sort
    /// keys.
    pub fn section_map<I>(&self, commits: I, ctx: &Context) -> SectionMap
    where
        I: IntoIterator<Item = CommitRecord>,
    {
        SectionMap::from_commits(self.transform_all(commits, ctx), &self.sort_keys)
    }

    /// Writes a changelog with a specified `FormatWriter` format
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use clog_writer::{Changelog, Context, fmt::MarkdownWriter};
    /// # use std::io;
    /// let changelog = Changelog::new().unwrap();
    ///
    /// // Write changelog to stdout in Markdown format
    /// let out = io::stdout();
    /// let mut out_buf = io::BufWriter::new(out.lock());
    /// let mut writer = MarkdownWriter::new(&mut out_buf);
    ///
    /// changelog
    ///     .write_changelog_with(&mut writer, vec![], &Context::default())
    ///     .unwrap();
    /// ```
    pub fn write_changelog_with<W, I>(
        &self,
        writer: &mut W,
        commits: I,
        ctx: &Context,
    ) -> Result<()>
    where
        W: FormatWriter,
        I: IntoIterator<Item = CommitRecord>,
    {
        debug!("Writing changelog from writer");
        let sm = self.section_map(commits, ctx);

        writer.write_changelog(self, ctx, &sm)
    }

    /// Writes the changelog in the configured output format to a file, or
    /// to `stdout` when no file is given.
    pub fn write_changelog_to<P, I>(&self, out: Option<P>, commits: I, ctx: &Context) -> Result<()>
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = CommitRecord>,
    {
        match out {
            Some(path) => {
                debug!("Writing changelog to file: {:?}", path.as_ref());
                let mut file = BufWriter::new(File::create(path.as_ref())?);
                self.write_format(&mut file, commits, ctx)?;
                file.flush().map_err(Into::into)
            }
            None => {
                debug!("outfile not set, using stdout");
                let out = stdout();
                let mut out_buf = BufWriter::new(out.lock());
                self.write_format(&mut out_buf, commits, ctx)
            }
        }
    }

    fn write_format<T, I>(&self, out: &mut T, commits: I, ctx: &Context) -> Result<()>
    where
        T: Write,
        I: IntoIterator<Item = CommitRecord>,
    {
        match self.out_format {
            ChangelogFormat::Markdown => {
                let mut writer = MarkdownWriter::new(out);
                self.write_changelog_with(&mut writer, commits, ctx)
            }
            ChangelogFormat::Json => {
                let mut writer = JsonWriter::new(out);
                self.write_changelog_with(&mut writer, commits, ctx)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Reference;

    fn ctx() -> Context {
        Context::hosted("https://h", "me", "repo")
    }

    fn plain() -> Changelog {
        Changelog::with_config(Config::default())
    }

    fn demos() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("demos")
    }

    #[test]
    fn from_demo_files() {
        let changelog = Changelog::from_file(demos().join("changelog.toml")).unwrap();
        assert!(changelog.config.emojis);
        assert_eq!(changelog.out_format, ChangelogFormat::Json);
        assert_eq!(changelog.classify("chore"), None);
        assert_eq!(changelog.classify("feat"), Some("✨ Features"));

        let res = Changelog::from_file(demos().join("no-section.json"));
        assert!(matches!(res, Err(Error::ConfigFormat(_))), "{res:?}");
    }

    #[test]
    fn new_reads_package_json_from_cwd() {
        let cwd = env::current_dir().unwrap();
        env::set_current_dir(demos()).unwrap();
        let res = Changelog::new();
        env::set_current_dir(cwd).unwrap();

        let changelog = res.unwrap();
        assert_eq!(changelog.out_format, ChangelogFormat::Markdown);
        assert_eq!(
            changelog.commit_partial("{{gitUserInfo}}"),
            "by: **{{authorName}}** ({{authorEmail}})"
        );
    }

    #[test]
    fn output_format_override() {
        let config = Config::default().output_format(ChangelogFormat::Json);
        let changelog = Changelog::with_config(config);
        assert_eq!(changelog.out_format, ChangelogFormat::Json);
        let changelog = changelog.output_format(ChangelogFormat::Markdown);
        assert_eq!(changelog.out_format, ChangelogFormat::Markdown);
    }

    #[test]
    fn plain_labels() {
        let changelog = plain();
        let labels: Vec<_> = CommitType::iter()
            .map(|ty| changelog.classify(ty.tag()).unwrap())
            .collect();
        assert_eq!(labels[0], "Features");
        assert_eq!(labels[1], "Bug Fixes");
        assert_eq!(labels[10], "Chores");
    }

    #[test]
    fn emoji_labels() {
        let changelog = Changelog::with_config(Config::default().emojis(true));
        let commit = changelog
            .transform(CommitRecord::new("feat", "add things"), &ctx())
            .unwrap();
        assert_eq!(commit.commit_type.as_deref(), Some("✨ Features"));
    }

    #[test]
    fn unknown_type_is_discarded() {
        let changelog = plain();
        assert_eq!(changelog.transform(CommitRecord::new("unknowntype", "x"), &ctx()), None);
        assert_eq!(changelog.transform(CommitRecord::default(), &ctx()), None);
    }

    #[test]
    fn disabled_type_is_discarded() {
        let changelog = Changelog::with_config(Config::default().pick(CommitType::Docs, false));
        assert_eq!(changelog.transform(CommitRecord::new("docs", "typo"), &ctx()), None);
        assert!(changelog.transform(CommitRecord::new("style", "fmt"), &ctx()).is_some());
    }

    #[test]
    fn breaking_changes_are_kept() {
        let changelog = Changelog::with_config(Config::default().pick(CommitType::Docs, false));

        let commit = CommitRecord::new("unknowntype", "rework api").note("BREAKING CHANGE", "gone");
        let commit = changelog.transform(commit, &ctx()).unwrap();
        assert_eq!(commit.commit_type.as_deref(), Some("unknowntype"));
        assert_eq!(commit.notes[0].title, BREAKING_CHANGES);
        assert_eq!(commit.notes[0].text, "gone");

        let commit = CommitRecord::new("docs", "drop old docs")
            .note("BREAKING-CHANGE", "a")
            .note("Note", "b");
        let commit = changelog.transform(commit, &ctx()).unwrap();
        assert_eq!(commit.commit_type.as_deref(), Some("docs"));
        assert!(commit.notes.iter().all(|n| n.title == BREAKING_CHANGES));
    }

    #[test]
    fn breaking_known_type_gets_label() {
        let commit = CommitRecord::new("feat", "new api").note("BREAKING CHANGE", "x");
        let commit = plain().transform(commit, &ctx()).unwrap();
        assert_eq!(commit.commit_type.as_deref(), Some("Features"));
    }

    #[test]
    fn scope_star_is_cleared() {
        let commit = plain()
            .transform(CommitRecord::new("fix", "x").scope("*"), &ctx())
            .unwrap();
        assert_eq!(commit.scope.as_deref(), Some(""));

        let commit = plain()
            .transform(CommitRecord::new("fix", "x").scope("core"), &ctx())
            .unwrap();
        assert_eq!(commit.scope.as_deref(), Some("core"));
    }

    #[test]
    fn hash_is_shortened() {
        let commit = plain()
            .transform(CommitRecord::new("fix", "x").hash("abcdef1234567"), &ctx())
            .unwrap();
        assert_eq!(commit.hash.as_deref(), Some("abcdef1"));

        let commit = plain()
            .transform(CommitRecord::new("fix", "x").hash("ab"), &ctx())
            .unwrap();
        assert_eq!(commit.hash.as_deref(), Some("ab"));

        let mut commit = CommitRecord::new("fix", "x");
        commit.hash = None;
        assert_eq!(plain().transform(commit, &ctx()).unwrap().hash, None);
    }

    #[test]
    fn inline_issue_replaces_reference() {
        let commit = CommitRecord::new("fix", "fix #42")
            .reference(Reference::new("42"))
            .reference(Reference::new("43"));
        let commit = plain().transform(commit, &ctx()).unwrap();

        assert_eq!(commit.subject.as_deref(), Some("fix [#42](https://h/me/repo/issues/42)"));
        assert_eq!(commit.references, vec![Reference::new("43")]);
    }

    #[test]
    fn references_kept_without_base_url() {
        let commit = CommitRecord::new("fix", "fix #42").reference(Reference::new("42"));
        let commit = plain().transform(commit, &Context::default()).unwrap();

        assert_eq!(commit.subject.as_deref(), Some("fix #42"));
        assert_eq!(commit.references, vec![Reference::new("42")]);
    }

    #[test]
    fn bugs_url_annotation() {
        let changelog = Changelog::with_config(Config::default().bugs_url("https://bugs"));
        let commit = CommitRecord::new("fix", "fix #1").reference(Reference::new("99"));
        let commit = changelog.transform(commit, &ctx()).unwrap();

        assert_eq!(commit.references.len(), 1);
        assert_eq!(commit.references[0].issue, "99");
        assert_eq!(commit.references[0].bugs_url.as_deref(), Some("https://bugs"));
    }

    #[test]
    fn mentions() {
        let commit = plain()
            .transform(CommitRecord::new("feat", "thanks @alice, cc @org/team"), &ctx())
            .unwrap();
        assert_eq!(
            commit.subject.as_deref(),
            Some("thanks [@alice](https://h/alice), cc @org/team")
        );
    }

    #[test]
    fn missing_subject_is_skipped() {
        let mut commit = CommitRecord::new("perf", "").reference(Reference::new("5"));
        commit.subject = None;
        let commit = plain().transform(commit, &ctx()).unwrap();
        assert_eq!(commit.subject, None);
        assert_eq!(commit.references, vec![Reference::new("5")]);
    }

    #[test]
    fn second_pass_discards() {
        let changelog = plain();
        let once = changelog
            .transform(CommitRecord::new("feat", "x"), &ctx())
            .unwrap();
        assert_eq!(changelog.transform(once, &ctx()), None);

        let once = changelog
            .transform(CommitRecord::new("feat", "x").note("BREAKING CHANGE", "y"), &ctx())
            .unwrap();
        let twice = changelog.transform(once, &ctx()).unwrap();
        assert_eq!(twice.commit_type.as_deref(), Some("Features"));
    }

    #[test]
    fn shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Changelog>();

        let changelog = plain();
        let ctx = ctx();
        let labels: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = ["feat", "fix", "nope"]
                .into_iter()
                .map(|ty| {
                    let (changelog, ctx) = (&changelog, &ctx);
                    s.spawn(move || changelog.transform(CommitRecord::new(ty, "x"), ctx))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(labels[0].as_ref().unwrap().commit_type.as_deref(), Some("Features"));
        assert_eq!(labels[1].as_ref().unwrap().commit_type.as_deref(), Some("Bug Fixes"));
        assert_eq!(labels[2], None);
    }

    #[test]
    fn transform_all_filters() {
        let commits = vec![
            CommitRecord::new("feat", "a"),
            CommitRecord::new("wip", "b"),
            CommitRecord::new("fix", "c"),
        ];
        let kept = plain().transform_all(commits, &ctx());
        let subjects: Vec<_> = kept.iter().filter_map(|c| c.subject.as_deref()).collect();
        assert_eq!(subjects, vec!["a", "c"]);
    }
}
