use std::{fs, path::Path};

use indexmap::IndexMap;
use log::debug;
use serde::{de::IgnoredAny, Deserialize, Deserializer};
use strum::IntoEnumIterator;

use crate::{
    commit_type::CommitType,
    error::{Error, Result},
    fmt::ChangelogFormat,
};

/// The placeholder in a commit partial that receives the attribution line
pub const USER_INFO_PLACEHOLDER: &str = "{{gitUserInfo}}";

/// The settings file as written by the user. Only the `changelog` section is
/// read, and it must be present.
#[derive(Debug, Deserialize)]
pub struct RawCfg {
    pub changelog: Option<RawChangelogCfg>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawChangelogCfg {
    #[serde(alias = "pick-commit-type", deserialize_with = "lenient_map")]
    pub pick_commit_type: IndexMap<String, Setting>,
    #[serde(alias = "bugs-url")]
    pub bugs_url: Option<Setting>,
    pub emojis: Option<Setting>,
    #[serde(alias = "author-name")]
    pub author_name: Option<Setting>,
    #[serde(alias = "author-email")]
    pub author_email: Option<Setting>,
    #[serde(alias = "output-format")]
    pub output_format: Option<ChangelogFormat>,
}

/// A loosely typed setting value. Settings files are hand written, so any
/// value is accepted and judged by truthiness.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Setting {
    Null,
    Flag(bool),
    Text(String),
    Number(f64),
    Other(IgnoredAny),
}

impl Setting {
    pub fn is_truthy(&self) -> bool {
        match self {
            Setting::Null => false,
            Setting::Flag(b) => *b,
            Setting::Text(s) => !s.is_empty(),
            Setting::Number(n) => *n != 0.0 && !n.is_nan(),
            Setting::Other(_) => true,
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            Setting::Text(s) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }
}

fn lenient_map<'de, D>(deserializer: D) -> std::result::Result<IndexMap<String, Setting>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MapOrNot {
        Map(IndexMap<String, Setting>),
        Other(IgnoredAny),
    }

    Ok(match MapOrNot::deserialize(deserializer)? {
        MapOrNot::Map(m) => m,
        MapOrNot::Other(_) => IndexMap::new(),
    })
}

/// How the commit author is credited next to each changelog entry
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthorAttribution {
    NameAndEmail,
    Name,
    Email,
    #[default]
    Hidden,
}

impl AuthorAttribution {
    pub fn from_flags(name: bool, email: bool) -> Self {
        match (name, email) {
            (true, true) => AuthorAttribution::NameAndEmail,
            (true, false) => AuthorAttribution::Name,
            (false, true) => AuthorAttribution::Email,
            (false, false) => AuthorAttribution::Hidden,
        }
    }

    /// The attribution fragment, with `{{authorName}}`/`{{authorEmail}}`
    /// left for the renderer to fill per commit
    pub fn template(self) -> &'static str {
        match self {
            AuthorAttribution::NameAndEmail => "by: **{{authorName}}** ({{authorEmail}})",
            AuthorAttribution::Name => "by: **{{authorName}}**",
            AuthorAttribution::Email => "by: ({{authorEmail}})",
            AuthorAttribution::Hidden => "",
        }
    }

    /// Fills the template for one commit. Missing values render empty.
    pub fn render(self, name: Option<&str>, email: Option<&str>) -> String {
        self.template()
            .replace("{{authorName}}", name.unwrap_or_default())
            .replace("{{authorEmail}}", email.unwrap_or_default())
    }
}

/// The resolved, immutable rule set used to transform commits.
///
/// # Example
///
/// ```
/// # use clog_writer::{Config, CommitType};
/// let cfg = Config::default().emojis(true).bugs_url("https://bugs.example.com");
/// assert!(cfg.is_picked(CommitType::Chore));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Which categories make it into the changelog, keyed by raw tag
    pub pick_commit_type: IndexMap<String, bool>,
    /// Prefix section titles with a glyph
    pub emojis: bool,
    /// Issue tracker URL attached to every surviving reference
    pub bugs_url: Option<String>,
    pub author_attribution: AuthorAttribution,
    /// The format `Changelog::write_changelog_to` writes in
    pub output_format: ChangelogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pick_commit_type: default_pick_commit_type(),
            emojis: false,
            bugs_url: None,
            author_attribution: AuthorAttribution::Hidden,
            output_format: ChangelogFormat::Markdown,
        }
    }
}

fn default_pick_commit_type() -> IndexMap<String, bool> {
    CommitType::iter().map(|ty| (ty.tag().to_owned(), true)).collect()
}

impl Config {
    /// Resolves the effective rule set from a `changelog` section.
    ///
    /// A non-empty `pickCommitType` replaces the default map wholesale, so
    /// any tag it leaves out is disabled.
    pub fn resolve(raw: RawChangelogCfg) -> Self {
        let pick_commit_type = if raw.pick_commit_type.is_empty() {
            default_pick_commit_type()
        } else {
            raw.pick_commit_type
                .iter()
                .map(|(tag, v)| (tag.clone(), v.is_truthy()))
                .collect()
        };
        let truthy = |s: &Option<Setting>| s.as_ref().map_or(false, Setting::is_truthy);

        let cfg = Config {
            pick_commit_type,
            emojis: truthy(&raw.emojis),
            bugs_url: raw
                .bugs_url
                .as_ref()
                .and_then(Setting::as_text)
                .map(str::to_owned),
            author_attribution: AuthorAttribution::from_flags(
                truthy(&raw.author_name),
                truthy(&raw.author_email),
            ),
            output_format: raw.output_format.unwrap_or_default(),
        };
        debug!("Resolved config:\n{:?}", cfg);
        cfg
    }

    fn from_raw(raw: RawCfg) -> Result<Self> {
        raw.changelog.map(Config::resolve).ok_or(Error::MissingSection)
    }

    /// Resolves a config from TOML text holding a `[changelog]` table
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Config::from_raw(toml::from_str(s)?)
    }

    /// Resolves a config from a JSON manifest (e.g. `package.json`) holding
    /// a `changelog` object
    pub fn from_json_str(s: &str) -> Result<Self> {
        Config::from_raw(serde_json::from_str(s)?)
    }

    /// Reads a settings file. Files ending in `.json` are read as a JSON
    /// manifest, anything else as TOML.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        debug!("Trying to use config file: {:?}", file);
        let contents = fs::read_to_string(file)?;

        let res = if file.extension().map_or(false, |ext| ext == "json") {
            Config::from_json_str(&contents)
        } else {
            Config::from_toml_str(&contents)
        };

        res.map_err(|e| match e {
            Error::MissingSection => Error::ConfigFormat(file.to_path_buf()),
            Error::Toml(_) | Error::Json(_) => {
                debug!("Parsing {:?} failed: {}", file, e);
                Error::ConfigParse(file.to_path_buf())
            }
            e => e,
        })
    }

    pub fn is_picked(&self, ty: CommitType) -> bool {
        self.pick_commit_type.get(ty.tag()).copied().unwrap_or(false)
    }

    /// Enables or disables a single category
    pub fn pick(mut self, ty: CommitType, picked: bool) -> Self {
        self.pick_commit_type.insert(ty.tag().to_owned(), picked);
        self
    }

    pub fn emojis(mut self, e: bool) -> Self {
        self.emojis = e;
        self
    }

    pub fn bugs_url<S: Into<String>>(mut self, u: S) -> Self {
        self.bugs_url = Some(u.into());
        self
    }

    pub fn author_attribution(mut self, a: AuthorAttribution) -> Self {
        self.author_attribution = a;
        self
    }

    pub fn output_format(mut self, f: ChangelogFormat) -> Self {
        self.output_format = f;
        self
    }

    /// Substitutes the attribution fragment for every `{{gitUserInfo}}`
    /// placeholder of a commit partial
    pub fn commit_partial(&self, partial: &str) -> String {
        partial.replace(USER_INFO_PLACEHOLDER, self.author_attribution.template())
    }
}
