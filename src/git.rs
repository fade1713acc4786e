use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// The struct representation of an already parsed commit.
///
/// Field names follow the upstream conventional commit parser, so a record
/// round-trips through JSON with `type`, `authorName` and so on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommitRecord {
    /// The commit type, or its display label once transformed
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub commit_type: Option<String>,
    /// The scope (if any)
    #[serde(deserialize_with = "lenient_string")]
    pub scope: Option<String>,
    /// The commit hash, shortened to 7 chars once transformed
    #[serde(deserialize_with = "lenient_string")]
    pub hash: Option<String>,
    /// The commit subject
    #[serde(deserialize_with = "lenient_string")]
    pub subject: Option<String>,
    /// Breaking change notes
    pub notes: Vec<Note>,
    /// Issues this commit refers to
    pub references: Vec<Reference>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    /// Any other parser fields, carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CommitRecord {
    pub fn new<S: Into<String>>(commit_type: S, subject: S) -> Self {
        CommitRecord {
            commit_type: Some(commit_type.into()),
            subject: Some(subject.into()),
            ..CommitRecord::default()
        }
    }

    pub fn scope<S: Into<String>>(mut self, scope: S) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn hash<S: Into<String>>(mut self, hash: S) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn note<S: Into<String>>(mut self, title: S, text: S) -> Self {
        self.notes.push(Note {
            title: title.into(),
            text: text.into(),
        });
        self
    }

    pub fn reference(mut self, reference: Reference) -> Self {
        self.references.push(reference);
        self
    }

    pub fn author<S: Into<String>>(mut self, name: Option<S>, email: Option<S>) -> Self {
        self.author_name = name.map(Into::into);
        self.author_email = email.map(Into::into);
        self
    }

    /// Whether this commit carries breaking change notes
    pub fn is_breaking(&self) -> bool {
        !self.notes.is_empty()
    }
}

/// A breaking change note
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Note {
    pub title: String,
    pub text: String,
}

/// A structured cross-reference, e.g. the `Closes #12` footer of a commit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Reference {
    pub issue: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    /// Issue tracker URL, set from the `bugsUrl` setting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bugs_url: Option<String>,
}

impl Reference {
    pub fn new<S: Into<String>>(issue: S) -> Self {
        Reference {
            issue: issue.into(),
            ..Reference::default()
        }
    }

    pub fn action<S: Into<String>>(mut self, action: S) -> Self {
        self.action = Some(action.into());
        self
    }
}

/// Per-render information about the repository and the release
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Context {
    /// Host URL, e.g. `https://github.com`
    pub host: Option<String>,
    pub owner: Option<String>,
    /// Repository name, combined with `host` and `owner`
    pub repository: Option<String>,
    /// Full repository URL, used when `repository` is not set
    pub repo_url: Option<String>,
    pub version: Option<String>,
    pub title: Option<String>,
    /// Release date, today (UTC) when not set
    pub date: Option<String>,
    /// Patch releases use a smaller heading
    pub is_patch: bool,
    pub link_compare: bool,
    pub previous_tag: Option<String>,
    pub current_tag: Option<String>,
}

impl Context {
    /// A context for `{host}/{owner}/{repository}`
    pub fn hosted<S: Into<String>>(host: S, owner: S, repository: S) -> Self {
        Context {
            host: Some(host.into()),
            owner: Some(owner.into()),
            repository: Some(repository.into()),
            ..Context::default()
        }
    }

    /// A context for a plain repository URL
    pub fn with_repo_url<S: Into<String>>(repo_url: S) -> Self {
        Context {
            repo_url: Some(repo_url.into()),
            ..Context::default()
        }
    }

    pub fn version<S: Into<String>>(mut self, v: S) -> Self {
        self.version = Some(v.into());
        self
    }

    /// The repository link base: `{host}/{owner}/{repository}` when a
    /// repository name is given, else `repoUrl`. Empty values count as unset.
    pub fn base_url(&self) -> Option<String> {
        match non_empty(&self.repository) {
            Some(repository) => Some(format!(
                "{}/{}/{}",
                self.host.as_deref().unwrap_or_default(),
                self.owner.as_deref().unwrap_or_default(),
                repository
            )),
            None => non_empty(&self.repo_url).map(str::to_owned),
        }
    }

    pub fn issues_url(&self) -> Option<String> {
        self.base_url().map(|base| format!("{base}/issues/"))
    }

    pub fn host(&self) -> Option<&str> {
        non_empty(&self.host)
    }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

// A field that is present but not a string is treated as missing, so the
// transform for that one field is skipped instead of failing the record.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}
