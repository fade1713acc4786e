//! Inline issue and mention links, and the cleanup of references that those
//! links make redundant.

use log::trace;
use regex::{Captures, Regex};

use crate::git::{Context, Reference};

fn issue_regex() -> &'static Regex {
    regex!(r"#([0-9]+)")
}

// One leading alphanumeric, then up to 38 more, each optionally preceded by a
// single hyphen. Slashes are matched so `@org/team` is consumed as one token.
// The word boundary before `@` is checked in `link_mentions`.
fn mention_regex() -> &'static Regex {
    regex!(r"@([a-z0-9](?:-?[a-z0-9/]){0,38})")
}

// Only ASCII letters, digits and `_` are word characters here, so `café@bob`
// still has a boundary before the `@`.
fn follows_word_char(subject: &str, at: usize) -> bool {
    subject[..at]
        .chars()
        .next_back()
        .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_')
}

/// Replaces every `#123` with a markdown link under `issues_url` and returns
/// the linked issue numbers in order of appearance, duplicates included.
///
/// # Example
///
/// ```
/// # use clog_writer::references::link_issues;
/// let (subject, issues) = link_issues("fix #4 and #5", "https://h/o/r/issues/");
/// assert_eq!(subject, "fix [#4](https://h/o/r/issues/4) and [#5](https://h/o/r/issues/5)");
/// assert_eq!(issues, vec!["4", "5"]);
/// ```
pub fn link_issues(subject: &str, issues_url: &str) -> (String, Vec<String>) {
    let mut issues = vec![];
    let linked = issue_regex().replace_all(subject, |caps: &Captures| {
        let issue = &caps[1];
        issues.push(issue.to_owned());
        format!("[#{issue}]({issues_url}{issue})")
    });
    (linked.into_owned(), issues)
}

/// Replaces every `@user` mention with a link to `{host}/user`. Mentions
/// containing a slash (`@org/team`) are left as they are.
pub fn link_mentions(subject: &str, host: &str) -> String {
    mention_regex()
        .replace_all(subject, |caps: &Captures| {
            let username = &caps[1];
            if follows_word_char(subject, caps.get(0).map_or(0, |m| m.start())) {
                caps[0].to_owned()
            } else if username.contains('/') {
                format!("@{username}")
            } else {
                format!("[@{username}]({host}/{username})")
            }
        })
        .into_owned()
}

/// Rewrites a commit subject in place and returns the issue numbers that
/// are now linked inline.
///
/// Issue links need a repository base URL from the context, mention links
/// need a host. Either rewrite happens without the other.
pub fn rewrite_subject(subject: &mut String, ctx: &Context) -> Vec<String> {
    let mut issues = vec![];
    if let Some(url) = ctx.issues_url() {
        let (linked, found) = link_issues(subject, &url);
        *subject = linked;
        issues = found;
    }
    if let Some(host) = ctx.host() {
        *subject = link_mentions(subject, host);
    }
    trace!("Rewrote subject {:?}, linked issues {:?}", subject, issues);
    issues
}

/// Drops references to issues already linked in the subject and, when an
/// issue tracker URL is configured, attaches it to the ones that remain.
/// Order is preserved.
pub fn dedup_references(
    references: Vec<Reference>,
    linked: &[String],
    bugs_url: Option<&str>,
) -> Vec<Reference> {
    references
        .into_iter()
        .filter(|r| !linked.contains(&r.issue))
        .map(|mut r| {
            if let Some(url) = bugs_url {
                r.bugs_url = Some(url.to_owned());
            }
            r
        })
        .collect()
}
