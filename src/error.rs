use std::{path::PathBuf, result::Result as StdResult};

use thiserror::Error;

pub type Result<T> = StdResult<T, Error>;

/// An enum for describing and handling various errors encountered while
/// resolving the changelog configuration or writing a changelog.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse config file: {0}")]
    ConfigParse(PathBuf),

    #[error("config file has no `changelog` section: {0}")]
    ConfigFormat(PathBuf),

    #[error("settings have no `changelog` section")]
    MissingSection,

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot get current directory")]
    CurrentDir,

    #[error("fatal I/O error")]
    Io(#[from] std::io::Error),

    #[error("failed to convert date/time to string format")]
    TimeStrFormat(#[from] time::error::Format),

    #[error("failed to convert {0} to valid ChangelogFormat")]
    ChangelogFormat(String),
}
