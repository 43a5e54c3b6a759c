// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// An allow-listed release path is absent from the working tree.
    #[error("release path '{path}' does not exist in {root:?}")]
    MissingReleasePath { path: String, root: PathBuf },

    /// An external process (`sass`, `git`, `ssh`) exited unsuccessfully.
    #[error("`{command}` failed (exit code {code:?}): {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("no deployment target selected; run `production` or `staging` first")]
    NoTargetSelected,

    #[error("Invalid task list: {0}")]
    InvalidTaskPlan(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SiteError>;
