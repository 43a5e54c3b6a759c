// src/release/mod.rs

//! Git-based two-phase deployment.
//!
//! - [`target`] selects an environment and builds the `DeployContext`.
//! - [`filter`] validates and selects the allow-listed release paths.
//! - [`git`] wraps the `git` plumbing commands.
//! - [`manager`] sequences pull, release commit, push and switch.

pub mod filter;
pub mod git;
pub mod manager;
pub mod target;

pub use filter::ReleaseFilter;
pub use git::GitRepo;
pub use manager::{ReleaseCommit, ReleaseManager};
pub use target::{select_environment, DeployContext, DeploymentTarget, SshOptions};
