// src/release/target.rs

//! Environment selection: turns `production` / `staging` plus the loaded
//! configuration into the explicit context every release operation receives.

use std::path::PathBuf;

use crate::config::{ConfigFile, ReleaseAuthor};
use crate::errors::{Result, SiteError};
use crate::paths::ProjectPaths;
use crate::release::filter::ReleaseFilter;
use crate::types::Environment;

/// Where a release goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTarget {
    pub environment: Environment,
    pub remote_path: String,
    pub release_branch: String,
    pub hosts: Vec<String>,
}

/// How `ssh` (directly and underneath `git`) is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SshOptions {
    /// When false, ssh runs with `-F /dev/null` and ignores `~/.ssh/config`.
    pub use_ssh_config: bool,
}

impl SshOptions {
    pub fn ssh_args(&self) -> Vec<String> {
        if self.use_ssh_config {
            Vec::new()
        } else {
            vec!["-F".to_string(), "/dev/null".to_string()]
        }
    }

    /// Value for `GIT_SSH_COMMAND`, if the default ssh invocation won't do.
    pub fn git_ssh_command(&self) -> Option<String> {
        if self.use_ssh_config {
            None
        } else {
            Some("ssh -F /dev/null".to_string())
        }
    }
}

/// Everything a deploy run needs, fixed once the environment is selected.
#[derive(Debug, Clone)]
pub struct DeployContext {
    pub target: DeploymentTarget,
    pub filter: ReleaseFilter,
    pub author: ReleaseAuthor,
    /// Local git working tree the release is cut from.
    pub repo_root: PathBuf,
    pub ssh: SshOptions,
}

impl DeployContext {
    /// Fail before touching git or the network if the target cannot be
    /// deployed to.
    pub fn ensure_deployable(&self) -> Result<()> {
        let env = self.target.environment;
        if self.target.remote_path.trim().is_empty() {
            return Err(SiteError::ConfigError(format!(
                "remote_path for target '{env}' is not configured"
            )));
        }
        if self.target.hosts.is_empty() {
            return Err(SiteError::ConfigError(format!(
                "target '{env}' has no hosts"
            )));
        }
        Ok(())
    }

    /// Git remote for one host, in scp syntax (`host:/path/to/repo`).
    pub fn remote_url(&self, host: &str) -> String {
        format!("{}:{}", host, self.target.remote_path)
    }

    pub fn branch_ref(&self) -> String {
        format!("refs/heads/{}", self.target.release_branch)
    }
}

/// Build the deploy context for `env`.
pub fn select_environment(env: Environment, cfg: &ConfigFile, paths: &ProjectPaths) -> DeployContext {
    let target_cfg = cfg.target(env);

    DeployContext {
        target: DeploymentTarget {
            environment: env,
            remote_path: target_cfg.remote_path.clone(),
            release_branch: target_cfg.release_branch.clone(),
            hosts: target_cfg.hosts.clone(),
        },
        filter: ReleaseFilter::new(target_cfg.effective_release_paths(&cfg.release).iter().cloned()),
        author: cfg.author.clone(),
        repo_root: paths.repo_root.clone(),
        ssh: SshOptions {
            use_ssh_config: cfg.release.use_ssh_config,
        },
    }
}

/// Quote `s` for a POSIX shell.
pub fn shell_quote(s: &str) -> String {
    if !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@".contains(c))
    {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', r"'\''"))
}
