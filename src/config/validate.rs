// src/config/validate.rs

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::config::model::{
    builtin_targets, ConfigFile, RawConfigFile, ReleaseAuthor, TargetConfig,
};
use crate::errors::{Result, SiteError};
use crate::types::Environment;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SiteError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_assets(&raw)?;
        validate_release_paths("[release].paths", &raw.release.paths)?;
        let author = ReleaseAuthor::from_str(&raw.release.author)
            .map_err(|e| SiteError::ConfigError(format!("[release].author: {e}")))?;
        let targets = merge_targets(raw.target)?;

        Ok(ConfigFile::new_unchecked(
            raw.assets,
            raw.release,
            author,
            targets,
        ))
    }
}

fn validate_assets(cfg: &RawConfigFile) -> Result<()> {
    if cfg.assets.compiler.trim().is_empty() {
        return Err(SiteError::ConfigError(
            "[assets].compiler must not be empty".to_string(),
        ));
    }
    if cfg.assets.source_dirs.is_empty() {
        return Err(SiteError::ConfigError(
            "[assets].source_dirs must name at least one directory".to_string(),
        ));
    }
    for name in &cfg.assets.source_dirs {
        if !is_single_component(name) {
            return Err(SiteError::ConfigError(format!(
                "[assets].source_dirs entry '{}' must be a plain directory name",
                name
            )));
        }
    }
    if !is_single_component(&cfg.assets.web_dir) {
        return Err(SiteError::ConfigError(format!(
            "[assets].web_dir '{}' must be a plain directory name",
            cfg.assets.web_dir
        )));
    }
    Ok(())
}

/// Release paths are top-level entries of the working tree.
fn validate_release_paths(field: &str, paths: &[String]) -> Result<()> {
    if paths.is_empty() {
        return Err(SiteError::ConfigError(format!(
            "{field} must list at least one path"
        )));
    }
    for path in paths {
        if !is_single_component(path) {
            return Err(SiteError::ConfigError(format!(
                "{field} entry '{}' must be a top-level name (no '/', not '.' or '..')",
                path
            )));
        }
    }
    Ok(())
}

fn is_single_component(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}

/// Overlay configured targets on the built-in ones, validating each.
fn merge_targets(
    configured: BTreeMap<String, TargetConfig>,
) -> Result<BTreeMap<Environment, TargetConfig>> {
    let mut targets = builtin_targets();

    for (name, target) in configured {
        let env = Environment::from_str(&name)
            .map_err(|e| SiteError::ConfigError(format!("[target.{name}]: {e}")))?;
        validate_target(env, &target)?;
        targets.insert(env, target);
    }

    Ok(targets)
}

fn validate_target(env: Environment, target: &TargetConfig) -> Result<()> {
    let branch = &target.release_branch;
    if branch.is_empty() || branch.contains(char::is_whitespace) || branch.starts_with('-') {
        return Err(SiteError::ConfigError(format!(
            "[target.{env}].release_branch '{branch}' is not a valid branch name"
        )));
    }
    if target.hosts.is_empty() {
        return Err(SiteError::ConfigError(format!(
            "[target.{env}].hosts must list at least one host"
        )));
    }
    if target.hosts.iter().any(|h| h.trim().is_empty()) {
        return Err(SiteError::ConfigError(format!(
            "[target.{env}].hosts must not contain empty entries"
        )));
    }
    if let Some(paths) = &target.release_paths {
        validate_release_paths(&format!("[target.{env}].release_paths"), paths)?;
    }
    Ok(())
}
