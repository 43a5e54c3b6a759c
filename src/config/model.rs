// src/config/model.rs

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::types::Environment;

pub const DEFAULT_AUTHOR: &str = "Jan Christlieb <mail@janchristlieb.de>";

/// Configuration as read from `sitebuild.toml`, before validation.
///
/// ```toml
/// [assets]
/// web_dir = "web"
/// source_dirs = ["scss", "sass"]
/// compiler = "sass"
/// compiler_args = ["--no-source-map"]
///
/// [release]
/// author = "Jan Christlieb <mail@janchristlieb.de>"
/// paths = ["vendor"]
/// use_ssh_config = true
///
/// [target.staging]
/// remote_path = "/home/www/p485630/html/jc"
/// release_branch = "staging"
/// hosts = ["escaperoom-dillingen"]
/// ```
///
/// Every section is optional; a missing file behaves like an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub assets: AssetsSection,

    #[serde(default)]
    pub release: ReleaseSection,

    /// `[target.<environment>]` tables, keyed by environment name. Each
    /// replaces the built-in target of the same environment.
    #[serde(default)]
    pub target: BTreeMap<String, TargetConfig>,
}

/// Validated configuration.
///
/// Only constructed through `TryFrom<RawConfigFile>` (see `validate.rs`), so
/// holders can rely on the invariants checked there.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub assets: AssetsSection,
    pub release: ReleaseSection,
    pub author: ReleaseAuthor,
    targets: BTreeMap<Environment, TargetConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        assets: AssetsSection,
        release: ReleaseSection,
        author: ReleaseAuthor,
        targets: BTreeMap<Environment, TargetConfig>,
    ) -> Self {
        Self {
            assets,
            release,
            author,
            targets,
        }
    }

    /// Configured target for an environment.
    ///
    /// Validation fills in built-in targets, so every environment is present.
    pub fn target(&self, env: Environment) -> &TargetConfig {
        &self.targets[&env]
    }

    pub fn targets(&self) -> impl Iterator<Item = (&Environment, &TargetConfig)> {
        self.targets.iter()
    }
}

/// `[assets]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetsSection {
    /// Name of the web-asset directory next to the build directory.
    #[serde(default = "default_web_dir")]
    pub web_dir: String,

    /// Directory names holding stylesheet sources.
    #[serde(default = "default_source_dirs")]
    pub source_dirs: Vec<String>,

    /// Compiler executable, invoked as `<compiler> <args...> <source> <output>`.
    #[serde(default = "default_compiler")]
    pub compiler: String,

    #[serde(default)]
    pub compiler_args: Vec<String>,
}

fn default_web_dir() -> String {
    "web".to_string()
}

fn default_source_dirs() -> Vec<String> {
    vec!["scss".to_string(), "sass".to_string()]
}

fn default_compiler() -> String {
    "sass".to_string()
}

impl Default for AssetsSection {
    fn default() -> Self {
        Self {
            web_dir: default_web_dir(),
            source_dirs: default_source_dirs(),
            compiler: default_compiler(),
            compiler_args: Vec::new(),
        }
    }
}

/// `[release]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseSection {
    /// `Name <email>` used as author and committer of release commits.
    #[serde(default = "default_author")]
    pub author: String,

    /// Top-level paths that make up a release commit.
    #[serde(default = "default_release_paths")]
    pub paths: Vec<String>,

    /// Whether ssh may read `~/.ssh/config` (host aliases live there).
    #[serde(default = "default_use_ssh_config")]
    pub use_ssh_config: bool,
}

fn default_author() -> String {
    DEFAULT_AUTHOR.to_string()
}

fn default_release_paths() -> Vec<String> {
    vec!["vendor".to_string()]
}

fn default_use_ssh_config() -> bool {
    true
}

impl Default for ReleaseSection {
    fn default() -> Self {
        Self {
            author: default_author(),
            paths: default_release_paths(),
            use_ssh_config: default_use_ssh_config(),
        }
    }
}

/// `[target.<environment>]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TargetConfig {
    /// Path of the git checkout on the remote hosts. Empty means "not
    /// provisioned yet"; deploying to such a target fails up front.
    #[serde(default)]
    pub remote_path: String,

    pub release_branch: String,

    /// Hosts (usually `~/.ssh/config` aliases), deployed in order.
    pub hosts: Vec<String>,

    /// Overrides `[release].paths` for this target.
    #[serde(default)]
    pub release_paths: Option<Vec<String>>,
}

impl TargetConfig {
    /// Effective allow-list: the target override, else the global list.
    pub fn effective_release_paths<'a>(&'a self, release: &'a ReleaseSection) -> &'a [String] {
        self.release_paths.as_deref().unwrap_or(&release.paths)
    }
}

/// Targets used when the config file does not mention an environment.
pub fn builtin_targets() -> BTreeMap<Environment, TargetConfig> {
    let mut targets = BTreeMap::new();
    targets.insert(
        Environment::Production,
        TargetConfig {
            remote_path: String::new(),
            release_branch: "production".to_string(),
            hosts: vec!["jan.mittwald".to_string()],
            release_paths: None,
        },
    );
    targets.insert(
        Environment::Staging,
        TargetConfig {
            remote_path: "/home/www/p485630/html/jc".to_string(),
            release_branch: "staging".to_string(),
            hosts: vec!["escaperoom-dillingen".to_string()],
            release_paths: None,
        },
    );
    targets
}

/// Identity of release commits, parsed from `Name <email>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAuthor {
    pub name: String,
    pub email: String,
}

fn author_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?P<name>[^<>]*?)\s*<(?P<email>[^<>\s]+@[^<>\s]+)>\s*$")
            .expect("author regex is valid")
    })
}

impl FromStr for ReleaseAuthor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = author_regex()
            .captures(s)
            .ok_or_else(|| format!("invalid author '{s}' (expected \"Name <email>\")"))?;

        let name = caps["name"].to_string();
        if name.is_empty() {
            return Err(format!("author '{s}' has an empty name"));
        }

        Ok(Self {
            name,
            email: caps["email"].to_string(),
        })
    }
}

impl fmt::Display for ReleaseAuthor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}
