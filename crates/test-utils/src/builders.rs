#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sitebuild::config::{ConfigFile, RawConfigFile, TargetConfig};
use sitebuild::fs::{FileSystem, MockFileSystem};
use sitebuild::paths::ProjectPaths;

/// Builder for an in-memory site checkout:
///
/// ```text
/// <root>/build/
/// <root>/web/...
/// <root>/vendor/...
/// ```
pub struct SiteTreeBuilder {
    root: PathBuf,
    fs: MockFileSystem,
}

impl SiteTreeBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let fs = MockFileSystem::new();
        fs.add_dir(root.join("build"));
        Self { root, fs }
    }

    /// Add a file below the root, e.g. `web/scss/main.scss`.
    pub fn file(self, rel: &str, content: &str) -> Self {
        self.fs.add_file(self.root.join(rel), content);
        self
    }

    pub fn dir(self, rel: &str) -> Self {
        self.fs.add_dir(self.root.join(rel));
        self
    }

    /// An installed `vendor/` directory, the default release path.
    pub fn with_vendor(self) -> Self {
        self.file("vendor/autoload.php", "<?php\n")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn paths(&self) -> ProjectPaths {
        ProjectPaths::resolve(self.root.join("build"), "web")
    }

    /// The mock filesystem, shared with every clone.
    pub fn build(self) -> MockFileSystem {
        self.fs
    }

    pub fn build_shared(self) -> (MockFileSystem, Arc<dyn FileSystem>) {
        let shared: Arc<dyn FileSystem> = Arc::new(self.fs.clone());
        (self.fs, shared)
    }
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn compiler(mut self, program: &str, args: &[&str]) -> Self {
        self.config.assets.compiler = program.to_string();
        self.config.assets.compiler_args = args.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn release_paths(mut self, paths: &[&str]) -> Self {
        self.config.release.paths = paths.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn use_ssh_config(mut self, enabled: bool) -> Self {
        self.config.release.use_ssh_config = enabled;
        self
    }

    pub fn target(mut self, env: &str, target: TargetConfig) -> Self {
        self.config.target.insert(env.to_string(), target);
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Invalid test configuration")
    }
}

/// A target with a remote path and the given hosts.
pub fn target(remote_path: &str, branch: &str, hosts: &[&str]) -> TargetConfig {
    TargetConfig {
        remote_path: remote_path.to_string(),
        release_branch: branch.to_string(),
        hosts: hosts.iter().map(|s| s.to_string()).collect(),
        release_paths: None,
    }
}
