// src/paths.rs

//! Location of the build directory and the directories derived from it.

use std::path::{Path, PathBuf};

/// Name of the conventional build directory inside the repository root.
pub const BUILD_DIR_NAME: &str = "build";

/// Directories every task works relative to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    /// Directory holding the config file (`build/`).
    pub build_dir: PathBuf,
    /// Sibling of the build directory holding the web assets (`web/`).
    pub web_dir: PathBuf,
    /// Parent of the build directory; the git working tree that is released.
    pub repo_root: PathBuf,
}

impl ProjectPaths {
    /// Derive all project directories from the build directory.
    ///
    /// A build directory without a parent (e.g. a bare `"build"`) is treated
    /// as living in `"."`.
    pub fn resolve(build_dir: impl Into<PathBuf>, web_dir_name: &str) -> Self {
        let build_dir = build_dir.into();
        let repo_root = match build_dir.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let web_dir = repo_root.join(web_dir_name);

        Self {
            build_dir,
            web_dir,
            repo_root,
        }
    }
}

/// Pick the build directory for this invocation.
///
/// - An explicit `--build-dir` always wins.
/// - Otherwise `<cwd>/build` if it exists (running from the repository root).
/// - Otherwise the working directory itself (running from inside `build/`).
pub fn locate_build_dir(cwd: &Path, explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }

    let nested = cwd.join(BUILD_DIR_NAME);
    if nested.is_dir() {
        nested
    } else {
        cwd.to_path_buf()
    }
}
