// src/release/filter.rs

use std::path::Path;

use tracing::debug;

use crate::errors::{Result, SiteError};
use crate::fs::FileSystem;

/// The allow-list of top-level paths a release commit is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFilter {
    paths: Vec<String>,
}

impl ReleaseFilter {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Check that every listed path exists below `root` and return them.
    ///
    /// Nothing is selected unless everything is present: the first missing
    /// path fails the whole selection.
    pub fn select(&self, fs: &dyn FileSystem, root: &Path) -> Result<Vec<String>> {
        for name in &self.paths {
            let full = root.join(name);
            if !fs.exists(&full) {
                return Err(SiteError::MissingReleasePath {
                    path: name.clone(),
                    root: root.to_path_buf(),
                });
            }
            debug!(path = %name, "release path present");
        }
        Ok(self.paths.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn selects_all_paths_when_present() {
        let fs = MockFileSystem::new();
        fs.add_file("repo/vendor/autoload.php", "<?php");
        fs.add_dir("repo/nova");

        let filter = ReleaseFilter::new(["vendor", "nova"]);
        let selected = filter.select(&fs, Path::new("repo")).unwrap();
        assert_eq!(selected, vec!["vendor", "nova"]);
    }

    #[test]
    fn first_missing_path_is_reported() {
        let fs = MockFileSystem::new();
        fs.add_dir("repo/nova");

        let filter = ReleaseFilter::new(["vendor", "nova"]);
        match filter.select(&fs, Path::new("repo")) {
            Err(SiteError::MissingReleasePath { path, root }) => {
                assert_eq!(path, "vendor");
                assert_eq!(root, Path::new("repo"));
            }
            other => panic!("expected MissingReleasePath, got {other:?}"),
        }
    }
}
