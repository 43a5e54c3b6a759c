// src/assets/discover.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};

use crate::fs::FileSystem;

/// Stylesheet sources the compiler accepts.
///
/// Indented-syntax `.sass` files are compiled and watched as well as `.scss`.
pub const SOURCE_PATTERNS: &[&str] = &["**/*.scss", "**/*.sass"];

/// Partials are included by other stylesheets and never compiled standalone.
pub const PARTIAL_PATTERNS: &[&str] = &["**/_*"];

/// Name of the directory compiled CSS is written to, next to the source dir.
pub const OUTPUT_DIR_NAME: &str = "css";

/// Compiled include/exclude patterns for stylesheet sources.
///
/// Patterns are evaluated against paths relative to a source directory, with
/// forward slashes (e.g. `"components/_buttons.scss"`). `*` never crosses a
/// `/`, so the partial pattern only looks at the file's base name.
#[derive(Clone)]
pub struct SourceMatcher {
    include: GlobSet,
    exclude: GlobSet,
}

impl fmt::Debug for SourceMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceMatcher").finish_non_exhaustive()
    }
}

impl SourceMatcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            include: build_globset(SOURCE_PATTERNS).context("building source globset")?,
            exclude: build_globset(PARTIAL_PATTERNS).context("building partial globset")?,
        })
    }

    /// True for any stylesheet, partial or not.
    pub fn is_stylesheet(&self, rel_path: &str) -> bool {
        self.include.is_match(rel_path)
    }

    /// True for stylesheets that should be compiled on their own.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.is_stylesheet(rel_path) && !self.exclude.is_match(rel_path)
    }
}

fn build_globset(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// One stylesheet and the CSS file it compiles to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceOutputPair {
    pub source: PathBuf,
    pub output: PathBuf,
}

/// Derive the CSS path for `source`, which must live under `source_dir`.
///
/// `web/theme/scss/pages/home.scss` under `web/theme/scss` becomes
/// `web/theme/css/pages/home.css`.
pub fn css_output_path(source_dir: &Path, source: &Path) -> Option<PathBuf> {
    let rel = source.strip_prefix(source_dir).ok()?;
    if rel.as_os_str().is_empty() {
        return None;
    }
    let output_dir = source_dir.with_file_name(OUTPUT_DIR_NAME);
    Some(output_dir.join(rel).with_extension("css"))
}

/// Recursively find every directory under `web_dir` named one of `names`.
///
/// A matching directory is not searched for further source directories, so
/// every stylesheet belongs to exactly one of the returned dirs. A missing
/// `web_dir` yields an empty list.
pub fn find_source_dirs(fs: &dyn FileSystem, web_dir: &Path, names: &[String]) -> Result<Vec<PathBuf>> {
    if !fs.is_dir(web_dir) {
        warn!(?web_dir, "web directory does not exist; nothing to compile");
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    let mut pending = vec![web_dir.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in fs.read_dir(&dir)? {
            if !fs.is_dir(&entry) {
                continue;
            }
            let is_source_dir = entry
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| names.iter().any(|name| name == n));

            if is_source_dir {
                debug!(dir = ?entry, "found stylesheet source directory");
                found.push(entry);
            } else {
                pending.push(entry);
            }
        }
    }

    found.sort();
    Ok(found)
}

/// Collect every compilable stylesheet below `source_dir` with its output path.
pub fn collect_sources(
    fs: &dyn FileSystem,
    source_dir: &Path,
    matcher: &SourceMatcher,
) -> Result<Vec<SourceOutputPair>> {
    let mut pairs = Vec::new();
    let mut pending = vec![source_dir.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in fs.read_dir(&dir)? {
            if fs.is_dir(&entry) {
                pending.push(entry);
                continue;
            }

            let Ok(rel) = entry.strip_prefix(source_dir) else {
                continue;
            };
            let rel_str = rel.to_string_lossy().replace('\\', "/");

            if !matcher.matches(&rel_str) {
                if matcher.is_stylesheet(&rel_str) {
                    debug!(path = %rel_str, "skipping partial");
                }
                continue;
            }

            if let Some(output) = css_output_path(source_dir, &entry) {
                pairs.push(SourceOutputPair {
                    source: entry,
                    output,
                });
            }
        }
    }

    pairs.sort();
    Ok(pairs)
}
