// src/assets/compiler.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::assets::discover::{collect_sources, find_source_dirs, SourceMatcher, SourceOutputPair};
use crate::config::AssetsSection;
use crate::errors::Result;
use crate::exec::{run_checked, CommandRunner, CommandSpec};
use crate::fs::FileSystem;

/// What a `compile_all` run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileReport {
    pub source_dirs: Vec<PathBuf>,
    pub compiled: Vec<SourceOutputPair>,
}

/// Compiles every stylesheet below the web directory with an external
/// compiler (`sass` by default).
pub struct AssetCompiler<R: CommandRunner> {
    web_dir: PathBuf,
    settings: AssetsSection,
    matcher: SourceMatcher,
    fs: Arc<dyn FileSystem>,
    runner: R,
}

impl<R: CommandRunner> std::fmt::Debug for AssetCompiler<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCompiler")
            .field("web_dir", &self.web_dir)
            .field("compiler", &self.settings.compiler)
            .finish_non_exhaustive()
    }
}

impl<R: CommandRunner> AssetCompiler<R> {
    pub fn new(
        web_dir: impl Into<PathBuf>,
        settings: AssetsSection,
        fs: Arc<dyn FileSystem>,
        runner: R,
    ) -> Result<Self> {
        Ok(Self {
            web_dir: web_dir.into(),
            settings,
            matcher: SourceMatcher::new()?,
            fs,
            runner,
        })
    }

    pub fn web_dir(&self) -> &Path {
        &self.web_dir
    }

    pub fn matcher(&self) -> &SourceMatcher {
        &self.matcher
    }

    /// Directories named like a source dir (`scss`, `sass`) below the web dir.
    pub fn source_dirs(&self) -> Result<Vec<PathBuf>> {
        Ok(find_source_dirs(
            self.fs.as_ref(),
            &self.web_dir,
            &self.settings.source_dirs,
        )?)
    }

    /// Every compilable stylesheet with its output path, recomputed per call.
    pub fn plan(&self) -> Result<(Vec<PathBuf>, Vec<SourceOutputPair>)> {
        let dirs = self.source_dirs()?;
        let mut pairs = Vec::new();
        for dir in &dirs {
            pairs.extend(collect_sources(self.fs.as_ref(), dir, &self.matcher)?);
        }
        Ok((dirs, pairs))
    }

    /// Compile every non-partial stylesheet.
    ///
    /// Output directories are created as needed. The first compiler failure
    /// aborts the run and is returned to the caller.
    pub async fn compile_all(&self) -> Result<CompileReport> {
        let (source_dirs, pairs) = self.plan()?;

        if pairs.is_empty() {
            info!(web_dir = ?self.web_dir, "no stylesheets to compile");
        }

        let mut report = CompileReport {
            source_dirs,
            compiled: Vec::with_capacity(pairs.len()),
        };

        for pair in pairs {
            self.compile_one(&pair).await?;
            report.compiled.push(pair);
        }

        info!(count = report.compiled.len(), "stylesheets compiled");
        Ok(report)
    }

    async fn compile_one(&self, pair: &SourceOutputPair) -> Result<()> {
        if let Some(parent) = pair.output.parent() {
            if !self.fs.is_dir(parent) {
                debug!(dir = ?parent, "creating output directory");
                self.fs.create_dir_all(parent)?;
            }
        }

        let spec = self.compiler_command(pair);
        debug!(source = ?pair.source, output = ?pair.output, "compiling stylesheet");
        run_checked(&self.runner, &spec).await?;
        Ok(())
    }

    fn compiler_command(&self, pair: &SourceOutputPair) -> CommandSpec {
        CommandSpec::new(&self.settings.compiler)
            .args(self.settings.compiler_args.iter().cloned())
            .arg(pair.source.to_string_lossy())
            .arg(pair.output.to_string_lossy())
    }
}
