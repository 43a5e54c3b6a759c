// src/release/manager.rs

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::{Result, SiteError};
use crate::exec::{run_checked, CommandRunner, CommandSpec};
use crate::fs::FileSystem;
use crate::release::git::GitRepo;
use crate::release::target::{shell_quote, DeployContext};

/// Temporary index used to assemble release trees, inside the git dir.
const RELEASE_INDEX_FILE: &str = "sitebuild-release.index";

/// A release commit created on the local release branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseCommit {
    pub commit: String,
    pub tree: String,
    /// Previous head of the release branch, if it existed.
    pub parent: Option<String>,
    pub paths: Vec<String>,
}

/// Runs the release workflow for one selected [`DeployContext`].
///
/// ```text
/// deploy_push_files:  check context -> check paths -> pull -> commit -> push
/// deploy_apply_files: switch every host to the release branch head
/// deploy / deploy_files: push, then apply
/// ```
///
/// Steps run strictly in sequence. Nothing is retried and nothing is rolled
/// back: a failed apply leaves the pushed commit in place.
pub struct ReleaseManager<'a, R: CommandRunner> {
    ctx: &'a DeployContext,
    runner: &'a R,
    fs: Arc<dyn FileSystem>,
}

impl<'a, R: CommandRunner> ReleaseManager<'a, R> {
    pub fn new(ctx: &'a DeployContext, runner: &'a R, fs: Arc<dyn FileSystem>) -> Self {
        Self { ctx, runner, fs }
    }

    fn git(&self) -> GitRepo<'a, R> {
        GitRepo::new(self.runner, &self.ctx.repo_root, self.ctx.ssh)
    }

    /// Bring the local release branch up to date with the first host.
    ///
    /// A host without the branch yet (first deploy) is not an error.
    pub async fn pull(&self) -> Result<()> {
        let Some(host) = self.ctx.target.hosts.first() else {
            return Ok(());
        };
        let remote = self.ctx.remote_url(host);
        let branch = &self.ctx.target.release_branch;
        let git = self.git();

        if git.remote_has_branch(&remote, branch).await? {
            info!(%remote, %branch, "fetching release branch");
            git.fetch_branch(&remote, branch).await?;
        } else {
            info!(%remote, %branch, "remote has no release branch yet");
        }
        Ok(())
    }

    /// Create a commit on the release branch containing only the allow-listed
    /// paths.
    pub async fn create_release_commit(&self) -> Result<ReleaseCommit> {
        let paths = self.ctx.filter.select(self.fs.as_ref(), &self.ctx.repo_root)?;
        self.commit_paths(paths).await
    }

    async fn commit_paths(&self, paths: Vec<String>) -> Result<ReleaseCommit> {
        let git = self.git();
        let branch = &self.ctx.target.release_branch;

        let index_file = git.absolute_git_dir().await?.join(RELEASE_INDEX_FILE);
        let tree = git.write_tree_from_paths(&paths, &index_file).await;
        if self.fs.exists(&index_file) {
            if let Err(err) = self.fs.remove_file(&index_file) {
                warn!(error = %err, path = ?index_file, "could not remove temporary index");
            }
        }
        let tree = tree?;

        let parent = git.resolve_commit(&self.ctx.branch_ref()).await?;
        let source = git.resolve_commit("HEAD").await?;
        let message = release_message(self.ctx, source.as_deref(), &paths);

        let commit = git
            .commit_tree(&tree, parent.as_deref(), &message, &self.ctx.author)
            .await?;
        git.update_branch(branch, &commit, parent.as_deref()).await?;

        info!(%commit, %tree, %branch, ?paths, "release commit created");
        Ok(ReleaseCommit {
            commit,
            tree,
            parent,
            paths,
        })
    }

    /// Push the release branch to every host, in order.
    pub async fn push(&self) -> Result<()> {
        let git = self.git();
        let branch = &self.ctx.target.release_branch;

        for host in &self.ctx.target.hosts {
            let remote = self.ctx.remote_url(host);
            info!(%remote, %branch, "pushing release branch");
            git.push_branch(&remote, branch).await?;
        }
        Ok(())
    }

    /// Point the served checkout on every host at the release branch head.
    ///
    /// Returns the commit the hosts now serve.
    pub async fn switch_release(&self) -> Result<String> {
        let branch_ref = self.ctx.branch_ref();
        let commit = self
            .git()
            .resolve_commit(&branch_ref)
            .await?
            .ok_or_else(|| {
                SiteError::ConfigError(format!(
                    "no release to apply: {branch_ref} does not exist; run deploy_push_files first"
                ))
            })?;

        for host in &self.ctx.target.hosts {
            info!(%host, %commit, "switching release");
            let spec = self.switch_command(host, &commit);
            run_checked(self.runner, &spec).await?;
        }
        Ok(commit)
    }

    fn switch_command(&self, host: &str, commit: &str) -> CommandSpec {
        let script = format!(
            "cd {} && git checkout --force --detach {}",
            shell_quote(&self.ctx.target.remote_path),
            shell_quote(commit)
        );
        CommandSpec::new("ssh")
            .args(self.ctx.ssh.ssh_args())
            .arg(host)
            .arg(script)
    }

    /// Build and push a release commit.
    pub async fn deploy_push_files(&self) -> Result<ReleaseCommit> {
        self.ctx.ensure_deployable()?;
        // Checked before any git or network command runs.
        let paths = self.ctx.filter.select(self.fs.as_ref(), &self.ctx.repo_root)?;

        self.pull().await?;
        let release = self.commit_paths(paths).await?;
        self.push().await?;
        Ok(release)
    }

    /// Switch the hosts to the pushed release.
    pub async fn deploy_apply_files(&self) -> Result<String> {
        self.ctx.ensure_deployable()?;
        self.switch_release().await
    }

    pub async fn deploy_files(&self) -> Result<ReleaseCommit> {
        let release = self.deploy_push_files().await?;
        self.deploy_apply_files().await?;
        Ok(release)
    }

    pub async fn deploy(&self) -> Result<ReleaseCommit> {
        let release = self.deploy_files().await?;
        info!(
            environment = %self.ctx.target.environment,
            commit = %release.commit,
            "deploy finished"
        );
        Ok(release)
    }
}

fn release_message(ctx: &DeployContext, source: Option<&str>, paths: &[String]) -> String {
    format!(
        "Release {} ({})\n\nSource: {}\nPaths: {}\n",
        ctx.target.environment,
        ctx.target.release_branch,
        source.unwrap_or("(no commit)"),
        paths.join(", ")
    )
}
