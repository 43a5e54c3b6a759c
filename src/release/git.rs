// src/release/git.rs

//! Thin wrapper over the `git` CLI for the handful of plumbing commands a
//! release needs.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::ReleaseAuthor;
use crate::errors::{Result, SiteError};
use crate::exec::{run_checked, CommandOutput, CommandRunner, CommandSpec};
use crate::release::target::SshOptions;

/// A local git working tree, operated through a [`CommandRunner`].
pub struct GitRepo<'a, R: CommandRunner> {
    runner: &'a R,
    root: PathBuf,
    ssh: SshOptions,
}

impl<'a, R: CommandRunner> GitRepo<'a, R> {
    pub fn new(runner: &'a R, root: impl Into<PathBuf>, ssh: SshOptions) -> Self {
        Self {
            runner,
            root: root.into(),
            ssh,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn git(&self) -> CommandSpec {
        let spec = CommandSpec::new("git").current_dir(&self.root);
        match self.ssh.git_ssh_command() {
            Some(cmd) => spec.env("GIT_SSH_COMMAND", cmd),
            None => spec,
        }
    }

    async fn run(&self, spec: CommandSpec) -> Result<CommandOutput> {
        run_checked(self.runner, &spec).await
    }

    /// Resolve `rev` to a commit id, or `None` if it does not exist.
    pub async fn resolve_commit(&self, rev: &str) -> Result<Option<String>> {
        let spec = self
            .git()
            .args(["rev-parse", "--verify", "--quiet"])
            .arg(format!("{rev}^{{commit}}"));
        let out = self.runner.run(&spec).await?;

        match out.code {
            Some(0) => Ok(Some(out.stdout_trimmed().to_string())),
            Some(1) => Ok(None),
            _ => Err(out.into_error(&spec)),
        }
    }

    pub async fn absolute_git_dir(&self) -> Result<PathBuf> {
        let out = self
            .run(self.git().args(["rev-parse", "--absolute-git-dir"]))
            .await?;
        Ok(PathBuf::from(out.stdout_trimmed()))
    }

    /// Whether `remote` has `branch`. `--exit-code` makes git exit with 2 when
    /// no ref matched.
    pub async fn remote_has_branch(&self, remote: &str, branch: &str) -> Result<bool> {
        let spec = self
            .git()
            .args(["ls-remote", "--exit-code", "--heads", remote])
            .arg(format!("refs/heads/{branch}"));
        let out = self.runner.run(&spec).await?;

        match out.code {
            Some(0) => Ok(true),
            Some(2) => Ok(false),
            _ => Err(out.into_error(&spec)),
        }
    }

    /// Reset the local `branch` to the one on `remote`.
    ///
    /// The remote wins: a local release commit that never got pushed is
    /// dropped rather than blocking every later fetch.
    pub async fn fetch_branch(&self, remote: &str, branch: &str) -> Result<()> {
        let refspec = format!("+refs/heads/{branch}:refs/heads/{branch}");
        self.run(self.git().args(["fetch", remote]).arg(refspec))
            .await?;
        Ok(())
    }

    /// Stage exactly `paths` into a fresh index at `index_file` and write it
    /// out as a tree. The regular index and the working tree are untouched.
    pub async fn write_tree_from_paths(&self, paths: &[String], index_file: &Path) -> Result<String> {
        let index = index_file.to_string_lossy().into_owned();

        self.run(
            self.git()
                .env("GIT_INDEX_FILE", &index)
                .args(["read-tree", "--empty"]),
        )
        .await?;

        // `--force` because release paths such as `vendor` are usually ignored.
        self.run(
            self.git()
                .env("GIT_INDEX_FILE", &index)
                .args(["add", "--force", "--"])
                .args(paths.iter().cloned()),
        )
        .await?;

        let out = self
            .run(self.git().env("GIT_INDEX_FILE", &index).arg("write-tree"))
            .await?;
        let tree = out.stdout_trimmed().to_string();
        if tree.is_empty() {
            return Err(SiteError::Other(anyhow::anyhow!(
                "git write-tree printed no tree id"
            )));
        }
        debug!(%tree, "release tree written");
        Ok(tree)
    }

    pub async fn commit_tree(
        &self,
        tree: &str,
        parent: Option<&str>,
        message: &str,
        author: &ReleaseAuthor,
    ) -> Result<String> {
        let mut spec = self
            .git()
            .env("GIT_AUTHOR_NAME", &author.name)
            .env("GIT_AUTHOR_EMAIL", &author.email)
            .env("GIT_COMMITTER_NAME", &author.name)
            .env("GIT_COMMITTER_EMAIL", &author.email)
            .args(["commit-tree", tree]);
        if let Some(parent) = parent {
            spec = spec.args(["-p", parent]);
        }
        spec = spec.args(["-m", message]);

        let out = self.run(spec).await?;
        Ok(out.stdout_trimmed().to_string())
    }

    /// Point `refs/heads/<branch>` at `new`, but only if it still points at
    /// `old` (or does not exist, when `old` is `None`).
    pub async fn update_branch(&self, branch: &str, new: &str, old: Option<&str>) -> Result<()> {
        self.run(
            self.git()
                .arg("update-ref")
                .arg(format!("refs/heads/{branch}"))
                .arg(new)
                .arg(old.unwrap_or("")),
        )
        .await?;
        Ok(())
    }

    pub async fn push_branch(&self, remote: &str, branch: &str) -> Result<()> {
        let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
        self.run(self.git().args(["push", remote]).arg(refspec))
            .await?;
        Ok(())
    }

    /// Names of the top-level entries of `commit`'s tree.
    pub async fn top_level_entries(&self, commit: &str) -> Result<Vec<String>> {
        let out = self
            .run(self.git().args(["ls-tree", "--name-only", commit]))
            .await?;
        Ok(out
            .stdout
            .lines()
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }
}
