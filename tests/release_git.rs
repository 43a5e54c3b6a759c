// tests/release_git.rs
//
// Release commits against a real git repository. Skipped when `git` is not
// installed.

use std::error::Error;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use sitebuild::exec::RealCommandRunner;
use sitebuild::fs::{FileSystem, RealFileSystem};
use sitebuild::release::{DeployContext, DeploymentTarget, GitRepo, ReleaseFilter, ReleaseManager, SshOptions};
use sitebuild::types::Environment;
use sitebuild_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(repo: &Path, args: &[&str]) -> String {
    let out = Command::new("git")
        .args(["-c", "user.name=Dev", "-c", "user.email=dev@example.com"])
        .args(args)
        .current_dir(repo)
        .output()
        .expect("git runs");
    assert!(
        out.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}

/// A site checkout whose `vendor/` is ignored, like a composer install.
fn init_site(repo: &Path) {
    fs::create_dir_all(repo.join("build")).unwrap();
    fs::create_dir_all(repo.join("web")).unwrap();
    fs::create_dir_all(repo.join("vendor/acme")).unwrap();
    fs::write(repo.join("web/index.php"), "<?php require '../vendor/autoload.php';").unwrap();
    fs::write(repo.join("vendor/autoload.php"), "<?php").unwrap();
    fs::write(repo.join("vendor/acme/lib.php"), "<?php").unwrap();
    fs::write(repo.join(".gitignore"), "vendor/\n").unwrap();

    git(repo, &["init", "--quiet"]);
    git(repo, &["add", "."]);
    git(repo, &["commit", "--quiet", "-m", "site"]);
}

fn context(repo: &Path) -> DeployContext {
    DeployContext {
        target: DeploymentTarget {
            environment: Environment::Staging,
            remote_path: "/srv/unused".to_string(),
            release_branch: "staging".to_string(),
            hosts: Vec::new(),
        },
        filter: ReleaseFilter::new(["vendor"]),
        author: "Release Bot <release@example.com>".parse().unwrap(),
        repo_root: repo.to_path_buf(),
        ssh: SshOptions { use_ssh_config: true },
    }
}

#[tokio::test]
async fn release_commit_contains_only_allowed_paths() -> TestResult {
    init_tracing();
    if !git_available() {
        eprintln!("git not installed; skipping");
        return Ok(());
    }

    let dir = tempfile::tempdir()?;
    let repo = dir.path();
    init_site(repo);
    let status_before = git(repo, &["status", "--porcelain"]);

    let ctx = context(repo);
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let runner = RealCommandRunner;
    let manager = ReleaseManager::new(&ctx, &runner, fs);

    let first = manager.create_release_commit().await?;
    assert_eq!(first.parent, None);

    let repo_git = GitRepo::new(&runner, repo, ctx.ssh);
    assert_eq!(repo_git.top_level_entries(&first.commit).await?, vec!["vendor"]);
    assert_eq!(git(repo, &["rev-parse", "refs/heads/staging"]), first.commit);
    assert_eq!(git(repo, &["rev-list", "--count", "refs/heads/staging"]), "1");
    assert_eq!(git(repo, &["log", "-1", "--format=%an <%ae>", "staging"]), "Release Bot <release@example.com>");

    // The working tree, the regular index and the temporary index are untouched.
    assert_eq!(git(repo, &["status", "--porcelain"]), status_before);
    let git_dir = git(repo, &["rev-parse", "--absolute-git-dir"]);
    assert!(!Path::new(&git_dir).join("sitebuild-release.index").exists());

    let second = manager.create_release_commit().await?;
    assert_eq!(second.parent.as_deref(), Some(first.commit.as_str()));
    assert_eq!(git(repo, &["rev-list", "--count", "refs/heads/staging"]), "2");
    Ok(())
}

#[tokio::test]
async fn missing_release_path_creates_no_commit() -> TestResult {
    init_tracing();
    if !git_available() {
        eprintln!("git not installed; skipping");
        return Ok(());
    }

    let dir = tempfile::tempdir()?;
    let repo = dir.path();
    init_site(repo);
    fs::remove_dir_all(repo.join("vendor"))?;

    let ctx = context(repo);
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let runner = RealCommandRunner;

    assert!(ReleaseManager::new(&ctx, &runner, fs)
        .create_release_commit()
        .await
        .is_err());

    let runner_git = GitRepo::new(&runner, repo, ctx.ssh);
    assert_eq!(runner_git.resolve_commit("refs/heads/staging").await?, None);
    Ok(())
}

#[tokio::test]
async fn fetch_resets_unpushed_local_release_to_remote() -> TestResult {
    init_tracing();
    if !git_available() {
        eprintln!("git not installed; skipping");
        return Ok(());
    }

    let dir = tempfile::tempdir()?;
    let repo = dir.path().join("site");
    let remote = dir.path().join("remote.git");
    fs::create_dir_all(&repo)?;
    init_site(&repo);
    git(dir.path(), &["init", "--quiet", "--bare", "remote.git"]);
    let remote_url = remote.to_string_lossy().into_owned();

    let ctx = context(&repo);
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let runner = RealCommandRunner;
    let manager = ReleaseManager::new(&ctx, &runner, fs);
    let repo_git = GitRepo::new(&runner, &repo, ctx.ssh);

    // First release reaches the remote, the second one never does.
    let pushed = manager.create_release_commit().await?;
    repo_git.push_branch(&remote_url, "staging").await?;
    let unpushed = manager.create_release_commit().await?;
    assert_eq!(unpushed.parent.as_deref(), Some(pushed.commit.as_str()));

    repo_git.fetch_branch(&remote_url, "staging").await?;

    assert_eq!(
        repo_git.resolve_commit("refs/heads/staging").await?,
        Some(pushed.commit.clone())
    );

    // The next release builds on what the remote has.
    let next = manager.create_release_commit().await?;
    assert_eq!(next.parent.as_deref(), Some(pushed.commit.as_str()));
    repo_git.push_branch(&remote_url, "staging").await?;
    Ok(())
}
