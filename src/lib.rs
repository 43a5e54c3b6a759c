// src/lib.rs

pub mod assets;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod paths;
pub mod release;
pub mod tasks;
pub mod types;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::assets::AssetCompiler;
use crate::cli::CliArgs;
use crate::config::{default_config_path, load_and_validate, load_or_default, ConfigFile};
use crate::errors::{Result, SiteError};
use crate::exec::{CommandRunner, RealCommandRunner};
use crate::fs::{FileSystem, RealFileSystem};
use crate::paths::{locate_build_dir, ProjectPaths};
use crate::release::{select_environment, DeployContext, ReleaseManager};
use crate::tasks::{Task, TaskPlan};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - build directory and config resolution
/// - task plan validation
/// - the real command runner and filesystem
pub async fn run(args: CliArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let build_dir = locate_build_dir(&cwd, args.build_dir.as_deref());

    // An explicit --config must exist; the default location may be absent.
    let (config_path, cfg) = match args.config {
        Some(path) => {
            let cfg = load_and_validate(&path)?;
            (path, cfg)
        }
        None => {
            let path = default_config_path(&build_dir);
            let cfg = load_or_default(&path)?;
            (path, cfg)
        }
    };

    let paths = ProjectPaths::resolve(build_dir, &cfg.assets.web_dir);
    let plan = TaskPlan::new(args.tasks)?;

    if args.dry_run {
        print_dry_run(&config_path, &paths, &cfg, &plan);
        return Ok(());
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    execute_plan(&plan, &cfg, &paths, &RealCommandRunner, fs).await
}

/// Run every task of `plan` in order, stopping at the first failure.
///
/// Selection tasks replace the active deploy context; later deploy tasks use
/// whichever context was selected last.
pub async fn execute_plan<R: CommandRunner>(
    plan: &TaskPlan,
    cfg: &ConfigFile,
    paths: &ProjectPaths,
    runner: &R,
    fs: Arc<dyn FileSystem>,
) -> Result<()> {
    let mut active: Option<DeployContext> = None;

    for &task in plan.tasks() {
        info!(%task, "running task");

        if let Some(env) = task.selects() {
            let ctx = select_environment(env, cfg, paths);
            debug!(
                environment = %env,
                branch = %ctx.target.release_branch,
                hosts = ?ctx.target.hosts,
                "target selected"
            );
            active = Some(ctx);
            continue;
        }

        match task {
            Task::Css => {
                let compiler = asset_compiler(cfg, paths, runner, fs.clone())?;
                let report = compiler.compile_all().await?;
                debug!(dirs = report.source_dirs.len(), "css task finished");
            }
            Task::Watch => {
                let compiler = asset_compiler(cfg, paths, runner, fs.clone())?;
                crate::watch::watch(&compiler, fs.clone()).await?;
            }
            _ => {
                let ctx = active.as_ref().ok_or(SiteError::NoTargetSelected)?;
                let manager = ReleaseManager::new(ctx, runner, fs.clone());
                match task {
                    Task::DeployPushFiles => {
                        manager.deploy_push_files().await?;
                    }
                    Task::DeployApplyFiles => {
                        manager.deploy_apply_files().await?;
                    }
                    Task::DeployFiles => {
                        manager.deploy_files().await?;
                    }
                    Task::Deploy => {
                        manager.deploy().await?;
                    }
                    Task::Css | Task::Watch | Task::Production | Task::Staging => {}
                }
            }
        }
    }

    Ok(())
}

fn asset_compiler<'r, R: CommandRunner>(
    cfg: &ConfigFile,
    paths: &ProjectPaths,
    runner: &'r R,
    fs: Arc<dyn FileSystem>,
) -> Result<AssetCompiler<&'r R>> {
    AssetCompiler::new(paths.web_dir.clone(), cfg.assets.clone(), fs, runner)
}

/// Dry-run output: resolved paths, configuration and the task plan.
fn print_dry_run(config_path: &Path, paths: &ProjectPaths, cfg: &ConfigFile, plan: &TaskPlan) {
    println!("sitebuild dry-run");
    println!("  config    = {}", config_path.display());
    println!("  build_dir = {}", paths.build_dir.display());
    println!("  web_dir   = {}", paths.web_dir.display());
    println!("  repo_root = {}", paths.repo_root.display());
    println!();

    println!("assets:");
    println!("  compiler: {} {:?}", cfg.assets.compiler, cfg.assets.compiler_args);
    println!("  source_dirs: {:?}", cfg.assets.source_dirs);
    println!();

    println!("release:");
    println!("  author: {}", cfg.author);
    println!("  paths: {:?}", cfg.release.paths);
    println!("  use_ssh_config: {}", cfg.release.use_ssh_config);
    for (env, target) in cfg.targets() {
        println!("  - {env}");
        println!("      branch: {}", target.release_branch);
        println!("      hosts: {:?}", target.hosts);
        if target.remote_path.is_empty() {
            println!("      remote_path: (not configured)");
        } else {
            println!("      remote_path: {}", target.remote_path);
        }
        if let Some(ref overrides) = target.release_paths {
            println!("      release_paths: {overrides:?}");
        }
    }
    println!();

    println!("tasks ({}):", plan.tasks().len());
    for task in plan.tasks() {
        println!("  - {task}");
    }

    debug!("dry-run complete (no execution)");
}
