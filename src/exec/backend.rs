// src/exec/backend.rs

//! Pluggable process runner abstraction.
//!
//! The asset compiler and the release manager talk to a [`CommandRunner`]
//! instead of spawning processes themselves. This makes it easy to swap in a
//! recording fake in tests while keeping the production implementation here.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::Context;
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::Result;

use super::command::{CommandOutput, CommandSpec};

/// Boxed future returned by [`CommandRunner::run`].
pub type RunFuture<'a> = Pin<Box<dyn Future<Output = Result<CommandOutput>> + Send + 'a>>;

/// Trait abstracting how external commands are executed.
///
/// A non-zero exit is *not* an error at this level; callers decide via
/// [`run_checked`] or by inspecting [`CommandOutput::code`]. Errors are
/// reserved for failing to run the process at all.
pub trait CommandRunner: Send + Sync {
    fn run<'a>(&'a self, spec: &'a CommandSpec) -> RunFuture<'a>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run<'a>(&'a self, spec: &'a CommandSpec) -> RunFuture<'a> {
        (**self).run(spec)
    }
}

/// Run a command and fail with `SiteError::CommandFailed` on non-zero exit.
pub async fn run_checked<R>(runner: &R, spec: &CommandSpec) -> Result<CommandOutput>
where
    R: CommandRunner + ?Sized,
{
    runner.run(spec).await?.into_checked(spec)
}

/// Runner that spawns real OS processes via `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run<'a>(&'a self, spec: &'a CommandSpec) -> RunFuture<'a> {
        Box::pin(async move {
            info!(command = %spec, "running");

            let mut cmd = Command::new(&spec.program);
            cmd.args(&spec.args)
                .stdin(Stdio::inherit())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);

            if let Some(dir) = &spec.cwd {
                cmd.current_dir(dir);
            }
            for (key, value) in &spec.env {
                cmd.env(key, value);
            }

            let output = cmd
                .output()
                .await
                .with_context(|| format!("spawning process `{}`", spec.program))?;

            let result = CommandOutput {
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            };

            for line in result.stderr.lines() {
                debug!(program = %spec.program, "stderr: {}", line);
            }
            debug!(
                program = %spec.program,
                exit_code = ?result.code,
                success = result.is_success(),
                "process exited"
            );

            Ok(result)
        })
    }
}
