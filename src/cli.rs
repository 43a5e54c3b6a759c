// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::tasks::Task;

/// Command-line arguments for `sitebuild`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sitebuild",
    version,
    about = "Compile the site's stylesheets and deploy releases over git/ssh.",
    long_about = None
)]
pub struct CliArgs {
    /// Build directory (holds `sitebuild.toml`; its parent is the project root).
    ///
    /// Default: `./build` if it exists, else the current directory.
    #[arg(long, value_name = "PATH")]
    pub build_dir: Option<PathBuf>,

    /// Path to the config file (TOML).
    ///
    /// Default: `sitebuild.toml` in the build directory. Built-in defaults
    /// are used when that file does not exist.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SITEBUILD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve paths, config and the task plan, print them, run nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Tasks to run, in order.
    #[arg(value_enum, value_name = "TASK", required = true)]
    pub tasks: Vec<Task>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
