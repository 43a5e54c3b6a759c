// src/exec/mod.rs

//! Process execution layer.
//!
//! Every external tool (`sass`, `git`, `ssh`) is started through here.
//!
//! - [`command`] describes an invocation (`CommandSpec`) and its captured
//!   result (`CommandOutput`).
//! - [`backend`] provides the `CommandRunner` trait and the
//!   `RealCommandRunner` used in production, which tests replace with a
//!   recording fake.

pub mod backend;
pub mod command;

pub use backend::{run_checked, CommandRunner, RealCommandRunner, RunFuture};
pub use command::{CommandOutput, CommandSpec};
