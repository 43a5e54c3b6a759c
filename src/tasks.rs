// src/tasks.rs

//! Ordered task lists, as given on the command line (`sitebuild staging deploy`).

use std::fmt;

use clap::ValueEnum;

use crate::errors::{Result, SiteError};
use crate::types::Environment;

/// One named task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Task {
    /// Compile all stylesheets once.
    Css,
    /// Compile, then recompile on every stylesheet change.
    Watch,
    /// Select the production target.
    Production,
    /// Select the staging target.
    Staging,
    /// Build a release commit and push it to the selected hosts.
    #[value(name = "deploy_push_files")]
    DeployPushFiles,
    /// Switch the selected hosts to the pushed release.
    #[value(name = "deploy_apply_files")]
    DeployApplyFiles,
    /// Push, then apply.
    #[value(name = "deploy_files")]
    DeployFiles,
    /// Push, then apply.
    Deploy,
}

impl Task {
    pub fn as_str(self) -> &'static str {
        match self {
            Task::Css => "css",
            Task::Watch => "watch",
            Task::Production => "production",
            Task::Staging => "staging",
            Task::DeployPushFiles => "deploy_push_files",
            Task::DeployApplyFiles => "deploy_apply_files",
            Task::DeployFiles => "deploy_files",
            Task::Deploy => "deploy",
        }
    }

    /// The environment a selection task chooses.
    pub fn selects(self) -> Option<Environment> {
        match self {
            Task::Production => Some(Environment::Production),
            Task::Staging => Some(Environment::Staging),
            _ => None,
        }
    }

    pub fn needs_target(self) -> bool {
        matches!(
            self,
            Task::DeployPushFiles | Task::DeployApplyFiles | Task::DeployFiles | Task::Deploy
        )
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, ordered task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPlan {
    tasks: Vec<Task>,
}

impl TaskPlan {
    /// Check the task list before anything runs.
    ///
    /// Every deploy task must come after a selection task, and a plan that
    /// only selects targets does nothing and is rejected.
    pub fn new(tasks: Vec<Task>) -> Result<Self> {
        if tasks.is_empty() {
            return Err(SiteError::InvalidTaskPlan("no tasks given".to_string()));
        }
        if tasks.iter().all(|t| t.selects().is_some()) {
            return Err(SiteError::InvalidTaskPlan(format!(
                "'{}' only selects a target and must be combined with another task",
                tasks[0]
            )));
        }

        let mut selected = false;
        for task in &tasks {
            if task.selects().is_some() {
                selected = true;
            } else if task.needs_target() && !selected {
                return Err(SiteError::NoTargetSelected);
            }
        }

        Ok(Self { tasks })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn has_deploy(&self) -> bool {
        self.tasks.iter().any(|t| t.needs_target())
    }
}
