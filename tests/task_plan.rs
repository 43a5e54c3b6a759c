// tests/task_plan.rs

use std::error::Error;

use sitebuild::errors::SiteError;
use sitebuild::execute_plan;
use sitebuild::tasks::{Task, TaskPlan};
use sitebuild_test_utils::builders::{target, ConfigFileBuilder, SiteTreeBuilder};
use sitebuild_test_utils::fake_runner::FakeGit;
use sitebuild_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn site() -> SiteTreeBuilder {
    SiteTreeBuilder::new("/site")
        .with_vendor()
        .file("web/scss/main.scss", "body {}")
}

#[tokio::test]
async fn css_then_staging_deploy_runs_in_order() -> TestResult {
    init_tracing();

    let site = site();
    let paths = site.paths();
    let (_fs, shared) = site.build_shared();
    let cfg = ConfigFileBuilder::new()
        .target("staging", target("/srv/jc", "staging", &["web1"]))
        .build();
    let runner = FakeGit::default().runner();

    let plan = TaskPlan::new(vec![Task::Css, Task::Staging, Task::Deploy])?;
    execute_plan(&plan, &cfg, &paths, &runner, shared).await?;

    let steps = runner.steps();
    assert_eq!(steps.first().map(String::as_str), Some("sass"));
    assert_eq!(steps.last().map(String::as_str), Some("ssh"));
    assert!(steps.iter().any(|s| s == "push"));
    Ok(())
}

#[tokio::test]
async fn later_selection_replaces_the_target() -> TestResult {
    init_tracing();

    let site = site();
    let paths = site.paths();
    let (_fs, shared) = site.build_shared();
    let cfg = ConfigFileBuilder::new()
        .target("production", target("/srv/live", "production", &["live"]))
        .target("staging", target("/srv/jc", "staging", &["stage"]))
        .build();
    let runner = FakeGit::default().runner();

    let plan = TaskPlan::new(vec![Task::Staging, Task::Production, Task::DeployPushFiles])?;
    execute_plan(&plan, &cfg, &paths, &runner, shared).await?;

    let lines = runner.command_lines();
    assert!(lines.iter().any(|l| l.starts_with("git push live:/srv/live")));
    assert!(!lines.iter().any(|l| l.contains("stage:")));
    Ok(())
}

#[tokio::test]
async fn failing_task_stops_the_plan() -> TestResult {
    init_tracing();

    let site = SiteTreeBuilder::new("/site").file("web/scss/main.scss", "body {}");
    let paths = site.paths();
    let (_fs, shared) = site.build_shared();
    let cfg = ConfigFileBuilder::new()
        .target("staging", target("/srv/jc", "staging", &["web1"]))
        .build();
    let runner = FakeGit::default().runner();

    // No vendor/ in this site.
    let plan = TaskPlan::new(vec![Task::Staging, Task::DeployPushFiles, Task::Css])?;
    let err = execute_plan(&plan, &cfg, &paths, &runner, shared)
        .await
        .expect_err("release path is missing");

    assert!(matches!(err, SiteError::MissingReleasePath { .. }));
    assert!(runner.calls().is_empty(), "css must not run after a failed task");
    Ok(())
}
