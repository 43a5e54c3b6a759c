// tests/config_loading.rs

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use sitebuild::config::{load_and_validate, load_or_default, DEFAULT_AUTHOR};
use sitebuild::errors::SiteError;
use sitebuild::types::Environment;

type TestResult = Result<(), Box<dyn Error>>;

fn demo_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/sitebuild.toml")
}

#[test]
fn demo_config_is_valid() -> TestResult {
    let cfg = load_and_validate(demo_config())?;

    assert_eq!(cfg.assets.compiler, "sass");
    assert_eq!(cfg.assets.compiler_args, ["--no-source-map", "--style=compressed"]);
    assert_eq!(cfg.author.name, "Jan Christlieb");

    let staging = cfg.target(Environment::Staging);
    assert_eq!(staging.hosts, ["escaperoom-dillingen"]);
    assert_eq!(staging.effective_release_paths(&cfg.release), ["vendor", "nova"]);

    let production = cfg.target(Environment::Production);
    assert_eq!(production.effective_release_paths(&cfg.release), ["vendor"]);
    assert!(!production.remote_path.is_empty());
    Ok(())
}

#[test]
fn missing_file_falls_back_to_builtin_targets() -> TestResult {
    let dir = tempfile::tempdir()?;
    let cfg = load_or_default(dir.path().join("sitebuild.toml"))?;

    assert_eq!(cfg.author.to_string(), DEFAULT_AUTHOR);
    assert_eq!(cfg.release.paths, ["vendor"]);
    assert_eq!(cfg.target(Environment::Production).remote_path, "");
    assert_eq!(
        cfg.target(Environment::Staging).remote_path,
        "/home/www/p485630/html/jc"
    );
    Ok(())
}

#[test]
fn explicit_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_and_validate(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, SiteError::IoError(_)));
}

#[test]
fn partial_file_keeps_other_defaults() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("sitebuild.toml");
    fs::write(
        &path,
        r#"
[target.staging]
remote_path = "/srv/stage"
release_branch = "stage"
hosts = ["stage-1", "stage-2"]
"#,
    )?;

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.target(Environment::Staging).hosts, ["stage-1", "stage-2"]);
    assert_eq!(cfg.target(Environment::Production).release_branch, "production");
    assert_eq!(cfg.assets.source_dirs, ["scss", "sass"]);
    Ok(())
}

#[test]
fn unknown_target_is_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("sitebuild.toml");
    fs::write(
        &path,
        r#"
[target.preview]
remote_path = "/srv/preview"
release_branch = "preview"
hosts = ["preview"]
"#,
    )?;

    match load_and_validate(&path) {
        Err(SiteError::ConfigError(msg)) => assert!(msg.contains("preview")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
    Ok(())
}

#[test]
fn malformed_toml_is_reported() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("sitebuild.toml");
    fs::write(&path, "[release\npaths = vendor")?;

    assert!(matches!(load_and_validate(&path), Err(SiteError::TomlError(_))));
    Ok(())
}
