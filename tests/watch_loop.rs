// tests/watch_loop.rs

use std::error::Error;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use sitebuild::assets::{AssetCompiler, SourceMatcher};
use sitebuild::config::AssetsSection;
use sitebuild::exec::CommandOutput;
use sitebuild::fs::FileSystem;
use sitebuild::watch::{RebuildLoop, RebuildStats, WatchEvent, WatchEventKind, WatchLoopEvent};
use sitebuild_test_utils::builders::SiteTreeBuilder;
use sitebuild_test_utils::fake_runner::RecordingRunner;
use sitebuild_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn changed(path: &str) -> WatchLoopEvent {
    WatchLoopEvent::FileChanged(WatchEvent::new(path, WatchEventKind::Modify))
}

fn site_fs() -> Arc<dyn FileSystem> {
    let fs = SiteTreeBuilder::new("/site")
        .file("web/scss/main.scss", "body {}")
        .file("web/scss/_mixins.scss", "")
        .build();
    Arc::new(fs)
}

#[tokio::test]
async fn rebuilds_once_per_change_after_initial_build() -> TestResult {
    init_tracing();

    let runner = RecordingRunner::new();
    let compiler = AssetCompiler::new("/site/web", AssetsSection::default(), site_fs(), runner.clone())?;

    let (tx, rx) = mpsc::channel(8);
    tx.send(changed("/site/web/scss/main.scss")).await?;
    tx.send(changed("/site/web/scss/_mixins.scss")).await?;
    tx.send(WatchLoopEvent::ShutdownRequested).await?;

    let stats = with_timeout(RebuildLoop::new(&compiler, rx).run()).await;

    assert_eq!(stats, RebuildStats { rebuilds: 3, failures: 0 });
    // One stylesheet, so one compiler call per run.
    assert_eq!(runner.calls().len(), 3);
    Ok(())
}

#[tokio::test]
async fn failed_rebuild_keeps_watching() -> TestResult {
    init_tracing();

    // Fail only the second run.
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    let runner = RecordingRunner::with_responder(move |_| {
        if seen.fetch_add(1, Ordering::SeqCst) == 1 {
            CommandOutput::failure(65, "Error: Undefined variable.")
        } else {
            CommandOutput::success("")
        }
    });
    let compiler = AssetCompiler::new("/site/web", AssetsSection::default(), site_fs(), runner.clone())?;

    let (tx, rx) = mpsc::channel(8);
    tx.send(changed("/site/web/scss/main.scss")).await?;
    tx.send(changed("/site/web/scss/main.scss")).await?;
    tx.send(WatchLoopEvent::ShutdownRequested).await?;

    let stats = with_timeout(RebuildLoop::new(&compiler, rx).run()).await;

    assert_eq!(stats, RebuildStats { rebuilds: 3, failures: 1 });
    assert_eq!(count.load(Ordering::SeqCst), 3);
    Ok(())
}

#[tokio::test]
async fn loop_ends_when_all_senders_are_dropped() -> TestResult {
    init_tracing();

    let runner = RecordingRunner::new();
    let compiler = AssetCompiler::new("/site/web", AssetsSection::default(), site_fs(), runner)?;

    let (tx, rx) = mpsc::channel::<WatchLoopEvent>(8);
    drop(tx);

    let stats = with_timeout(RebuildLoop::new(&compiler, rx).run()).await;
    assert_eq!(stats.rebuilds, 1);
    Ok(())
}

#[test]
fn only_stylesheet_changes_are_relevant() -> TestResult {
    let fs = SiteTreeBuilder::new("/site")
        .file("web/scss/main.scss", "")
        .file("web/scss/notes.txt", "")
        .dir("web/scss/components.scss")
        .build();
    let matcher = SourceMatcher::new()?;

    let relevant = |path: &str, kind| WatchEvent::new(path, kind).is_relevant(&fs, &matcher);

    assert!(relevant("/site/web/scss/main.scss", WatchEventKind::Modify));
    assert!(relevant("/site/web/scss/_partial.scss", WatchEventKind::Create));
    assert!(relevant("/site/web/scss/old.sass", WatchEventKind::Remove));
    assert!(!relevant("/site/web/scss/notes.txt", WatchEventKind::Modify));
    assert!(!relevant("/site/web/scss/main.scss", WatchEventKind::Other));
    assert!(!relevant("/site/web/scss/components.scss", WatchEventKind::Create));
    assert!(fs.is_file(Path::new("/site/web/scss/main.scss")));
    Ok(())
}
