// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::assets::SourceMatcher;
use crate::fs::FileSystem;
use crate::watch::event::WatchEvent;
use crate::watch::rebuild::WatchLoopEvent;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle stops file watching and joins the
/// watcher thread.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    dirs: Vec<PathBuf>,
}

impl WatcherHandle {
    pub fn watched_dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("dirs", &self.dirs)
            .finish_non_exhaustive()
    }
}

/// Spawn a filesystem watcher over each stylesheet source directory that sends
/// `WatchLoopEvent::FileChanged` for every relevant change.
///
/// - `dirs` are watched recursively.
/// - `matcher` decides which file names count as stylesheets.
/// - `loop_tx` is the channel into the rebuild loop.
pub fn spawn_watcher(
    dirs: Vec<PathBuf>,
    fs: Arc<dyn FileSystem>,
    matcher: SourceMatcher,
    loop_tx: mpsc::Sender<WatchLoopEvent>,
) -> Result<WatcherHandle> {
    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    // Closure called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // We can't log via tracing here easily, so fallback to stderr.
                    eprintln!("sitebuild: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("sitebuild: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    for dir in &dirs {
        watcher.watch(dir, RecursiveMode::Recursive)?;
        info!("watching {:?}", dir);
    }

    // Async task that turns notify events into rebuild requests.
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!(?event, "received notify event");

            for change in WatchEvent::from_notify(&event) {
                if !change.is_relevant(fs.as_ref(), &matcher) {
                    continue;
                }
                if let Err(err) = loop_tx.send(WatchLoopEvent::FileChanged(change)).await {
                    // The rebuild loop is gone; nothing left to notify.
                    warn!("failed to send WatchLoopEvent::FileChanged: {err}");
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle {
        _inner: watcher,
        dirs,
    })
}
