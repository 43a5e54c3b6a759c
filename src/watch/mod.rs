// src/watch/mod.rs

//! File watching and rebuild-on-change.
//!
//! This module is responsible for:
//! - Wiring up a cross-platform filesystem watcher (`notify`) over every
//!   stylesheet source directory.
//! - Filtering raw notifications down to stylesheet changes.
//! - Running a single rebuild loop that recompiles everything per change.
//!
//! It does **not** know how stylesheets are compiled; that is
//! [`crate::assets`].

pub mod event;
pub mod rebuild;
pub mod watcher;

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::assets::AssetCompiler;
use crate::errors::Result;
use crate::exec::CommandRunner;
use crate::fs::FileSystem;

pub use event::{WatchEvent, WatchEventKind};
pub use rebuild::{RebuildLoop, RebuildStats, WatchLoopEvent};
pub use watcher::{spawn_watcher, WatcherHandle};

/// Compile once, then recompile on every stylesheet change until Ctrl-C.
///
/// The source directories are discovered once at startup; directories
/// created later are not picked up until the next run.
pub async fn watch<R: CommandRunner>(
    compiler: &AssetCompiler<R>,
    fs: Arc<dyn FileSystem>,
) -> Result<RebuildStats> {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };
    watch_until(compiler, fs, ctrl_c).await
}

/// Like [`watch`], but stops when `shutdown` completes.
///
/// The shutdown listener never outlives this call.
pub async fn watch_until<R, F>(
    compiler: &AssetCompiler<R>,
    fs: Arc<dyn FileSystem>,
    shutdown: F,
) -> Result<RebuildStats>
where
    R: CommandRunner,
    F: Future<Output = ()> + Send + 'static,
{
    let dirs = compiler.source_dirs()?;
    if dirs.is_empty() {
        info!(web_dir = ?compiler.web_dir(), "no stylesheet directories to watch");
    }

    let (loop_tx, loop_rx) = mpsc::channel::<WatchLoopEvent>(64);

    let shutdown_tx = loop_tx.clone();
    let listener = tokio::spawn(async move {
        shutdown.await;
        let _ = shutdown_tx.send(WatchLoopEvent::ShutdownRequested).await;
    });

    let handle = match spawn_watcher(dirs, fs, compiler.matcher().clone(), loop_tx) {
        Ok(handle) => handle,
        Err(err) => {
            listener.abort();
            return Err(err.into());
        }
    };
    debug!(dirs = ?handle.watched_dirs(), "watcher running");

    let stats = RebuildLoop::new(compiler, loop_rx).run().await;

    listener.abort();
    drop(handle);
    info!(rebuilds = stats.rebuilds, failures = stats.failures, "watch stopped");
    Ok(stats)
}
