// src/watch/rebuild.rs

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::assets::AssetCompiler;
use crate::exec::CommandRunner;
use crate::watch::event::WatchEvent;

/// Events flowing into the rebuild loop from the watcher and Ctrl-C handler.
#[derive(Debug, Clone)]
pub enum WatchLoopEvent {
    /// A relevant stylesheet changed.
    FileChanged(WatchEvent),
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

/// Counters reported when the loop exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildStats {
    /// `compile_all` runs, including the initial one.
    pub rebuilds: usize,
    /// Runs that returned an error.
    pub failures: usize,
}

/// Single consumer of [`WatchLoopEvent`]s.
///
/// Every change triggers one full `compile_all`; there is no batching or
/// debouncing. Rebuilds run one at a time because the loop awaits each one
/// before reading the next event.
pub struct RebuildLoop<'a, R: CommandRunner> {
    compiler: &'a AssetCompiler<R>,
    events_rx: mpsc::Receiver<WatchLoopEvent>,
    stats: RebuildStats,
}

impl<'a, R: CommandRunner> RebuildLoop<'a, R> {
    pub fn new(compiler: &'a AssetCompiler<R>, events_rx: mpsc::Receiver<WatchLoopEvent>) -> Self {
        Self {
            compiler,
            events_rx,
            stats: RebuildStats::default(),
        }
    }

    /// Compile once, then rebuild on every change until shutdown or until all
    /// event senders are gone.
    pub async fn run(mut self) -> RebuildStats {
        info!("initial stylesheet build");
        self.rebuild().await;

        while let Some(event) = self.events_rx.recv().await {
            match event {
                WatchLoopEvent::FileChanged(change) => {
                    info!(path = ?change.path, kind = ?change.kind, "stylesheet changed; rebuilding");
                    self.rebuild().await;
                }
                WatchLoopEvent::ShutdownRequested => {
                    info!("shutdown requested, stopping watch loop");
                    break;
                }
            }
        }

        debug!(
            rebuilds = self.stats.rebuilds,
            failures = self.stats.failures,
            "watch loop finished"
        );
        self.stats
    }

    /// Errors are logged, never propagated: the loop must survive a broken
    /// stylesheet.
    async fn rebuild(&mut self) {
        self.stats.rebuilds += 1;
        if let Err(err) = self.compiler.compile_all().await {
            self.stats.failures += 1;
            warn!(error = %err, "stylesheet build failed; still watching");
        }
    }
}
