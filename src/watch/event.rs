// src/watch/event.rs

//! Filesystem change notifications, reduced to what the rebuild loop needs.

use std::path::PathBuf;

use notify::EventKind;

use crate::assets::SourceMatcher;
use crate::fs::FileSystem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEventKind {
    Create,
    Modify,
    Remove,
    /// Access and metadata-less notifications; never trigger a rebuild.
    Other,
}

impl From<&EventKind> for WatchEventKind {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => WatchEventKind::Create,
            // `Any` is what some backends emit when they cannot tell more.
            EventKind::Modify(_) | EventKind::Any => WatchEventKind::Modify,
            EventKind::Remove(_) => WatchEventKind::Remove,
            _ => WatchEventKind::Other,
        }
    }
}

/// A single changed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub path: PathBuf,
    pub kind: WatchEventKind,
}

impl WatchEvent {
    pub fn new(path: impl Into<PathBuf>, kind: WatchEventKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Split a `notify` event into one `WatchEvent` per path.
    pub fn from_notify(event: &notify::Event) -> Vec<WatchEvent> {
        let kind = WatchEventKind::from(&event.kind);
        event
            .paths
            .iter()
            .map(|path| WatchEvent::new(path.clone(), kind))
            .collect()
    }

    /// Whether this change should trigger a rebuild.
    ///
    /// Partials count: editing `_variables.scss` changes the compiled output
    /// of every file that includes it.
    pub fn is_relevant(&self, fs: &dyn FileSystem, matcher: &SourceMatcher) -> bool {
        if self.kind == WatchEventKind::Other {
            return false;
        }
        // Removed paths no longer exist, so this only filters live dirs.
        if fs.is_dir(&self.path) {
            return false;
        }
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| matcher.is_stylesheet(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use notify::event::{AccessKind, CreateKind, ModifyKind};

    #[test]
    fn notify_event_is_split_per_path() {
        let event = notify::Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("web/scss/a.scss"))
            .add_path(PathBuf::from("web/scss/b.scss"));

        let events = WatchEvent::from_notify(&event);
        assert_eq!(
            events,
            vec![
                WatchEvent::new("web/scss/a.scss", WatchEventKind::Modify),
                WatchEvent::new("web/scss/b.scss", WatchEventKind::Modify),
            ]
        );
    }

    #[test]
    fn only_stylesheet_file_changes_are_relevant() {
        let fs = MockFileSystem::new();
        fs.add_file("web/scss/_vars.scss", "");
        fs.add_dir("web/scss/new.scss");
        let matcher = SourceMatcher::new().unwrap();

        let relevant = |path: &str, kind| WatchEvent::new(path, kind).is_relevant(&fs, &matcher);

        assert!(relevant("web/scss/_vars.scss", WatchEventKind::Modify));
        assert!(relevant("web/scss/gone.scss", WatchEventKind::Remove));
        assert!(relevant("web/sass/print.sass", WatchEventKind::Create));

        assert!(!relevant("web/scss/notes.txt", WatchEventKind::Modify));
        assert!(!relevant("web/scss/new.scss", WatchEventKind::Create));
        assert!(!relevant("web/scss/_vars.scss", WatchEventKind::Other));
    }

    #[test]
    fn access_events_map_to_other() {
        assert_eq!(
            WatchEventKind::from(&EventKind::Access(AccessKind::Any)),
            WatchEventKind::Other
        );
        assert_eq!(
            WatchEventKind::from(&EventKind::Create(CreateKind::File)),
            WatchEventKind::Create
        );
    }
}
