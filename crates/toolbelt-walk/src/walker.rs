//! Breadth-first directory walker running on a background thread.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use toolbelt_core::{EntryKind, MAX_EVENT_CAPACITY, ToolError, WalkConfig, WalkEntry};

use crate::event::{WalkEvent, WalkSummary};
use crate::handle::WalkHandle;
use crate::lister::{DirLister, FsLister};

/// Starts breadth-first walks of a directory tree.
pub struct Walker {
    config: WalkConfig,
    lister: Arc<dyn DirLister>,
    events_tx: broadcast::Sender<WalkEvent>,
}

impl Walker {
    /// Create a walker over the host filesystem.
    pub fn new(config: WalkConfig) -> Self {
        Self::with_lister(config, FsLister)
    }

    /// Create a walker that lists directories through `lister`.
    pub fn with_lister(config: WalkConfig, lister: impl DirLister + 'static) -> Self {
        let (events_tx, _) = broadcast::channel(config.event_capacity.clamp(1, MAX_EVENT_CAPACITY));
        Self {
            config,
            lister: Arc::new(lister),
            events_tx,
        }
    }

    /// Subscribe to events from walks started after this call.
    ///
    /// The channel holds `event_capacity` events. A receiver that falls
    /// further behind gets [`TryRecvError::Lagged`] once and then resumes
    /// with the oldest event still buffered, so drain loops should continue
    /// past `Lagged`. The final [`WalkEvent::Finished`] is never the one lost.
    ///
    /// [`TryRecvError::Lagged`]: crate::TryRecvError::Lagged
    pub fn subscribe(&self) -> broadcast::Receiver<WalkEvent> {
        self.events_tx.subscribe()
    }

    /// The configuration walks are started with.
    pub fn config(&self) -> &WalkConfig {
        &self.config
    }

    /// Start a walk from the configured root.
    ///
    /// The root is not validated; a missing or unreadable root yields an
    /// empty walk. Fails if the configured capacities are out of range or
    /// the worker thread cannot be spawned.
    pub fn start(&self) -> Result<WalkHandle, ToolError> {
        self.config.validate()?;
        let root = self.config.root.clone();
        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));
        let (done_tx, done_rx) = oneshot::channel();
        let cancel = CancellationToken::new();

        let worker = WalkWorker {
            root: root.clone(),
            lister: Arc::clone(&self.lister),
            tx,
            cancel: cancel.clone(),
            events_tx: self.events_tx.clone(),
            sort_entries: self.config.sort_entries,
        };

        let thread = thread::Builder::new()
            .name("toolbelt-walk".to_string())
            .spawn(move || worker.run(done_tx))
            .map_err(|e| ToolError::io(&root, e))?;

        tracing::debug!(root = %root.display(), "walk started");
        Ok(WalkHandle::new(rx, cancel, thread, done_rx))
    }
}

/// Start a walk of `root` with default settings.
pub fn start_walk(root: impl Into<PathBuf>) -> Result<WalkHandle, ToolError> {
    Walker::new(WalkConfig::new(root)).start()
}

/// State owned by the worker thread for the lifetime of one walk.
struct WalkWorker {
    root: PathBuf,
    lister: Arc<dyn DirLister>,
    tx: mpsc::Sender<WalkEntry>,
    cancel: CancellationToken,
    events_tx: broadcast::Sender<WalkEvent>,
    sort_entries: bool,
}

impl WalkWorker {
    fn run(self, done_tx: oneshot::Sender<WalkSummary>) -> WalkSummary {
        let summary = self.traverse();

        // Publish before the channel closes so a consumer that has drained
        // the walk always finds the event.
        let _ = self.events_tx.send(WalkEvent::Finished(summary));
        tracing::debug!(
            root = %self.root.display(),
            files = summary.files_emitted,
            skipped = summary.dirs_skipped,
            cancelled = summary.cancelled,
            "walk finished"
        );

        drop(self.tx);
        let _ = done_tx.send(summary);
        summary
    }

    fn traverse(&self) -> WalkSummary {
        let mut summary = WalkSummary::default();
        let mut pending: VecDeque<PathBuf> = VecDeque::from([self.root.clone()]);

        while let Some(dir) = pending.pop_front() {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let mut children = match self.lister.list(&dir) {
                Ok(children) => children,
                Err(err) => {
                    self.skip_directory(&dir, &err, &mut summary);
                    continue;
                }
            };
            summary.dirs_visited += 1;

            if self.sort_entries {
                children.sort_by(|a, b| a.name.cmp(&b.name));
            }

            for child in children {
                match (child.kind, child.info) {
                    (EntryKind::Directory, _) => pending.push_back(dir.join(&child.name)),
                    (EntryKind::File, Some(info)) => {
                        if self.cancel.is_cancelled() {
                            summary.cancelled = true;
                            return summary;
                        }
                        let entry = WalkEntry::new(dir.clone(), info);
                        if self.tx.blocking_send(entry).is_err() {
                            // Receiver dropped without stopping.
                            summary.cancelled = true;
                            return summary;
                        }
                        summary.files_emitted += 1;
                    }
                    _ => summary.entries_ignored += 1,
                }
            }
        }

        summary
    }

    fn skip_directory(&self, dir: &Path, err: &std::io::Error, summary: &mut WalkSummary) {
        summary.dirs_skipped += 1;
        tracing::debug!(path = %dir.display(), error = %err, "skipping unreadable directory");
        let _ = self.events_tx.send(WalkEvent::DirectorySkipped {
            path: dir.to_path_buf(),
            error: err.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lister::ListedEntry;
    use crate::TryRecvError;
    use std::collections::HashMap;
    use std::io;
    use tokio::sync::broadcast::error::RecvError;

    /// In-memory tree; directories missing from the map fail to list.
    struct MockLister {
        dirs: HashMap<PathBuf, Vec<ListedEntry>>,
    }

    impl MockLister {
        fn new() -> Self {
            Self {
                dirs: HashMap::new(),
            }
        }

        fn with_dir(mut self, path: &str, children: Vec<ListedEntry>) -> Self {
            self.dirs.insert(PathBuf::from(path), children);
            self
        }
    }

    impl DirLister for MockLister {
        fn list(&self, dir: &Path) -> io::Result<Vec<ListedEntry>> {
            self.dirs
                .get(dir)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    fn paths(entries: &[WalkEntry]) -> Vec<PathBuf> {
        entries.iter().map(|e| e.full_path()).collect()
    }

    #[test]
    fn test_two_level_tree() {
        let lister = MockLister::new()
            .with_dir("/r", vec![ListedEntry::dir("sub"), ListedEntry::file_named("a.txt", 1)])
            .with_dir("/r/sub", vec![ListedEntry::file_named("b.txt", 2)]);

        let walker = Walker::with_lister(WalkConfig::new("/r"), lister);
        let entries: Vec<WalkEntry> = walker.start().unwrap().collect();

        assert_eq!(
            paths(&entries),
            vec![PathBuf::from("/r/a.txt"), PathBuf::from("/r/sub/b.txt")]
        );
        assert_eq!(entries[0].directory, PathBuf::from("/r"));
    }

    #[test]
    fn test_breadth_first_order() {
        let lister = MockLister::new()
            .with_dir(
                "/r",
                vec![
                    ListedEntry::file_named("b.txt", 1),
                    ListedEntry::dir("d1"),
                    ListedEntry::file_named("a.txt", 1),
                    ListedEntry::dir("d2"),
                ],
            )
            .with_dir(
                "/r/d1",
                vec![ListedEntry::dir("deep"), ListedEntry::file_named("x.txt", 1)],
            )
            .with_dir("/r/d2", vec![ListedEntry::file_named("y.txt", 1)])
            .with_dir("/r/d1/deep", vec![ListedEntry::file_named("z.txt", 1)]);

        let walker = Walker::with_lister(WalkConfig::new("/r"), lister);
        let entries: Vec<WalkEntry> = walker.start().unwrap().collect();

        assert_eq!(
            paths(&entries),
            vec![
                PathBuf::from("/r/a.txt"),
                PathBuf::from("/r/b.txt"),
                PathBuf::from("/r/d1/x.txt"),
                PathBuf::from("/r/d2/y.txt"),
                PathBuf::from("/r/d1/deep/z.txt"),
            ]
        );
    }

    #[test]
    fn test_unsorted_keeps_listing_order() {
        let lister = MockLister::new().with_dir(
            "/r",
            vec![ListedEntry::file_named("b", 1), ListedEntry::file_named("a", 1)],
        );
        let config = WalkConfig::builder()
            .root("/r")
            .sort_entries(false)
            .build()
            .unwrap();

        let entries: Vec<WalkEntry> = Walker::with_lister(config, lister).start().unwrap().collect();
        assert_eq!(paths(&entries), vec![PathBuf::from("/r/b"), PathBuf::from("/r/a")]);
    }

    #[test]
    fn test_unreadable_directory_is_skipped() {
        let lister = MockLister::new()
            .with_dir(
                "/r",
                vec![ListedEntry::dir("locked"), ListedEntry::dir("open")],
            )
            .with_dir("/r/open", vec![ListedEntry::file_named("ok.txt", 1)]);

        let walker = Walker::with_lister(WalkConfig::new("/r"), lister);
        let mut events = walker.subscribe();
        let mut walk = walker.start().unwrap();
        let entries: Vec<WalkEntry> = walk.by_ref().collect();
        let summary = walk.wait();

        assert_eq!(paths(&entries), vec![PathBuf::from("/r/open/ok.txt")]);
        assert_eq!(summary.dirs_skipped, 1);
        assert_eq!(summary.dirs_visited, 2);
        assert!(summary.completed());

        match events.try_recv().unwrap() {
            WalkEvent::DirectorySkipped { path, error } => {
                assert_eq!(path, PathBuf::from("/r/locked"));
                assert!(error.contains("denied"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(events.try_recv().unwrap(), WalkEvent::Finished(s) if s == summary));
    }

    #[test]
    fn test_other_entries_are_ignored() {
        let lister = MockLister::new().with_dir(
            "/r",
            vec![ListedEntry::other("link"), ListedEntry::file_named("f", 1)],
        );

        let mut walk = Walker::with_lister(WalkConfig::new("/r"), lister).start().unwrap();
        let entries: Vec<WalkEntry> = walk.by_ref().collect();
        let summary = walk.wait();

        assert_eq!(entries.len(), 1);
        assert_eq!(summary.entries_ignored, 1);
    }

    #[test]
    fn test_stop_before_completion() {
        let files: Vec<ListedEntry> = (0..100)
            .map(|i| ListedEntry::file_named(format!("f{i:03}"), 1))
            .collect();
        let lister = MockLister::new().with_dir("/r", files);
        let config = WalkConfig::builder()
            .root("/r")
            .channel_capacity(1usize)
            .build()
            .unwrap();

        let mut walk = Walker::with_lister(config, lister).start().unwrap();
        let first = walk.next().unwrap();
        assert_eq!(first.full_path(), PathBuf::from("/r/f000"));

        let summary = walk.stop();
        assert!(summary.cancelled);
        assert!(summary.files_emitted < 100);
    }

    #[test]
    fn test_stop_after_completion() {
        let lister = MockLister::new().with_dir("/r", vec![ListedEntry::file_named("f", 1)]);
        let mut walk = Walker::with_lister(WalkConfig::new("/r"), lister).start().unwrap();

        assert_eq!(walk.by_ref().count(), 1);
        let summary = walk.stop();
        assert!(summary.completed());
        assert_eq!(summary.files_emitted, 1);
    }

    #[test]
    fn test_dropped_handle_releases_worker() {
        let files: Vec<ListedEntry> = (0..50)
            .map(|i| ListedEntry::file_named(format!("f{i}"), 1))
            .collect();
        let lister = MockLister::new().with_dir("/r", files);
        let config = WalkConfig::builder()
            .root("/r")
            .channel_capacity(1usize)
            .build()
            .unwrap();

        let walker = Walker::with_lister(config, lister);
        let mut events = walker.subscribe();
        drop(walker.start().unwrap());

        let summary = loop {
            match events.blocking_recv() {
                Ok(WalkEvent::Finished(summary)) => break summary,
                Ok(_) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => panic!("event channel closed"),
            }
        };
        assert!(summary.cancelled);
    }

    #[test]
    fn test_skip_events_survive_lag() {
        let children: Vec<ListedEntry> = (0..100)
            .map(|i| ListedEntry::dir(format!("locked{i:03}")))
            .collect();
        let lister = MockLister::new().with_dir("/r", children);

        let walker = Walker::with_lister(WalkConfig::new("/r"), lister);
        let mut events = walker.subscribe();
        let summary = walker.start().unwrap().wait();
        assert_eq!(summary.dirs_skipped, 100);

        let mut skipped = Vec::new();
        let mut dropped = 0;
        let mut finished = false;
        loop {
            match events.try_recv() {
                Ok(WalkEvent::DirectorySkipped { path, .. }) => skipped.push(path),
                Ok(WalkEvent::Finished(s)) => finished = s == summary,
                Err(TryRecvError::Lagged(n)) => dropped += n,
                Err(_) => break,
            }
        }

        assert!(finished);
        assert!(!skipped.is_empty());
        assert_eq!(skipped.len() as u64 + dropped, 100);
        assert_eq!(skipped.last(), Some(&PathBuf::from("/r/locked099")));
    }

    #[test]
    fn test_start_rejects_oversized_capacity() {
        let config = WalkConfig {
            channel_capacity: usize::MAX,
            ..WalkConfig::new("/r")
        };
        let result = Walker::with_lister(config, MockLister::new()).start();
        assert!(matches!(result, Err(ToolError::InvalidConfig { .. })));
    }

    #[test]
    fn test_oversized_event_capacity_does_not_panic() {
        let config = WalkConfig {
            event_capacity: usize::MAX,
            ..WalkConfig::new("/r")
        };
        let walker = Walker::with_lister(config, MockLister::new());
        let _events = walker.subscribe();
        assert!(matches!(
            walker.start(),
            Err(ToolError::InvalidConfig { .. })
        ));
    }
}
