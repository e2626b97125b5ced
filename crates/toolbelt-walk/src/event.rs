//! Walk events and summary.

use std::path::PathBuf;

use serde::Serialize;

/// Counters reported when a walk worker exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WalkSummary {
    /// Directories successfully listed.
    pub dirs_visited: u64,
    /// Directories whose listing failed.
    pub dirs_skipped: u64,
    /// Regular files sent to the consumer.
    pub files_emitted: u64,
    /// Children that were neither directories nor readable regular files.
    pub entries_ignored: u64,
    /// Whether the walk ended because it was stopped.
    pub cancelled: bool,
}

impl WalkSummary {
    /// Check if the walk reached the end of the tree.
    pub fn completed(&self) -> bool {
        !self.cancelled
    }
}

/// Notification broadcast to walk subscribers.
#[derive(Debug, Clone)]
pub enum WalkEvent {
    /// A directory could not be listed and was skipped.
    DirectorySkipped {
        /// The directory that failed.
        path: PathBuf,
        /// The listing error.
        error: String,
    },
    /// The worker finished, either at the end of the tree or on cancellation.
    Finished(WalkSummary),
}
