//! Background directory walker for toolbelt.
//!
//! A walk runs breadth-first on its own thread and hands regular files to
//! the caller through a bounded channel. The caller either drains the
//! handle to completion or stops it early.
//!
//! # Example
//!
//! ```rust,no_run
//! use toolbelt_walk::start_walk;
//!
//! let mut walk = start_walk("/path/to/walk").unwrap();
//! for entry in walk.by_ref().take(10) {
//!     println!("{}", entry.full_path().display());
//! }
//! let summary = walk.stop();
//! println!("emitted {} files", summary.files_emitted);
//! ```
//!
//! # Skipped directories
//!
//! Unreadable directories are skipped silently. Subscribe to walk events to
//! observe them. The event channel is bounded; a slow reader loses the oldest
//! events and is told how many through `Lagged`:
//!
//! ```rust,no_run
//! use toolbelt_walk::{TryRecvError, WalkConfig, WalkEvent, Walker};
//!
//! let walker = Walker::new(WalkConfig::new("/var"));
//! let mut events = walker.subscribe();
//! let summary = walker.start().unwrap().wait();
//!
//! loop {
//!     match events.try_recv() {
//!         Ok(WalkEvent::DirectorySkipped { path, error }) => {
//!             eprintln!("skipped {}: {error}", path.display());
//!         }
//!         Ok(WalkEvent::Finished(_)) => {}
//!         Err(TryRecvError::Lagged(n)) => eprintln!("{n} events dropped"),
//!         Err(_) => break,
//!     }
//! }
//! # let _ = summary;
//! ```

mod event;
mod handle;
mod lister;
mod walker;

pub use event::{WalkEvent, WalkSummary};
pub use handle::WalkHandle;
pub use lister::{DirLister, FsLister, ListedEntry};
pub use walker::{Walker, start_walk};

pub use tokio::sync::broadcast::error::TryRecvError;

// Re-export core types for convenience
pub use toolbelt_core::{EntryKind, FileInfo, ToolError, WalkConfig, WalkEntry};
