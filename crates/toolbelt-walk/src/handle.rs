//! Consumer side of a running walk.

use std::thread::JoinHandle;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use toolbelt_core::WalkEntry;

use crate::event::WalkSummary;

/// Handle to a walk running in the background.
///
/// The handle is an [`Iterator`] over discovered files. Iteration blocks the
/// current thread; async callers use [`WalkHandle::next_entry`] and
/// [`WalkHandle::stop_async`] instead.
///
/// Dropping the handle cancels the walk without waiting for the worker.
#[derive(Debug)]
pub struct WalkHandle {
    rx: mpsc::Receiver<WalkEntry>,
    cancel: CancellationToken,
    worker: Option<JoinHandle<WalkSummary>>,
    done_rx: Option<oneshot::Receiver<WalkSummary>>,
}

impl WalkHandle {
    pub(crate) fn new(
        rx: mpsc::Receiver<WalkEntry>,
        cancel: CancellationToken,
        worker: JoinHandle<WalkSummary>,
        done_rx: oneshot::Receiver<WalkSummary>,
    ) -> Self {
        Self {
            rx,
            cancel,
            worker: Some(worker),
            done_rx: Some(done_rx),
        }
    }

    /// Receive the next entry, waiting asynchronously.
    ///
    /// Returns `None` once the walk has completed or been stopped.
    pub async fn next_entry(&mut self) -> Option<WalkEntry> {
        self.rx.recv().await
    }

    /// Request cancellation without waiting.
    ///
    /// The worker notices at its next directory. Entries already buffered
    /// remain readable.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels this walk, usable from another thread while
    /// this handle is being drained.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop the walk and wait for the worker to exit.
    ///
    /// Buffered entries are discarded so a worker blocked on a full channel
    /// can observe the cancellation. Safe to call after the walk finished.
    pub fn stop(mut self) -> WalkSummary {
        self.cancel.cancel();
        while self.rx.blocking_recv().is_some() {}
        self.join()
    }

    /// Drain the remaining entries and wait for the walk to finish.
    pub fn wait(mut self) -> WalkSummary {
        while self.rx.blocking_recv().is_some() {}
        self.join()
    }

    /// Async version of [`WalkHandle::stop`].
    pub async fn stop_async(mut self) -> WalkSummary {
        self.cancel.cancel();
        while self.rx.recv().await.is_some() {}

        // The summary is the worker's last action, so the thread is exiting.
        self.worker.take();
        match self.done_rx.take() {
            Some(done_rx) => done_rx.await.unwrap_or_default(),
            None => WalkSummary::default(),
        }
    }

    fn join(&mut self) -> WalkSummary {
        self.done_rx.take();
        let Some(worker) = self.worker.take() else {
            return WalkSummary::default();
        };
        match worker.join() {
            Ok(summary) => summary,
            Err(_) => {
                tracing::error!("walk worker panicked");
                WalkSummary {
                    cancelled: true,
                    ..WalkSummary::default()
                }
            }
        }
    }
}

impl Iterator for WalkHandle {
    type Item = WalkEntry;

    fn next(&mut self) -> Option<WalkEntry> {
        self.rx.blocking_recv()
    }
}

impl Drop for WalkHandle {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.cancel.cancel();
            self.rx.close();
        }
    }
}
