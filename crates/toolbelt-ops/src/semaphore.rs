//! Counting semaphore limiting how many tasks run a section at once.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore as TokioSemaphore, TryAcquireError};

use crate::{Result, ToolError};

/// A counting semaphore. Cloning shares the same permits.
#[derive(Debug, Clone)]
pub struct Semaphore {
    inner: Arc<TokioSemaphore>,
    max: usize,
}

/// Held while inside the semaphore; leaving happens on drop.
#[derive(Debug)]
pub struct SemaphoreGuard {
    _permit: OwnedSemaphorePermit,
}

impl Semaphore {
    /// Create a semaphore admitting at most `max` holders.
    pub fn new(max: usize) -> Self {
        Self {
            inner: Arc::new(TokioSemaphore::new(max)),
            max,
        }
    }

    /// Wait until a slot is free and enter.
    pub async fn enter(&self) -> Result<SemaphoreGuard> {
        let permit = Arc::clone(&self.inner)
            .acquire_owned()
            .await
            .map_err(|_| ToolError::Interrupted)?;
        Ok(SemaphoreGuard { _permit: permit })
    }

    /// Enter if a slot is free right now.
    pub fn try_enter(&self) -> Option<SemaphoreGuard> {
        match Arc::clone(&self.inner).try_acquire_owned() {
            Ok(permit) => Some(SemaphoreGuard { _permit: permit }),
            Err(TryAcquireError::NoPermits) | Err(TryAcquireError::Closed) => None,
        }
    }

    /// Number of free slots.
    pub fn available(&self) -> usize {
        self.inner.available_permits()
    }

    /// Maximum number of concurrent holders.
    pub fn max(&self) -> usize {
        self.max
    }
}
