//! Session-count limiting for the listener
//!
//! Each accepted connection holds a [`ConnectionPermit`] for its whole
//! lifetime. When no permit is available the listener refuses the connection
//! immediately instead of queueing it.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Connection limiter using semaphores
///
/// A limit of zero means "unlimited": every `try_acquire` succeeds.
#[derive(Debug, Clone)]
pub struct ConnectionLimiter {
    /// `None` when unlimited
    semaphore: Option<Arc<Semaphore>>,
    /// Maximum number of concurrent sessions (0 = unlimited)
    max_connections: usize,
}

impl ConnectionLimiter {
    /// Create a new connection limiter
    ///
    /// # Example
    ///
    /// ```
    /// use newsd::ConnectionLimiter;
    ///
    /// // Allow up to 10 concurrent sessions
    /// let limiter = ConnectionLimiter::new(10);
    /// assert_eq!(limiter.available(), Some(10));
    ///
    /// // No limit at all
    /// let unlimited = ConnectionLimiter::new(0);
    /// assert!(unlimited.try_acquire().is_some());
    /// ```
    pub fn new(max_connections: usize) -> Self {
        Self {
            semaphore: (max_connections > 0).then(|| Arc::new(Semaphore::new(max_connections))),
            max_connections,
        }
    }

    /// Try to acquire a session slot without waiting
    ///
    /// Returns `None` when every slot is taken. The slot is released when the
    /// permit is dropped.
    pub fn try_acquire(&self) -> Option<ConnectionPermit> {
        match &self.semaphore {
            None => Some(ConnectionPermit { _permit: None }),
            Some(semaphore) => semaphore
                .clone()
                .try_acquire_owned()
                .ok()
                .map(|permit| ConnectionPermit {
                    _permit: Some(permit),
                }),
        }
    }

    /// Configured maximum (0 = unlimited)
    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Free slots, or `None` when unlimited
    pub fn available(&self) -> Option<usize> {
        self.semaphore.as_ref().map(|s| s.available_permits())
    }
}

/// RAII guard for a session slot
///
/// Automatically releases the slot when dropped.
#[derive(Debug)]
pub struct ConnectionPermit {
    _permit: Option<OwnedSemaphorePermit>,
}
