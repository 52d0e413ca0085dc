//! Counting gate bounding concurrent network fetches.
//!
//! Every outbound tile fetch holds a permit from this gate while its
//! request is in flight. The gate caps simultaneous requests (default 20),
//! providing backpressure against the remote tile service and bounding the
//! memory held by in-flight responses. Tasks past the cap suspend until a
//! permit frees; permits release when dropped.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Default number of simultaneously in-flight network fetches.
pub const DEFAULT_CONCURRENT_FETCHES: usize = 20;

/// Counting gate for outbound fetches.
///
/// Created once per [`crate::fetcher::TileService`] at startup and shared
/// by all of its fetch tasks for the life of the process.
#[derive(Debug)]
pub struct FetchGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl FetchGate {
    /// Creates a gate admitting up to `capacity` concurrent fetches.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "fetch gate capacity must be > 0");
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Acquires a permit, waiting until a slot is free.
    ///
    /// The permit is released when dropped.
    pub async fn acquire(&self) -> FetchPermit {
        // The semaphore is owned by this gate and never closed.
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .expect("fetch gate semaphore closed");
        FetchPermit { _permit: permit }
    }

    /// Maximum number of concurrent fetches this gate admits.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of permits currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

impl Default for FetchGate {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENT_FETCHES)
    }
}

/// A held slot in the fetch gate.
pub struct FetchPermit {
    _permit: OwnedSemaphorePermit,
}
