// src/fetch/limiter.rs
// =============================================================================
// Per-host connection limiter.
//
// Every distinct host gets its own semaphore with N permits. A request must
// hold a permit for its host while it is in flight (sending the request AND
// reading the body), so at most N requests hit the same host at once no matter
// how many site tasks are running.
//
// The semaphores live in a DashMap so tasks can look up / create the entry
// for their host without a global lock.
// =============================================================================

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

#[derive(Clone, Debug)]
pub struct HostLimiter {
    semaphores: Arc<DashMap<String, Arc<Semaphore>>>,
    permits_per_host: usize,
}

impl HostLimiter {
    pub fn new(permits_per_host: usize) -> Self {
        Self {
            semaphores: Arc::new(DashMap::new()),
            permits_per_host,
        }
    }

    /// Waits until a connection slot for `host` is free.
    ///
    /// The slot is given back when the returned permit is dropped, which
    /// happens on success and on every failure path alike.
    pub async fn acquire(&self, host: &str) -> Result<OwnedSemaphorePermit, AcquireError> {
        self.get_or_create(host).acquire_owned().await
    }

    /// Number of free slots for `host` right now
    pub fn available(&self, host: &str) -> usize {
        self.semaphores
            .get(&host.to_ascii_lowercase())
            .map(|s| s.available_permits())
            .unwrap_or(self.permits_per_host)
    }

    fn get_or_create(&self, host: &str) -> Arc<Semaphore> {
        // Hosts are case-insensitive
        self.semaphores
            .entry(host.to_ascii_lowercase())
            .or_insert_with(|| Arc::new(Semaphore::new(self.permits_per_host)))
            .clone()
    }
}
