//! Concurrency limiter
//!
//! A counting permit pool shared by every query that should count against
//! the same in-flight budget. Cloning shares the pool.

use crate::error::{Error, Result};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Shared pool of request permits
#[derive(Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// One in-flight request slot, returned to the pool on drop
#[derive(Debug)]
pub struct Permit {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyLimiter {
    /// Default number of simultaneous requests
    pub const DEFAULT_CAPACITY: usize = 10;

    /// Create a pool with `capacity` permits (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait for a permit
    pub async fn acquire(&self) -> Result<Permit> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| Error::LimiterClosed)?;
        Ok(Permit { _permit: permit })
    }

    /// Stop handing out permits.
    ///
    /// Waiters and later `acquire` calls fail with `LimiterClosed`; permits
    /// already held stay valid until dropped. Affects every clone.
    pub fn close(&self) {
        self.semaphore.close();
    }

    /// Check if the pool was closed
    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }

    /// Take a permit if one is free right now
    pub fn try_acquire(&self) -> Option<Permit> {
        Arc::clone(&self.semaphore)
            .try_acquire_owned()
            .ok()
            .map(|permit| Permit { _permit: permit })
    }

    /// Configured number of permits
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits not currently held
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Permits currently held
    pub fn in_flight(&self) -> usize {
        self.capacity.saturating_sub(self.available())
    }

    /// Check if two handles share the same pool
    pub fn shares_pool_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.semaphore, &other.semaphore)
    }
}

impl Default for ConcurrencyLimiter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl From<usize> for ConcurrencyLimiter {
    fn from(capacity: usize) -> Self {
        Self::new(capacity)
    }
}

impl std::fmt::Debug for ConcurrencyLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrencyLimiter")
            .field("capacity", &self.capacity)
            .field("available", &self.available())
            .field("closed", &self.is_closed())
            .finish()
    }
}
