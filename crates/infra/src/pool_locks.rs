//! Per-pool serialization of dispatch passes.
//!
//! A pass is check-then-act over a pool's stock. Two passes over the same pool
//! running at once could both read a quantity before either writes it back,
//! so every pass over a pool must hold that pool's lock. Passes over different
//! pools never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use relief_core::ResourceId;

use crate::store::StoreError;

/// Registry of one exclusive lock per resource pool, created on first use.
///
/// Entries no caller holds are dropped whenever a lock is handed out, so the
/// registry stays proportional to the pools in use.
#[derive(Debug, Default)]
pub struct PoolLocks {
    locks: Mutex<HashMap<ResourceId, Arc<Mutex<()>>>>,
}

impl PoolLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock guarding `resource_id`. Every caller holding a clone at the
    /// same time gets the same `Arc`.
    pub fn for_pool(&self, resource_id: &ResourceId) -> Result<Arc<Mutex<()>>, StoreError> {
        let mut locks = self.registry()?;
        // Only the registry references an idle lock.
        locks.retain(|id, lock| id == resource_id || Arc::strong_count(lock) > 1);
        Ok(locks.entry(resource_id.clone()).or_default().clone())
    }

    /// Number of pools currently tracked.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.registry()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.registry()?.is_empty())
    }

    fn registry(&self) -> Result<MutexGuard<'_, HashMap<ResourceId, Arc<Mutex<()>>>>, StoreError> {
        self.locks
            .lock()
            .map_err(|_| StoreError::LockPoisoned("pool lock registry".to_string()))
    }
}
