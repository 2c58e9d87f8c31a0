//! Dispatch pipeline (application-level orchestration).
//!
//! ```text
//! process_requests(resource_id)
//!   ↓
//! 1. Acquire the pool's exclusive lock
//!   ↓
//! 2. Load the pool's inventory and requests from the store
//!   ↓
//! 3. Run one scheduler pass (pure, in memory)
//!   ↓
//! 4. Persist dispatched request statuses, then touched items, through the sink
//! ```
//!
//! The lock is held until persistence finishes, so the next pass over the same
//! pool always loads the state this pass wrote.

use serde::Serialize;
use thiserror::Error;

use relief_core::{DomainError, RequestId, ResourceId};
use relief_inventory::Item;
use relief_requests::Request;
use relief_scheduler::{DispatchPass, Scheduler, Shortfall};

use crate::config::DispatchConfig;
use crate::pool_locks::PoolLocks;
use crate::store::{ReliefStore, StoreError};

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Malformed data reached the scheduler; nothing was changed.
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    /// Any other domain failure surfaced by the pass.
    #[error(transparent)]
    Domain(DomainError),

    /// Loading or persisting failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<DomainError> for DispatchError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::PreconditionViolation(msg) => DispatchError::PreconditionViolation(msg),
            other => DispatchError::Domain(other),
        }
    }
}

/// A pending request the pass could not satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfeasibleRequest {
    pub request_id: RequestId,
    pub shortfall: Shortfall,
}

/// What one pass over a pool dispatched and persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub resource_id: ResourceId,
    pub dispatched: Vec<Request>,
    pub touched_items: Vec<Item>,
    pub infeasible: Vec<InfeasibleRequest>,
}

impl DispatchSummary {
    fn from_pass(resource_id: ResourceId, pass: DispatchPass) -> Self {
        let infeasible = pass
            .infeasible()
            .map(|(request_id, shortfall)| InfeasibleRequest {
                request_id: request_id.clone(),
                shortfall: shortfall.clone(),
            })
            .collect();

        Self {
            resource_id,
            dispatched: pass.dispatched,
            touched_items: pass.touched_items,
            infeasible,
        }
    }
}

/// Runs dispatch passes against a store, one pool at a time.
#[derive(Debug)]
pub struct DispatchService<S> {
    store: S,
    scheduler: Scheduler,
    locks: PoolLocks,
    config: DispatchConfig,
}

impl<S> DispatchService<S> {
    pub fn new(store: S, config: DispatchConfig) -> Self {
        Self {
            store,
            scheduler: Scheduler::new(),
            locks: PoolLocks::new(),
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> DispatchConfig {
        self.config
    }
}

impl<S> DispatchService<S>
where
    S: ReliefStore,
{
    /// Run one pass over the pending requests of `resource_id` and persist it.
    ///
    /// Insufficient stock is not an error: such requests stay pending and are
    /// listed in [`DispatchSummary::infeasible`].
    pub fn process_requests(&self, resource_id: &ResourceId) -> Result<DispatchSummary, DispatchError> {
        let lock = self.locks.for_pool(resource_id)?;
        let _guard = lock
            .lock()
            .map_err(|_| StoreError::LockPoisoned(format!("pool {resource_id}")))?;

        let mut inventory = self.store.fetch_inventory(resource_id, None)?;
        let mut requests = self
            .store
            .fetch_pending_requests(resource_id, self.config.request_fetch_limit)?;

        let pass = self.scheduler.process_pending(&mut requests, &mut inventory)?;

        // Statuses first: a failure before the item writes leaves stock
        // un-decremented rather than letting a still-pending request consume it twice.
        for request in &pass.dispatched {
            self.store
                .persist_request_status(resource_id, request.request_id(), request.status())?;
        }
        for item in &pass.touched_items {
            self.store
                .persist_item_state(resource_id, &item.item_id(), item.quantity(), item.status())?;
        }

        let summary = DispatchSummary::from_pass(resource_id.clone(), pass);
        tracing::info!(
            resource_id = %resource_id,
            dispatched = summary.dispatched.len(),
            infeasible = summary.infeasible.len(),
            "persisted dispatch pass"
        );
        Ok(summary)
    }
}
