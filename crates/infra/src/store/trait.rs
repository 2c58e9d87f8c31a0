use std::sync::Arc;

use thiserror::Error;

use relief_core::{ItemId, RequestId, ResourceId};
use relief_inventory::{Inventory, Item, ItemStatus};
use relief_requests::{Request, RequestStatus};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// A write targeted an item or request the store does not hold.
    #[error("not found: {0}")]
    NotFound(String),

    /// A request id is already taken within the pool.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Write side used after a dispatch pass.
///
/// Both operations overwrite with absolute values, so repeating them is harmless.
/// The two writes of one pass are not atomic together. Callers write request
/// statuses before item states, so an interrupted pass can leave stock
/// un-decremented but never leaves a consumed item behind a still-pending request.
pub trait PersistenceSink: Send + Sync {
    fn persist_item_state(
        &self,
        resource_id: &ResourceId,
        item_id: &ItemId,
        quantity: u32,
        status: ItemStatus,
    ) -> Result<(), StoreError>;

    fn persist_request_status(
        &self,
        resource_id: &ResourceId,
        request_id: &RequestId,
        status: RequestStatus,
    ) -> Result<(), StoreError>;
}

/// Pool-scoped storage of items and requests.
pub trait ReliefStore: PersistenceSink {
    fn add_item(&self, resource_id: &ResourceId, item: Item) -> Result<(), StoreError>;

    /// Record a request. Requests are returned in the order they were added.
    fn add_request(&self, resource_id: &ResourceId, request: Request) -> Result<(), StoreError>;

    /// Load a pool's items as an inventory. An unknown pool yields an empty one.
    ///
    /// `limit` caps the number of items loaded (in item id order).
    fn fetch_inventory(
        &self,
        resource_id: &ResourceId,
        limit: Option<usize>,
    ) -> Result<Inventory, StoreError>;

    fn fetch_item(
        &self,
        resource_id: &ResourceId,
        item_id: &ItemId,
    ) -> Result<Option<Item>, StoreError>;

    /// Requests of a pool in submission order, capped at `limit`.
    fn fetch_requests(
        &self,
        resource_id: &ResourceId,
        limit: Option<usize>,
    ) -> Result<Vec<Request>, StoreError>;

    /// Pending requests of a pool in submission order, capped at `limit`.
    fn fetch_pending_requests(
        &self,
        resource_id: &ResourceId,
        limit: Option<usize>,
    ) -> Result<Vec<Request>, StoreError>;

    fn fetch_request(
        &self,
        resource_id: &ResourceId,
        request_id: &RequestId,
    ) -> Result<Option<Request>, StoreError>;

    /// Drop every item and request of a pool.
    fn clear_pool(&self, resource_id: &ResourceId) -> Result<(), StoreError>;
}

impl<S> PersistenceSink for Arc<S>
where
    S: PersistenceSink + ?Sized,
{
    fn persist_item_state(
        &self,
        resource_id: &ResourceId,
        item_id: &ItemId,
        quantity: u32,
        status: ItemStatus,
    ) -> Result<(), StoreError> {
        (**self).persist_item_state(resource_id, item_id, quantity, status)
    }

    fn persist_request_status(
        &self,
        resource_id: &ResourceId,
        request_id: &RequestId,
        status: RequestStatus,
    ) -> Result<(), StoreError> {
        (**self).persist_request_status(resource_id, request_id, status)
    }
}

impl<S> ReliefStore for Arc<S>
where
    S: ReliefStore + ?Sized,
{
    fn add_item(&self, resource_id: &ResourceId, item: Item) -> Result<(), StoreError> {
        (**self).add_item(resource_id, item)
    }

    fn add_request(&self, resource_id: &ResourceId, request: Request) -> Result<(), StoreError> {
        (**self).add_request(resource_id, request)
    }

    fn fetch_inventory(
        &self,
        resource_id: &ResourceId,
        limit: Option<usize>,
    ) -> Result<Inventory, StoreError> {
        (**self).fetch_inventory(resource_id, limit)
    }

    fn fetch_item(
        &self,
        resource_id: &ResourceId,
        item_id: &ItemId,
    ) -> Result<Option<Item>, StoreError> {
        (**self).fetch_item(resource_id, item_id)
    }

    fn fetch_requests(
        &self,
        resource_id: &ResourceId,
        limit: Option<usize>,
    ) -> Result<Vec<Request>, StoreError> {
        (**self).fetch_requests(resource_id, limit)
    }

    fn fetch_pending_requests(
        &self,
        resource_id: &ResourceId,
        limit: Option<usize>,
    ) -> Result<Vec<Request>, StoreError> {
        (**self).fetch_pending_requests(resource_id, limit)
    }

    fn fetch_request(
        &self,
        resource_id: &ResourceId,
        request_id: &RequestId,
    ) -> Result<Option<Request>, StoreError> {
        (**self).fetch_request(resource_id, request_id)
    }

    fn clear_pool(&self, resource_id: &ResourceId) -> Result<(), StoreError> {
        (**self).clear_pool(resource_id)
    }
}
