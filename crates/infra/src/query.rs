use thiserror::Error;

use relief_core::{ItemId, RequestId, ResourceId};
use relief_inventory::{Inventory, Item, ItemStatus};
use relief_requests::Request;

use crate::config::DispatchConfig;
use crate::store::{ReliefStore, StoreError};

#[derive(Debug, Error)]
pub enum QueryError {
    /// Nothing matched in the pool.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Read-only views over a pool's items and requests.
///
/// List queries that match nothing report [`QueryError::NotFound`] rather than
/// an empty list. Status and donor lists always read the whole pool.
#[derive(Debug, Clone)]
pub struct QueryService<S> {
    store: S,
    config: DispatchConfig,
}

impl<S> QueryService<S> {
    pub fn new(store: S, config: DispatchConfig) -> Self {
        Self { store, config }
    }
}

impl<S> QueryService<S>
where
    S: ReliefStore,
{
    /// Snapshot of a pool's items, capped at `item_fetch_limit` (in item id order).
    pub fn inventory(&self, resource_id: &ResourceId) -> Result<Inventory, QueryError> {
        self.load(resource_id, self.config.item_fetch_limit)
    }

    pub fn available_items(&self, resource_id: &ResourceId) -> Result<Vec<Item>, QueryError> {
        self.items_with_status(resource_id, ItemStatus::Available)
    }

    pub fn dispatched_items(&self, resource_id: &ResourceId) -> Result<Vec<Item>, QueryError> {
        self.items_with_status(resource_id, ItemStatus::Dispatched)
    }

    pub fn items_by_donor(
        &self,
        resource_id: &ResourceId,
        donor_id: &str,
    ) -> Result<Vec<Item>, QueryError> {
        let inventory = self.load(resource_id, None)?;
        non_empty(
            inventory.list_by_donor(donor_id).into_iter().cloned().collect(),
            || format!("no items from donor {donor_id:?} in {resource_id}"),
        )
    }

    pub fn item(&self, resource_id: &ResourceId, item_id: &ItemId) -> Result<Item, QueryError> {
        self.store
            .fetch_item(resource_id, item_id)?
            .ok_or_else(|| QueryError::NotFound(format!("item {item_id} in {resource_id}")))
    }

    /// Requests of a pool in submission order, whatever their status, capped at
    /// `request_fetch_limit`.
    pub fn requests_by_resource(&self, resource_id: &ResourceId) -> Result<Vec<Request>, QueryError> {
        let requests = self
            .store
            .fetch_requests(resource_id, self.config.request_fetch_limit)?;
        non_empty(requests, || format!("no requests in {resource_id}"))
    }

    pub fn request(
        &self,
        resource_id: &ResourceId,
        request_id: &RequestId,
    ) -> Result<Request, QueryError> {
        self.store
            .fetch_request(resource_id, request_id)?
            .ok_or_else(|| QueryError::NotFound(format!("request {request_id} in {resource_id}")))
    }

    fn load(&self, resource_id: &ResourceId, limit: Option<usize>) -> Result<Inventory, QueryError> {
        let inventory = self.store.fetch_inventory(resource_id, limit)?;
        if inventory.is_empty() {
            return Err(QueryError::NotFound(format!("no items in {resource_id}")));
        }
        Ok(inventory)
    }

    fn items_with_status(
        &self,
        resource_id: &ResourceId,
        status: ItemStatus,
    ) -> Result<Vec<Item>, QueryError> {
        let inventory = self.load(resource_id, None)?;
        non_empty(
            inventory.list_by_status(status).into_iter().cloned().collect(),
            || format!("no {status} items in {resource_id}"),
        )
    }
}

fn non_empty<T>(found: Vec<T>, what: impl FnOnce() -> String) -> Result<Vec<T>, QueryError> {
    if found.is_empty() {
        Err(QueryError::NotFound(what()))
    } else {
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use relief_requests::PriorityLevel;

    use crate::store::{InMemoryReliefStore, PersistenceSink};

    fn pool() -> ResourceId {
        ResourceId::new("north").unwrap()
    }

    fn seeded() -> (QueryService<Arc<InMemoryReliefStore>>, Item, Item) {
        let store = Arc::new(InMemoryReliefStore::new());
        let water = Item::new("water", 4, None, "alice");
        let tent = Item::new("tent", 1, None, "bob");
        store.add_item(&pool(), water.clone()).unwrap();
        store.add_item(&pool(), tent.clone()).unwrap();
        store
            .persist_item_state(&pool(), &tent.item_id(), 0, ItemStatus::Dispatched)
            .unwrap();
        (QueryService::new(store, DispatchConfig::default()), water, tent)
    }

    #[test]
    fn filters_items_by_status() {
        let (q, water, tent) = seeded();

        let available = q.available_items(&pool()).unwrap();
        let dispatched = q.dispatched_items(&pool()).unwrap();

        assert_eq!(available, vec![water]);
        assert_eq!(dispatched.len(), 1);
        assert_eq!(dispatched[0].item_id(), tent.item_id());
        assert_eq!(dispatched[0].quantity(), 0);
    }

    #[test]
    fn filters_items_by_donor() {
        let (q, water, _) = seeded();

        assert_eq!(q.items_by_donor(&pool(), "alice").unwrap(), vec![water]);
        assert!(matches!(
            q.items_by_donor(&pool(), "carol"),
            Err(QueryError::NotFound(_))
        ));
    }

    #[test]
    fn empty_or_unknown_pool_is_not_found() {
        let (q, _, _) = seeded();
        let other = ResourceId::new("south").unwrap();

        assert!(matches!(q.inventory(&other), Err(QueryError::NotFound(_))));
        assert!(matches!(q.available_items(&other), Err(QueryError::NotFound(_))));
        assert!(matches!(q.requests_by_resource(&other), Err(QueryError::NotFound(_))));
    }

    #[test]
    fn item_cap_bounds_snapshot_but_not_filtered_lists() {
        let store = Arc::new(InMemoryReliefStore::new());
        for n in 0..3 {
            store.add_item(&pool(), Item::new(format!("kit-{n}"), 2, None, "alice")).unwrap();
        }
        let config = DispatchConfig {
            item_fetch_limit: Some(1),
            request_fetch_limit: None,
        };
        let q = QueryService::new(store, config);

        assert_eq!(q.inventory(&pool()).unwrap().len(), 1);
        assert_eq!(q.available_items(&pool()).unwrap().len(), 3);
        assert_eq!(q.items_by_donor(&pool(), "alice").unwrap().len(), 3);
    }

    #[test]
    fn single_lookups() {
        let (q, water, _) = seeded();
        assert_eq!(q.item(&pool(), &water.item_id()).unwrap(), water);
        assert!(matches!(q.item(&pool(), &ItemId::new()), Err(QueryError::NotFound(_))));

        let rid = RequestId::new("REQ9").unwrap();
        assert!(matches!(q.request(&pool(), &rid), Err(QueryError::NotFound(_))));

        q.store
            .add_request(
                &pool(),
                Request::new(rid.clone(), vec![water.item_id()], vec![1], PriorityLevel::Low, "x"),
            )
            .unwrap();
        assert_eq!(q.request(&pool(), &rid).unwrap().request_id(), &rid);
        assert_eq!(q.requests_by_resource(&pool()).unwrap().len(), 1);
    }
}
