use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use relief_core::{Entity, ItemId, RequestId, ResourceId};
use relief_inventory::{Inventory, Item, ItemStatus};
use relief_requests::{Request, RequestStatus};

use super::r#trait::{PersistenceSink, ReliefStore, StoreError};

#[derive(Debug, Default)]
struct PoolRecord {
    items: BTreeMap<ItemId, Item>,
    requests: Vec<Request>,
}

/// In-memory pool store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryReliefStore {
    pools: RwLock<HashMap<ResourceId, PoolRecord>>,
}

impl InMemoryReliefStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::LockPoisoned("in-memory relief store".to_string())
    }
}

impl PersistenceSink for InMemoryReliefStore {
    fn persist_item_state(
        &self,
        resource_id: &ResourceId,
        item_id: &ItemId,
        quantity: u32,
        status: ItemStatus,
    ) -> Result<(), StoreError> {
        let mut pools = self.pools.write().map_err(|_| Self::poisoned())?;
        let item = pools
            .get_mut(resource_id)
            .and_then(|pool| pool.items.get_mut(item_id))
            .ok_or_else(|| StoreError::NotFound(format!("item {item_id} in {resource_id}")))?;

        item.set_quantity(quantity);
        item.set_status(status);
        Ok(())
    }

    fn persist_request_status(
        &self,
        resource_id: &ResourceId,
        request_id: &RequestId,
        status: RequestStatus,
    ) -> Result<(), StoreError> {
        let mut pools = self.pools.write().map_err(|_| Self::poisoned())?;
        let request = pools
            .get_mut(resource_id)
            .and_then(|pool| pool.requests.iter_mut().find(|r| r.request_id() == request_id))
            .ok_or_else(|| StoreError::NotFound(format!("request {request_id} in {resource_id}")))?;

        request.set_status(status);
        Ok(())
    }
}

impl ReliefStore for InMemoryReliefStore {
    fn add_item(&self, resource_id: &ResourceId, item: Item) -> Result<(), StoreError> {
        let mut pools = self.pools.write().map_err(|_| Self::poisoned())?;
        pools
            .entry(resource_id.clone())
            .or_default()
            .items
            .insert(*item.id(), item);
        Ok(())
    }

    fn add_request(&self, resource_id: &ResourceId, request: Request) -> Result<(), StoreError> {
        let mut pools = self.pools.write().map_err(|_| Self::poisoned())?;
        let pool = pools.entry(resource_id.clone()).or_default();

        if pool.requests.iter().any(|r| r.id() == request.id()) {
            return Err(StoreError::Conflict(format!(
                "request {} already exists in {resource_id}",
                request.id()
            )));
        }

        pool.requests.push(request);
        Ok(())
    }

    fn fetch_inventory(
        &self,
        resource_id: &ResourceId,
        limit: Option<usize>,
    ) -> Result<Inventory, StoreError> {
        let pools = self.pools.read().map_err(|_| Self::poisoned())?;
        let items = pools
            .get(resource_id)
            .map(|pool| {
                pool.items
                    .values()
                    .take(limit.unwrap_or(usize::MAX))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Ok(Inventory::with_items(resource_id.clone(), items))
    }

    fn fetch_item(
        &self,
        resource_id: &ResourceId,
        item_id: &ItemId,
    ) -> Result<Option<Item>, StoreError> {
        let pools = self.pools.read().map_err(|_| Self::poisoned())?;
        Ok(pools
            .get(resource_id)
            .and_then(|pool| pool.items.get(item_id))
            .cloned())
    }

    fn fetch_requests(
        &self,
        resource_id: &ResourceId,
        limit: Option<usize>,
    ) -> Result<Vec<Request>, StoreError> {
        let pools = self.pools.read().map_err(|_| Self::poisoned())?;
        Ok(pools
            .get(resource_id)
            .map(|pool| {
                pool.requests
                    .iter()
                    .take(limit.unwrap_or(usize::MAX))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn fetch_pending_requests(
        &self,
        resource_id: &ResourceId,
        limit: Option<usize>,
    ) -> Result<Vec<Request>, StoreError> {
        let pools = self.pools.read().map_err(|_| Self::poisoned())?;
        Ok(pools
            .get(resource_id)
            .map(|pool| {
                pool.requests
                    .iter()
                    .filter(|r| r.is_pending())
                    .take(limit.unwrap_or(usize::MAX))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn fetch_request(
        &self,
        resource_id: &ResourceId,
        request_id: &RequestId,
    ) -> Result<Option<Request>, StoreError> {
        let pools = self.pools.read().map_err(|_| Self::poisoned())?;
        Ok(pools
            .get(resource_id)
            .and_then(|pool| pool.requests.iter().find(|r| r.request_id() == request_id))
            .cloned())
    }

    fn clear_pool(&self, resource_id: &ResourceId) -> Result<(), StoreError> {
        let mut pools = self.pools.write().map_err(|_| Self::poisoned())?;
        pools.remove(resource_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relief_requests::PriorityLevel;

    fn pool(raw: &str) -> ResourceId {
        ResourceId::new(raw).unwrap()
    }

    fn request(id: &str, item: ItemId) -> Request {
        Request::new(RequestId::new(id).unwrap(), vec![item], vec![1], PriorityLevel::Low, "x")
    }

    #[test]
    fn pools_are_isolated() {
        let store = InMemoryReliefStore::new();
        let water = Item::new("water", 3, None, "d1");
        store.add_item(&pool("a"), water.clone()).unwrap();

        assert_eq!(store.fetch_inventory(&pool("a"), None).unwrap().len(), 1);
        assert!(store.fetch_inventory(&pool("b"), None).unwrap().is_empty());
        assert_eq!(store.fetch_item(&pool("b"), &water.item_id()).unwrap(), None);
        assert_eq!(store.fetch_item(&pool("A"), &water.item_id()).unwrap(), Some(water));
    }

    #[test]
    fn requests_keep_submission_order_and_limit() {
        let store = InMemoryReliefStore::new();
        let item = ItemId::new();
        for id in ["R3", "R1", "R2"] {
            store.add_request(&pool("a"), request(id, item)).unwrap();
        }

        let all: Vec<_> = store
            .fetch_requests(&pool("a"), None)
            .unwrap()
            .into_iter()
            .map(|r| r.request_id().to_string())
            .collect();
        assert_eq!(all, vec!["R3", "R1", "R2"]);
        assert_eq!(store.fetch_requests(&pool("a"), Some(2)).unwrap().len(), 2);
    }

    #[test]
    fn pending_fetch_skips_dispatched_requests() {
        let store = InMemoryReliefStore::new();
        let item = ItemId::new();
        for id in ["R1", "R2", "R3"] {
            store.add_request(&pool("a"), request(id, item)).unwrap();
        }
        store
            .persist_request_status(&pool("a"), &RequestId::new("R1").unwrap(), RequestStatus::Dispatched)
            .unwrap();

        let pending: Vec<_> = store
            .fetch_pending_requests(&pool("a"), Some(1))
            .unwrap()
            .into_iter()
            .map(|r| r.request_id().to_string())
            .collect();
        assert_eq!(pending, vec!["R2"]);
    }

    #[test]
    fn duplicate_request_id_conflicts() {
        let store = InMemoryReliefStore::new();
        let item = ItemId::new();
        store.add_request(&pool("a"), request("R1", item)).unwrap();
        let err = store.add_request(&pool("a"), request("R1", item)).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        // Same id in another pool is fine.
        store.add_request(&pool("b"), request("R1", item)).unwrap();
    }

    #[test]
    fn inventory_limit_caps_items() {
        let store = InMemoryReliefStore::new();
        for n in 0..5 {
            store.add_item(&pool("a"), Item::new(format!("t{n}"), 1, None, "d")).unwrap();
        }
        assert_eq!(store.fetch_inventory(&pool("a"), Some(3)).unwrap().len(), 3);
    }

    #[test]
    fn persisting_is_idempotent() {
        let store = InMemoryReliefStore::new();
        let food = Item::new("food", 5, None, "d1");
        let id = food.item_id();
        store.add_item(&pool("a"), food).unwrap();
        store.add_request(&pool("a"), request("R1", id)).unwrap();

        for _ in 0..2 {
            store.persist_item_state(&pool("a"), &id, 0, ItemStatus::Dispatched).unwrap();
            store
                .persist_request_status(&pool("a"), &RequestId::new("R1").unwrap(), RequestStatus::Dispatched)
                .unwrap();
        }

        let item = store.fetch_item(&pool("a"), &id).unwrap().unwrap();
        assert_eq!(item.quantity(), 0);
        assert_eq!(item.status(), ItemStatus::Dispatched);
        let req = store.fetch_request(&pool("a"), &RequestId::new("R1").unwrap()).unwrap().unwrap();
        assert_eq!(req.status(), RequestStatus::Dispatched);
    }

    #[test]
    fn persisting_unknown_entities_is_not_found() {
        let store = InMemoryReliefStore::new();
        let err = store
            .persist_item_state(&pool("a"), &ItemId::new(), 1, ItemStatus::Available)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        let err = store
            .persist_request_status(&pool("a"), &RequestId::new("nope").unwrap(), RequestStatus::Dispatched)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn clear_pool_drops_items_and_requests() {
        let store = InMemoryReliefStore::new();
        let food = Item::new("food", 5, None, "d1");
        let id = food.item_id();
        store.add_item(&pool("a"), food).unwrap();
        store.add_request(&pool("a"), request("R1", id)).unwrap();
        store.add_item(&pool("b"), Item::new("tent", 1, None, "d2")).unwrap();

        store.clear_pool(&pool("a")).unwrap();

        assert!(store.fetch_inventory(&pool("a"), None).unwrap().is_empty());
        assert!(store.fetch_requests(&pool("a"), None).unwrap().is_empty());
        assert_eq!(store.fetch_inventory(&pool("b"), None).unwrap().len(), 1);
    }
}
