use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use relief_core::{DomainError, DomainResult, Entity, ItemId, ResourceId};

use crate::item::{Item, ItemStatus};

/// The items of one resource pool, keyed by item id.
///
/// A plain container: it does not enforce allocation rules. The only lifecycle
/// mutation it performs itself is [`Inventory::withdraw`], which the scheduler
/// uses to commit a dispatch. Iteration order is stable (by item id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    resource_id: ResourceId,
    items: BTreeMap<ItemId, Item>,
}

impl Inventory {
    pub fn new(resource_id: ResourceId) -> Self {
        Self {
            resource_id,
            items: BTreeMap::new(),
        }
    }

    pub fn with_items(resource_id: ResourceId, items: impl IntoIterator<Item = Item>) -> Self {
        let mut inventory = Self::new(resource_id);
        for item in items {
            inventory.add_item(item);
        }
        inventory
    }

    pub fn resource_id(&self) -> &ResourceId {
        &self.resource_id
    }

    /// Insert an item under its own id, returning any item it replaced.
    pub fn add_item(&mut self, item: Item) -> Option<Item> {
        self.items.insert(*item.id(), item)
    }

    pub fn remove_item(&mut self, item_id: &ItemId) -> DomainResult<Item> {
        self.items.remove(item_id).ok_or_else(DomainError::not_found)
    }

    pub fn get_item(&self, item_id: &ItemId) -> DomainResult<&Item> {
        self.items.get(item_id).ok_or_else(DomainError::not_found)
    }

    pub fn contains(&self, item_id: &ItemId) -> bool {
        self.items.contains_key(item_id)
    }

    /// Units currently held for `item_id`, `None` if the pool has no such item.
    pub fn quantity_of(&self, item_id: &ItemId) -> Option<u32> {
        self.items.get(item_id).map(Item::quantity)
    }

    pub fn list_by_status(&self, status: ItemStatus) -> Vec<&Item> {
        self.items.values().filter(|i| i.status() == status).collect()
    }

    pub fn list_available(&self) -> Vec<&Item> {
        self.list_by_status(ItemStatus::Available)
    }

    pub fn list_dispatched(&self) -> Vec<&Item> {
        self.list_by_status(ItemStatus::Dispatched)
    }

    pub fn list_by_donor(&self, donor_id: &str) -> Vec<&Item> {
        self.items.values().filter(|i| i.donor_id() == donor_id).collect()
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Commit a dispatch of `quantity` units from one item.
    ///
    /// Returns the item in its post-withdrawal state. Fails with `NotFound` for an
    /// unknown id, or with a precondition violation when the item cannot cover
    /// `quantity` (callers are expected to have checked feasibility first).
    pub fn withdraw(&mut self, item_id: &ItemId, quantity: u32) -> DomainResult<&Item> {
        let item = self.items.get_mut(item_id).ok_or_else(DomainError::not_found)?;
        item.withdraw(quantity)?;
        Ok(item)
    }
}

impl core::fmt::Display for Inventory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for item in self.items.values() {
            writeln!(
                f,
                "{} {}: {} x{} ({}, donor {})",
                self.resource_id,
                item.item_id(),
                item.item_type(),
                item.quantity(),
                item.status(),
                item.donor_id()
            )?;
        }
        Ok(())
    }
}
