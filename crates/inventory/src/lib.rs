//! Inventory domain module.
//!
//! Donated items and the per-pool inventory that holds them, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage).

pub mod inventory;
pub mod item;

pub use inventory::Inventory;
pub use item::{Item, ItemStatus};
