//! Storage boundary for resource pools.
//!
//! The allocation engine never touches storage. This module defines what the
//! surrounding layers need from a store (loading a pool, recording admitted
//! entities, persisting the outcome of a pass) without assuming a technology.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryReliefStore;
pub use r#trait::{PersistenceSink, ReliefStore, StoreError};
