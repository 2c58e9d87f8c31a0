//! Infrastructure layer: storage, configuration and the services that drive
//! admission, dispatch passes and queries over resource pools.

pub mod admission;
pub mod config;
pub mod dispatch_service;
pub mod pool_locks;
pub mod query;
pub mod store;


pub use admission::{AdmissionError, AdmissionService, NewDonation, NewRequest};
pub use config::DispatchConfig;
pub use dispatch_service::{DispatchError, DispatchService, DispatchSummary, InfeasibleRequest};
pub use pool_locks::PoolLocks;
pub use query::{QueryError, QueryService};
pub use store::{InMemoryReliefStore, PersistenceSink, ReliefStore, StoreError};
