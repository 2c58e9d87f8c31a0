//! Requests domain module.
//!
//! Demands for donated items: which items, how many of each, and where the
//! request stands in its `Pending -> Dispatched` lifecycle.

pub mod request;

pub use request::{PriorityLevel, Request, RequestLine, RequestStatus};
