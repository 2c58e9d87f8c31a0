//! Allocation engine: matches pending requests against a pool's stock.
//!
//! One pass walks the requests in submission order. Each pending request is
//! either dispatched in full (every referenced item decremented by its
//! requested quantity) or left untouched; there is no partial fulfilment.
//!
//! ## Concurrency precondition
//!
//! A pass is synchronous check-then-act with no internal locking. The caller
//! must hold the inventory exclusively for the duration of the pass: two
//! concurrent passes over the same pool can both observe stock before either
//! commits and over-allocate it. Serialize passes per resource pool.

pub mod outcome;
pub mod scheduler;

pub use outcome::{DispatchPass, RequestOutcome, RequestReport, Shortfall};
pub use scheduler::Scheduler;
