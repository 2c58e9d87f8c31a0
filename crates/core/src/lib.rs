//! `relief-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod admission;
pub mod entity;
pub mod error;
pub mod id;

pub use admission::Admissible;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ItemId, RequestId, ResourceId};
