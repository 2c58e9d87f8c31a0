//! Admission contract shared by items and requests.

use crate::error::{DomainError, DomainResult};

/// An entity that must pass validation before it may enter a resource pool.
///
/// `validate` answers the yes/no question; `violations` explains a `false`
/// answer. `admit` is the boundary check: it hands the entity back unchanged
/// or rejects it with [`DomainError::InvalidEntity`], never coercing it.
pub trait Admissible: Sized {
    /// Human-readable entity kind used in rejection messages.
    const KIND: &'static str;

    /// Every reason this entity is not admissible (empty when valid).
    fn violations(&self) -> Vec<String>;

    fn validate(&self) -> bool {
        self.violations().is_empty()
    }

    fn admit(self) -> DomainResult<Self> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(self)
        } else {
            Err(DomainError::invalid_entity(format!(
                "{}: {}",
                Self::KIND,
                violations.join("; ")
            )))
        }
    }
}
