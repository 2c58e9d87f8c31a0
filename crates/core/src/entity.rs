//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Items and requests are entities: their quantity and status change over a
/// dispatch pass while their identifier stays fixed.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
