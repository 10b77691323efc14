//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Entities built in memory have no identifier until the persistence
/// collaborator assigns one, so `id()` hands back the nullable typed handle.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;

    /// Returns a copy of this entity carrying the identifier assigned on insert.
    fn with_id(self, id: Self::Id) -> Self;
}
