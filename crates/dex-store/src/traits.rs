//! Document store contract

use crate::error::StoreResult;
use async_trait::async_trait;
use dex_model::{
    Ability, AbilityId, AbilityMatch, Creature, CreatureChanges, CreatureRecord, Identity,
    NewAbility,
};

/// How the store picks the identity of an inserted creature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    /// Caller already chose; rejected if taken
    Explicit(Identity),
    /// `max + 1` computed under the same write lock as the insert
    ArbitratedMax,
    /// Persisted monotonic counter; identities are never reused
    Sequence,
}

/// Persistence for both catalog collections
///
/// Every method is one atomic unit at the store level. Nothing spans calls.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Persist a validated ability under a fresh key
    async fn insert_ability(&self, ability: NewAbility) -> StoreResult<Ability>;

    /// Fetch one ability
    async fn get_ability(&self, id: AbilityId) -> StoreResult<Option<Ability>>;

    /// Fetch several abilities in the given order, skipping unknown keys
    async fn get_abilities(&self, ids: &[AbilityId]) -> StoreResult<Vec<Ability>>;

    /// First ability matching the (name, type) pair
    async fn find_ability(
        &self,
        name: &str,
        kind: &str,
        matching: AbilityMatch,
    ) -> StoreResult<Option<Ability>>;

    /// Remove an ability; returns whether it existed
    ///
    /// Only used to compensate a failed write sequence. Creature deletion
    /// never cascades here.
    ///
    /// # Errors
    /// [`StoreError::AbilityInUse`](crate::StoreError::AbilityInUse) while any
    /// creature references the ability.
    async fn remove_ability(&self, id: AbilityId) -> StoreResult<bool>;

    /// Number of stored abilities
    async fn ability_count(&self) -> StoreResult<usize>;

    /// Highest identity currently present
    async fn max_identity(&self) -> StoreResult<Option<Identity>>;

    /// Insert a creature, assigning its identity from `source`
    ///
    /// Enforces identity and case-insensitive name uniqueness and requires
    /// every ability reference to resolve.
    async fn insert_creature(
        &self,
        record: CreatureRecord,
        source: IdentitySource,
    ) -> StoreResult<Creature>;

    /// Fetch by identity
    async fn get_creature(&self, id: Identity) -> StoreResult<Option<Creature>>;

    /// Fetch by name, ignoring case
    async fn find_creature_by_name(&self, name: &str) -> StoreResult<Option<Creature>>;

    /// All creatures in insertion order
    async fn list_creatures(&self) -> StoreResult<Vec<Creature>>;

    /// Apply a partial update in one step and return the new record
    async fn update_creature(&self, id: Identity, changes: CreatureChanges)
        -> StoreResult<Creature>;

    /// Remove a creature record only; returns it if it existed
    async fn delete_creature(&self, id: Identity) -> StoreResult<Option<Creature>>;
}
