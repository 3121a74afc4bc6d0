//! Ability reconciliation
//!
//! Turns an ordered list of validated abilities into store keys. In
//! match-or-create mode an existing ability with the same (name, type) is
//! reused as-is: its stored damage and status are left alone even if the
//! submitted values differ. Descriptors are processed one at a time, so a
//! pair repeated within one payload resolves to a single record.
//!
//! Abilities created during a run are tracked so the caller can remove them
//! if the creature write that follows fails.

use crate::error::ServiceResult;
use dex_model::{AbilityId, AbilityMatch, NewAbility};
use dex_store::{DocumentStore, StoreError, StoreResult};

/// Outcome of resolving a list of abilities
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbilityResolution {
    /// Keys in submitted order
    pub ids: Vec<AbilityId>,
    /// Keys of records created by this run
    pub created: Vec<AbilityId>,
}

impl AbilityResolution {
    /// Number of submitted abilities that matched an existing record
    #[must_use]
    pub fn reused(&self) -> usize {
        self.ids.len() - self.created.len()
    }
}

/// Resolves ability lists against one store
#[derive(Clone, Copy)]
pub struct Reconciler<'a> {
    store: &'a dyn DocumentStore,
    matching: AbilityMatch,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler using `matching` for lookups
    #[inline]
    #[must_use]
    pub fn new(store: &'a dyn DocumentStore, matching: AbilityMatch) -> Self {
        Self { store, matching }
    }

    /// Match-or-create every ability, in order
    ///
    /// # Errors
    /// The first store failure. Records created before it are removed again.
    pub async fn reconcile(
        &self,
        abilities: Vec<NewAbility>,
    ) -> ServiceResult<AbilityResolution> {
        let mut resolution = AbilityResolution::default();

        for ability in abilities {
            match self.match_or_create(ability, &mut resolution).await {
                Ok(id) => resolution.ids.push(id),
                Err(e) => {
                    self.rollback(&resolution.created).await;
                    return Err(e.into());
                }
            }
        }

        tracing::debug!(
            total = resolution.ids.len(),
            created = resolution.created.len(),
            reused = resolution.reused(),
            "abilities reconciled"
        );
        Ok(resolution)
    }

    /// Insert every ability as a new record, never reusing
    ///
    /// # Errors
    /// The first store failure. Records created before it are removed again.
    pub async fn insert_all(
        &self,
        abilities: Vec<NewAbility>,
    ) -> ServiceResult<AbilityResolution> {
        let mut resolution = AbilityResolution::default();

        for ability in abilities {
            match self.store.insert_ability(ability).await {
                Ok(stored) => {
                    resolution.ids.push(stored.id);
                    resolution.created.push(stored.id);
                }
                Err(e) => {
                    self.rollback(&resolution.created).await;
                    return Err(e.into());
                }
            }
        }
        Ok(resolution)
    }

    /// Remove records created by an aborted operation
    ///
    /// Best effort: failures are logged, since the caller is already
    /// reporting the error that triggered the rollback. A record another
    /// creature has started referencing in the meantime is kept.
    pub async fn rollback(&self, created: &[AbilityId]) {
        if created.is_empty() {
            return;
        }
        tracing::warn!(
            count = created.len(),
            "rolling back abilities created by failed write"
        );
        for id in created {
            match self.store.remove_ability(*id).await {
                Ok(_) => {}
                Err(StoreError::AbilityInUse { creature, .. }) => {
                    tracing::info!(ability = %id, %creature, "ability adopted elsewhere, kept");
                }
                Err(e) => tracing::error!(ability = %id, "ability rollback failed: {}", e),
            }
        }
    }

    async fn match_or_create(
        &self,
        ability: NewAbility,
        resolution: &mut AbilityResolution,
    ) -> StoreResult<AbilityId> {
        if let Some(existing) = self
            .store
            .find_ability(&ability.name, &ability.kind, self.matching)
            .await?
        {
            tracing::debug!(ability = %existing.id, name = %existing.name, "reusing ability");
            return Ok(existing.id);
        }

        let stored = self.store.insert_ability(ability).await?;
        tracing::debug!(ability = %stored.id, name = %stored.name, "created ability");
        resolution.created.push(stored.id);
        Ok(stored.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dex_store::MemoryStore;

    fn ability(name: &str, kind: &str, damage: u32) -> NewAbility {
        NewAbility {
            name: name.into(),
            kind: kind.into(),
            damage,
            status: "Active".into(),
        }
    }

    #[tokio::test]
    async fn reuses_existing_without_overwriting() {
        let store = MemoryStore::new();
        let stored = store.insert_ability(ability("Tackle", "Normal", 35)).await.unwrap();
        let reconciler = Reconciler::new(&store, AbilityMatch::Exact);

        let resolution = reconciler
            .reconcile(vec![ability("Tackle", "Normal", 999)])
            .await
            .unwrap();

        assert_eq!(resolution.ids, vec![stored.id]);
        assert!(resolution.created.is_empty());
        let after = store.get_ability(stored.id).await.unwrap().unwrap();
        assert_eq!(after.damage, 35);
    }

    #[tokio::test]
    async fn creates_missing_pairs_in_order() {
        let store = MemoryStore::new();
        let tackle = store.insert_ability(ability("Tackle", "Normal", 35)).await.unwrap();
        let reconciler = Reconciler::new(&store, AbilityMatch::Exact);

        let resolution = reconciler
            .reconcile(vec![
                ability("Thunder Shock", "Electric", 40),
                ability("Tackle", "Normal", 35),
            ])
            .await
            .unwrap();

        assert_eq!(resolution.ids.len(), 2);
        assert_eq!(resolution.ids[1], tackle.id);
        assert_eq!(resolution.created, vec![resolution.ids[0]]);
        assert_eq!(resolution.reused(), 1);
        assert_eq!(store.ability_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn same_name_different_type_is_distinct() {
        let store = MemoryStore::new();
        store.insert_ability(ability("Bite", "Normal", 60)).await.unwrap();
        let reconciler = Reconciler::new(&store, AbilityMatch::Exact);

        let resolution = reconciler
            .reconcile(vec![ability("Bite", "Dark", 60)])
            .await
            .unwrap();
        assert_eq!(resolution.created.len(), 1);
    }

    #[tokio::test]
    async fn repeated_pair_in_one_payload_resolves_once() {
        let store = MemoryStore::new();
        let reconciler = Reconciler::new(&store, AbilityMatch::Exact);

        let resolution = reconciler
            .reconcile(vec![ability("Ember", "Fire", 40), ability("Ember", "Fire", 40)])
            .await
            .unwrap();

        assert_eq!(resolution.ids[0], resolution.ids[1]);
        assert_eq!(store.ability_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn case_sensitivity_follows_match_mode() {
        let store = MemoryStore::new();
        let stored = store.insert_ability(ability("Tackle", "Normal", 35)).await.unwrap();

        let exact = Reconciler::new(&store, AbilityMatch::Exact)
            .reconcile(vec![ability("tackle", "normal", 35)])
            .await
            .unwrap();
        assert_eq!(exact.created.len(), 1);

        let folded = Reconciler::new(&store, AbilityMatch::IgnoreCase)
            .reconcile(vec![ability("TACKLE", "NORMAL", 35)])
            .await
            .unwrap();
        assert_eq!(folded.ids, vec![stored.id]);
    }

    #[tokio::test]
    async fn insert_all_never_reuses() {
        let store = MemoryStore::new();
        let reconciler = Reconciler::new(&store, AbilityMatch::Exact);

        let first = reconciler.insert_all(vec![ability("Tackle", "Normal", 35)]).await.unwrap();
        let second = reconciler.insert_all(vec![ability("Tackle", "Normal", 35)]).await.unwrap();

        assert_ne!(first.ids, second.ids);
        assert_eq!(store.ability_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn rollback_removes_created() {
        let store = MemoryStore::new();
        let reconciler = Reconciler::new(&store, AbilityMatch::Exact);
        let resolution = reconciler
            .insert_all(vec![ability("Tackle", "Normal", 35), ability("Growl", "Normal", 1)])
            .await
            .unwrap();

        reconciler.rollback(&resolution.created).await;
        assert_eq!(store.ability_count().await.unwrap(), 0);
    }
}
