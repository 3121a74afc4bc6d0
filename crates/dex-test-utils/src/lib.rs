//! Testing utilities for the Pokédex workspace
//!
//! Shared fixtures and a fault-injecting store.

#![allow(missing_docs)]

use async_trait::async_trait;
use dex_core::{RecordService, ServiceConfig};
use dex_model::{
    Ability, AbilityDescriptor, AbilityId, AbilityMatch, Creature, CreatureChanges,
    CreatureRecord, CreatureView, Identity, NewAbility, NewCreature,
};
use dex_store::{DocumentStore, IdentitySource, MemoryStore, StoreError, StoreResult};
use parking_lot::Mutex;
use std::sync::Arc;

pub fn tackle() -> AbilityDescriptor {
    AbilityDescriptor::new("Tackle", "Normal", 35)
}

pub fn thunder_shock() -> AbilityDescriptor {
    AbilityDescriptor::new("Thunder Shock", "Electric", 40)
}

pub fn ember() -> AbilityDescriptor {
    AbilityDescriptor::new("Ember", "Fire", 40)
}

pub fn eevee() -> NewCreature {
    NewCreature::new("Eevee", "http://localhost:5000/uploads/eevee.png").with_ability(tackle())
}

pub fn pikachu() -> NewCreature {
    NewCreature::new("Pikachu", "http://localhost:5000/uploads/pikachu.png")
        .with_ability(thunder_shock())
        .with_ability(tackle())
}

pub fn charmander() -> NewCreature {
    NewCreature::new("Charmander", "http://localhost:5000/uploads/charmander.png")
        .with_ability(ember())
}

pub fn new_ability(name: &str, kind: &str, damage: u32) -> NewAbility {
    NewAbility {
        name: name.to_string(),
        kind: kind.to_string(),
        damage,
        status: dex_model::DEFAULT_STATUS.to_string(),
    }
}

pub fn setup_test_service() -> RecordService {
    RecordService::in_memory(ServiceConfig::new())
}

/// Service preloaded with Eevee, Pikachu and Charmander, in that order
pub async fn seeded_service(config: ServiceConfig) -> (RecordService, Vec<CreatureView>) {
    let service = RecordService::in_memory(config);
    let mut created = Vec::new();
    for creature in [eevee(), pikachu(), charmander()] {
        created.push(service.create(creature).await.unwrap());
    }
    (service, created)
}

/// Which store calls a [`FaultyStore`] rejects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Faults {
    pub creature_writes: bool,
    /// Ability inserts still allowed before they start failing
    pub ability_inserts_after: Option<usize>,
}

/// Delegates to a [`MemoryStore`] and fails the configured calls
#[derive(Debug, Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    faults: Mutex<Faults>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_creature_writes(&self, fail: bool) {
        self.faults.lock().creature_writes = fail;
    }

    pub fn fail_ability_inserts_after(&self, allowed: usize) {
        self.faults.lock().ability_inserts_after = Some(allowed);
    }

    pub fn heal(&self) {
        *self.faults.lock() = Faults::default();
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn creature_write(&self) -> StoreResult<()> {
        if self.faults.lock().creature_writes {
            return Err(StoreError::Unavailable("injected creature write failure".into()));
        }
        Ok(())
    }

    fn ability_insert(&self) -> StoreResult<()> {
        let mut faults = self.faults.lock();
        match faults.ability_inserts_after.as_mut() {
            Some(0) => Err(StoreError::Unavailable("injected ability insert failure".into())),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// Service backed by a [`FaultyStore`], returning both
pub fn faulty_service(config: ServiceConfig) -> (RecordService, Arc<FaultyStore>) {
    let store = Arc::new(FaultyStore::new());
    let service = RecordService::new(store.clone(), config);
    (service, store)
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn insert_ability(&self, ability: NewAbility) -> StoreResult<Ability> {
        self.ability_insert()?;
        self.inner.insert_ability(ability).await
    }

    async fn get_ability(&self, id: AbilityId) -> StoreResult<Option<Ability>> {
        self.inner.get_ability(id).await
    }

    async fn get_abilities(&self, ids: &[AbilityId]) -> StoreResult<Vec<Ability>> {
        self.inner.get_abilities(ids).await
    }

    async fn find_ability(
        &self,
        name: &str,
        kind: &str,
        matching: AbilityMatch,
    ) -> StoreResult<Option<Ability>> {
        self.inner.find_ability(name, kind, matching).await
    }

    async fn remove_ability(&self, id: AbilityId) -> StoreResult<bool> {
        self.inner.remove_ability(id).await
    }

    async fn ability_count(&self) -> StoreResult<usize> {
        self.inner.ability_count().await
    }

    async fn max_identity(&self) -> StoreResult<Option<Identity>> {
        self.inner.max_identity().await
    }

    async fn insert_creature(
        &self,
        record: CreatureRecord,
        source: IdentitySource,
    ) -> StoreResult<Creature> {
        self.creature_write()?;
        self.inner.insert_creature(record, source).await
    }

    async fn get_creature(&self, id: Identity) -> StoreResult<Option<Creature>> {
        self.inner.get_creature(id).await
    }

    async fn find_creature_by_name(&self, name: &str) -> StoreResult<Option<Creature>> {
        self.inner.find_creature_by_name(name).await
    }

    async fn list_creatures(&self) -> StoreResult<Vec<Creature>> {
        self.inner.list_creatures().await
    }

    async fn update_creature(
        &self,
        id: Identity,
        changes: CreatureChanges,
    ) -> StoreResult<Creature> {
        self.creature_write()?;
        self.inner.update_creature(id, changes).await
    }

    async fn delete_creature(&self, id: Identity) -> StoreResult<Option<Creature>> {
        self.creature_write()?;
        self.inner.delete_creature(id).await
    }
}
