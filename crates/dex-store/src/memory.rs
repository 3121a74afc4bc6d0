//! In-memory document store
//!
//! Both collections live behind one `RwLock`, so every trait method is a
//! single critical section. The lock is released before any snapshot IO.

use crate::error::{StoreError, StoreResult};
use crate::snapshot::{self, Pending, SnapshotRef, SnapshotWriter, SNAPSHOT_VERSION};
use crate::traits::{DocumentStore, IdentitySource};
use async_trait::async_trait;
use chrono::Utc;
use dex_model::{
    name_key, Ability, AbilityId, AbilityMatch, Creature, CreatureChanges, CreatureRecord,
    Identity, NewAbility,
};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Document collections plus their secondary index
#[derive(Debug, Default)]
struct Documents {
    abilities: IndexMap<AbilityId, Ability>,
    creatures: IndexMap<Identity, Creature>,
    /// Lowercased name -> identity
    names: HashMap<String, Identity>,
    /// Last identity issued by [`IdentitySource::Sequence`]
    sequence: u64,
    /// Bumped on every mutation
    generation: u64,
}

impl Documents {
    fn from_snapshot(snapshot: snapshot::Snapshot) -> Self {
        let mut docs = Self {
            sequence: snapshot.sequence,
            ..Self::default()
        };
        for ability in snapshot.abilities {
            docs.abilities.insert(ability.id, ability);
        }
        for creature in snapshot.creatures {
            docs.names.insert(name_key(&creature.name), creature.id);
            docs.creatures.insert(creature.id, creature);
        }
        docs
    }

    fn encode(&self) -> StoreResult<String> {
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            sequence: self.sequence,
            abilities: self.abilities.values().collect(),
            creatures: self.creatures.values().collect(),
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    fn max_identity(&self) -> Option<Identity> {
        self.creatures.keys().max().copied()
    }

    fn check_name(&self, name: &str, owner: Option<Identity>) -> StoreResult<()> {
        match self.names.get(&name_key(name)) {
            Some(existing) if Some(*existing) != owner => Err(StoreError::DuplicateName {
                name: name.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn check_references(&self, ids: &[AbilityId]) -> StoreResult<()> {
        match ids.iter().find(|id| !self.abilities.contains_key(*id)) {
            Some(missing) => Err(StoreError::DanglingReference(*missing)),
            None => Ok(()),
        }
    }

    fn referencing(&self, id: AbilityId) -> Option<Identity> {
        self.creatures
            .values()
            .find(|c| c.abilities.contains(&id))
            .map(|c| c.id)
    }

    fn assign_identity(&self, source: IdentitySource) -> StoreResult<Identity> {
        let id = match source {
            IdentitySource::Explicit(id) => id,
            IdentitySource::ArbitratedMax => Identity::after(self.max_identity()),
            IdentitySource::Sequence => {
                let floor = self.max_identity().map_or(0, Identity::get);
                Identity(self.sequence.max(floor) + 1)
            }
        };
        if self.creatures.contains_key(&id) {
            return Err(StoreError::DuplicateIdentity(id));
        }
        Ok(id)
    }
}

/// Document store held in memory, optionally mirrored to a JSON file
#[derive(Debug)]
pub struct MemoryStore {
    docs: RwLock<Documents>,
    snapshot: Option<SnapshotWriter>,
}

impl MemoryStore {
    /// Empty store without persistence
    #[must_use]
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Documents::default()),
            snapshot: None,
        }
    }

    /// Load `path` if it exists and persist every mutation back to it
    ///
    /// # Errors
    /// IO failures, malformed JSON, or a snapshot version mismatch.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let loaded = snapshot::load(&path).await?;
        let docs = Documents::from_snapshot(loaded);

        tracing::info!(
            path = %path.display(),
            creatures = docs.creatures.len(),
            abilities = docs.abilities.len(),
            "catalog snapshot loaded"
        );

        Ok(Self {
            docs: RwLock::new(docs),
            snapshot: Some(SnapshotWriter::new(path)),
        })
    }

    /// Snapshot file, if persistent
    #[must_use]
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_ref().map(SnapshotWriter::path)
    }

    /// Record a mutation and encode the snapshot while still locked
    fn stage(&self, docs: &mut Documents) -> StoreResult<Option<Pending>> {
        docs.generation += 1;
        if self.snapshot.is_none() {
            return Ok(None);
        }
        Ok(Some(Pending {
            generation: docs.generation,
            body: docs.encode()?,
        }))
    }

    async fn flush(&self, pending: Option<Pending>) -> StoreResult<()> {
        match (&self.snapshot, pending) {
            (Some(writer), Some(pending)) => writer.flush(pending).await,
            _ => Ok(()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_ability(&self, ability: NewAbility) -> StoreResult<Ability> {
        let (ability, pending) = {
            let mut docs = self.docs.write();
            let ability = Ability::from_new(ability, Utc::now());
            docs.abilities.insert(ability.id, ability.clone());
            let pending = self.stage(&mut docs)?;
            (ability, pending)
        };
        self.flush(pending).await?;
        Ok(ability)
    }

    async fn get_ability(&self, id: AbilityId) -> StoreResult<Option<Ability>> {
        Ok(self.docs.read().abilities.get(&id).cloned())
    }

    async fn get_abilities(&self, ids: &[AbilityId]) -> StoreResult<Vec<Ability>> {
        let docs = self.docs.read();
        Ok(ids
            .iter()
            .filter_map(|id| docs.abilities.get(id).cloned())
            .collect())
    }

    async fn find_ability(
        &self,
        name: &str,
        kind: &str,
        matching: AbilityMatch,
    ) -> StoreResult<Option<Ability>> {
        Ok(self
            .docs
            .read()
            .abilities
            .values()
            .find(|a| matching.matches(a, name, kind))
            .cloned())
    }

    async fn remove_ability(&self, id: AbilityId) -> StoreResult<bool> {
        let (existed, pending) = {
            let mut docs = self.docs.write();
            if let Some(creature) = docs.referencing(id) {
                return Err(StoreError::AbilityInUse { id, creature });
            }
            if docs.abilities.shift_remove(&id).is_none() {
                return Ok(false);
            }
            (true, self.stage(&mut docs)?)
        };
        self.flush(pending).await?;
        Ok(existed)
    }

    async fn ability_count(&self) -> StoreResult<usize> {
        Ok(self.docs.read().abilities.len())
    }

    async fn max_identity(&self) -> StoreResult<Option<Identity>> {
        Ok(self.docs.read().max_identity())
    }

    async fn insert_creature(
        &self,
        record: CreatureRecord,
        source: IdentitySource,
    ) -> StoreResult<Creature> {
        let (creature, pending) = {
            let mut docs = self.docs.write();
            docs.check_name(&record.name, None)?;
            docs.check_references(&record.abilities)?;
            let id = docs.assign_identity(source)?;

            let creature = Creature::from_record(id, record, Utc::now());
            docs.sequence = docs.sequence.max(id.get());
            docs.names.insert(name_key(&creature.name), id);
            docs.creatures.insert(id, creature.clone());
            let pending = self.stage(&mut docs)?;
            (creature, pending)
        };
        self.flush(pending).await?;
        Ok(creature)
    }

    async fn get_creature(&self, id: Identity) -> StoreResult<Option<Creature>> {
        Ok(self.docs.read().creatures.get(&id).cloned())
    }

    async fn find_creature_by_name(&self, name: &str) -> StoreResult<Option<Creature>> {
        let docs = self.docs.read();
        Ok(docs
            .names
            .get(&name_key(name))
            .and_then(|id| docs.creatures.get(id))
            .cloned())
    }

    async fn list_creatures(&self) -> StoreResult<Vec<Creature>> {
        Ok(self.docs.read().creatures.values().cloned().collect())
    }

    async fn update_creature(
        &self,
        id: Identity,
        changes: CreatureChanges,
    ) -> StoreResult<Creature> {
        let (creature, pending) = {
            let mut docs = self.docs.write();
            let old_key = match docs.creatures.get(&id) {
                Some(existing) => name_key(&existing.name),
                None => return Err(StoreError::CreatureNotFound(id)),
            };
            if let Some(name) = &changes.name {
                docs.check_name(name, Some(id))?;
            }
            if let Some(abilities) = &changes.abilities {
                docs.check_references(abilities)?;
            }

            let Some(creature) = docs.creatures.get_mut(&id) else {
                return Err(StoreError::CreatureNotFound(id));
            };
            creature.apply(changes, Utc::now());
            let creature = creature.clone();

            docs.names.remove(&old_key);
            docs.names.insert(name_key(&creature.name), id);
            let pending = self.stage(&mut docs)?;
            (creature, pending)
        };
        self.flush(pending).await?;
        Ok(creature)
    }

    async fn delete_creature(&self, id: Identity) -> StoreResult<Option<Creature>> {
        let (removed, pending) = {
            let mut docs = self.docs.write();
            let Some(removed) = docs.creatures.shift_remove(&id) else {
                return Ok(None);
            };
            docs.names.remove(&name_key(&removed.name));
            (removed, self.stage(&mut docs)?)
        };
        self.flush(pending).await?;
        Ok(Some(removed))
    }
}
