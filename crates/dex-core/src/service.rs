//! Record service
//!
//! The catalog operations exposed to the API layer. Each call is an
//! independent unit of work against the shared [`DocumentStore`].

use crate::config::{CreateAbilities, ServiceConfig};
use crate::error::{ServiceError, ServiceResult};
use crate::identity::identity_source;
use crate::reconcile::{AbilityResolution, Reconciler};
use dex_model::{
    validate_all, Ability, AbilityId, Creature, CreaturePatch, CreatureView, Identity, NewAbility,
    NewCreature,
};
use dex_store::{DocumentStore, MemoryStore, StoreError};
use std::fmt;
use std::sync::Arc;

/// Summary of a removed creature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedCreature {
    /// Identity the creature had
    pub identity: Identity,
    /// Name the creature had
    pub name: String,
}

impl fmt::Display for DeletedCreature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deleted Pokémon: {}", self.name)
    }
}

/// Catalog operations over a document store
///
/// Cheap to clone; clones share the store.
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn DocumentStore>,
    config: ServiceConfig,
}

impl fmt::Debug for RecordService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RecordService {
    /// Create a service over `store`
    #[inline]
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, config: ServiceConfig) -> Self {
        Self { store, config }
    }

    /// Service over a fresh memory-only store
    #[must_use]
    pub fn in_memory(config: ServiceConfig) -> Self {
        Self::new(Arc::new(MemoryStore::new()), config)
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Names of all creatures in insertion order
    ///
    /// # Errors
    /// Store failure.
    pub async fn list_names(&self) -> ServiceResult<Vec<String>> {
        let creatures = self.store.list_creatures().await?;
        Ok(creatures.into_iter().map(|c| c.name).collect())
    }

    /// All creatures with abilities resolved, in insertion order
    ///
    /// # Errors
    /// Store failure.
    pub async fn list_all(&self) -> ServiceResult<Vec<CreatureView>> {
        let creatures = self.store.list_creatures().await?;
        let mut views = Vec::with_capacity(creatures.len());
        for creature in creatures {
            views.push(self.resolve(creature).await?);
        }
        Ok(views)
    }

    /// Look up a creature by name, ignoring case
    ///
    /// # Errors
    /// [`ServiceError::NotFound`] when no creature has that name.
    pub async fn get_by_name(&self, name: &str) -> ServiceResult<CreatureView> {
        match self.store.find_creature_by_name(name).await? {
            Some(creature) => self.resolve(creature).await,
            None => {
                tracing::warn!(name, "creature not found");
                Err(ServiceError::name_not_found(name))
            }
        }
    }

    /// Look up a creature by identity
    ///
    /// # Errors
    /// [`ServiceError::NotFound`] when the identity is unknown.
    pub async fn get_by_identity(&self, id: Identity) -> ServiceResult<CreatureView> {
        let creature = self.require(id).await?;
        self.resolve(creature).await
    }

    /// Look up a single ability
    ///
    /// # Errors
    /// [`ServiceError::NotFound`] when the key is unknown.
    pub async fn get_ability(&self, id: AbilityId) -> ServiceResult<Ability> {
        self.store
            .get_ability(id)
            .await?
            .ok_or_else(|| ServiceError::ability_not_found(id))
    }

    /// Create a creature and the abilities it carries
    ///
    /// Abilities are persisted first. If the creature insert is rejected,
    /// abilities created by this call are removed again.
    ///
    /// # Errors
    /// Validation failure before any write, or the store's rejection.
    pub async fn create(&self, new: NewCreature) -> ServiceResult<CreatureView> {
        let mut draft = new.validate()?;
        let abilities = std::mem::take(&mut draft.abilities);
        let resolution = self.persist_for_create(abilities).await?;

        let source = match identity_source(self.store.as_ref(), self.config.identity_policy).await {
            Ok(source) => source,
            Err(e) => {
                self.reconciler().rollback(&resolution.created).await;
                return Err(e);
            }
        };

        let record = draft.into_record(resolution.ids.clone());
        let creature = match self.store.insert_creature(record, source).await {
            Ok(creature) => creature,
            Err(e) => {
                tracing::error!("Failed to create creature: {}", e);
                self.compensate(&e, &resolution.created).await;
                return Err(e.into());
            }
        };

        tracing::info!(
            id = %creature.id,
            name = %creature.name,
            abilities = creature.abilities.len(),
            "creature created"
        );
        self.resolve(creature).await
    }

    /// Apply a partial update
    ///
    /// A present `abilities` list is reconciled against the store and replaces
    /// the creature's references. Every descriptor is validated before any
    /// write. Other present fields overwrite the stored ones.
    ///
    /// # Errors
    /// [`ServiceError::NotFound`] for an unknown identity, validation failure,
    /// or the store's rejection. On rejection of the creature write, abilities
    /// created by this call are removed again.
    pub async fn update(
        &self,
        id: Identity,
        mut patch: CreaturePatch,
    ) -> ServiceResult<CreatureView> {
        self.require(id).await?;

        let descriptors = patch.abilities.take();
        let resolution = match descriptors {
            Some(descriptors) => {
                let abilities = validate_all(&descriptors)?;
                Some(self.reconciler().reconcile(abilities).await?)
            }
            None => None,
        };

        let (ids, created) = match resolution {
            Some(AbilityResolution { ids, created }) => (Some(ids), created),
            None => (None, Vec::new()),
        };

        let changes = patch.into_changes(ids);
        let creature = match self.store.update_creature(id, changes).await {
            Ok(creature) => creature,
            Err(e) => {
                tracing::error!(%id, "Failed to update creature: {}", e);
                self.compensate(&e, &created).await;
                return Err(e.into());
            }
        };

        tracing::info!(%id, created = created.len(), "creature updated");
        self.resolve(creature).await
    }

    /// Remove a creature record
    ///
    /// Referenced abilities stay in the store.
    ///
    /// # Errors
    /// [`ServiceError::NotFound`] for an unknown identity, or store failure.
    pub async fn delete(&self, id: Identity) -> ServiceResult<DeletedCreature> {
        match self.store.delete_creature(id).await? {
            Some(removed) => {
                tracing::info!(%id, name = %removed.name, "creature deleted");
                Ok(DeletedCreature {
                    identity: removed.id,
                    name: removed.name,
                })
            }
            None => {
                tracing::warn!(%id, "delete of unknown creature");
                Err(ServiceError::identity_not_found(id))
            }
        }
    }

    /// Undo ability inserts after a rejected creature write
    async fn compensate(&self, err: &StoreError, created: &[AbilityId]) {
        if err.is_persistence() {
            // The creature write is live in memory and may reference them
            tracing::error!(
                count = created.len(),
                "snapshot failed after write; keeping abilities"
            );
            return;
        }
        self.reconciler().rollback(created).await;
    }

    fn reconciler(&self) -> Reconciler<'_> {
        Reconciler::new(self.store.as_ref(), self.config.ability_match)
    }

    async fn persist_for_create(
        &self,
        abilities: Vec<NewAbility>,
    ) -> ServiceResult<AbilityResolution> {
        let reconciler = self.reconciler();
        match self.config.create_abilities {
            CreateAbilities::Insert => reconciler.insert_all(abilities).await,
            CreateAbilities::Reconcile => reconciler.reconcile(abilities).await,
        }
    }

    async fn require(&self, id: Identity) -> ServiceResult<Creature> {
        match self.store.get_creature(id).await? {
            Some(creature) => Ok(creature),
            None => {
                tracing::warn!(%id, "creature not found");
                Err(ServiceError::identity_not_found(id))
            }
        }
    }

    async fn resolve(&self, creature: Creature) -> ServiceResult<CreatureView> {
        let abilities = self.store.get_abilities(&creature.abilities).await?;
        Ok(creature.into_view(abilities))
    }
}
