//! Creature documents, payloads and resolved views

use crate::ability::{validate_all, Ability, AbilityDescriptor, NewAbility};
use crate::ids::{AbilityId, Identity};
use crate::validation::{required, status_or_default, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key used for case-insensitive name lookup and uniqueness
#[inline]
#[must_use]
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

/// Stored creature record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creature {
    /// System-assigned identity
    pub id: Identity,
    /// Catalog name, unique ignoring case
    pub name: String,
    /// Image URI
    pub image: String,
    /// Lifecycle status
    pub status: String,
    /// Ordered ability references
    pub abilities: Vec<AbilityId>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Creature {
    /// Materialise a record under an assigned identity
    #[must_use]
    pub fn from_record(id: Identity, record: CreatureRecord, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: record.name,
            image: record.image,
            status: record.status,
            abilities: record.abilities,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the fields present in `changes`
    pub fn apply(&mut self, changes: CreatureChanges, now: DateTime<Utc>) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(image) = changes.image {
            self.image = image;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(abilities) = changes.abilities {
            self.abilities = abilities;
        }
        self.updated_at = now;
    }

    /// Attach resolved abilities
    #[must_use]
    pub fn into_view(self, abilities: Vec<Ability>) -> CreatureView {
        CreatureView {
            id: self.id,
            name: self.name,
            image: self.image,
            status: self.status,
            abilities,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Creature with its ability references resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatureView {
    /// System-assigned identity
    pub id: Identity,
    /// Catalog name
    pub name: String,
    /// Image URI
    pub image: String,
    /// Lifecycle status
    pub status: String,
    /// Referenced abilities in stored order
    pub abilities: Vec<Ability>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl CreatureView {
    /// Ability keys in stored order
    #[must_use]
    pub fn ability_ids(&self) -> Vec<AbilityId> {
        self.abilities.iter().map(|a| a.id).collect()
    }
}

/// Create payload
///
/// Any client-supplied `id` is ignored; identities are assigned by the system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCreature {
    /// Catalog name
    #[serde(default)]
    pub name: String,
    /// Image URI
    #[serde(default)]
    pub image: String,
    /// Status, defaults to "Active"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Abilities to attach
    #[serde(default)]
    pub abilities: Vec<AbilityDescriptor>,
}

impl NewCreature {
    /// Start a payload with name and image
    #[must_use]
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            ..Self::default()
        }
    }

    /// Append an ability descriptor
    #[must_use]
    pub fn with_ability(mut self, ability: AbilityDescriptor) -> Self {
        self.abilities.push(ability);
        self
    }

    /// With explicit status
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Check required fields and every ability descriptor
    ///
    /// # Errors
    /// First validation failure found.
    pub fn validate(&self) -> Result<CreatureDraft, ValidationError> {
        required("name", &self.name)?;
        required("image", &self.image)?;
        let abilities = validate_all(&self.abilities)?;

        Ok(CreatureDraft {
            name: self.name.clone(),
            image: self.image.clone(),
            status: status_or_default(self.status.as_deref()),
            abilities,
        })
    }
}

/// Validated create payload; abilities not yet persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatureDraft {
    /// Catalog name
    pub name: String,
    /// Image URI
    pub image: String,
    /// Lifecycle status
    pub status: String,
    /// Abilities to persist before the creature
    pub abilities: Vec<NewAbility>,
}

impl CreatureDraft {
    /// Bind persisted ability keys, producing a storable record
    #[must_use]
    pub fn into_record(self, abilities: Vec<AbilityId>) -> CreatureRecord {
        CreatureRecord {
            name: self.name,
            image: self.image,
            status: self.status,
            abilities,
        }
    }
}

/// Creature fields ready for insertion, identity still unassigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatureRecord {
    /// Catalog name
    pub name: String,
    /// Image URI
    pub image: String,
    /// Lifecycle status
    pub status: String,
    /// Ability references
    pub abilities: Vec<AbilityId>,
}

/// Partial update payload
///
/// Absent fields are left untouched. Unknown keys, including `id`, are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreaturePatch {
    /// New name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New image URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// New status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Replacement ability list, reconciled against the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abilities: Option<Vec<AbilityDescriptor>>,
}

impl CreaturePatch {
    /// Replace abilities
    #[must_use]
    pub fn abilities(abilities: Vec<AbilityDescriptor>) -> Self {
        Self {
            abilities: Some(abilities),
            ..Self::default()
        }
    }

    /// Set name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set status
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Set image
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Field changes with abilities already resolved to keys
    #[must_use]
    pub fn into_changes(self, abilities: Option<Vec<AbilityId>>) -> CreatureChanges {
        CreatureChanges {
            name: self.name,
            image: self.image,
            status: self.status,
            abilities,
        }
    }
}

/// Store-level partial update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatureChanges {
    /// New name
    pub name: Option<String>,
    /// New image URI
    pub image: Option<String>,
    /// New status
    pub status: Option<String>,
    /// New ability references
    pub abilities: Option<Vec<AbilityId>>,
}
