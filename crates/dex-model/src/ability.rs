//! Ability documents and descriptors

use crate::ids::AbilityId;
use crate::validation::{required, status_or_default, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored ability record
///
/// Shared by reference between creatures; never owned by one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    /// Store-assigned key
    pub id: AbilityId,
    /// Display name, e.g. "Thunder Shock"
    pub name: String,
    /// Damage category, e.g. "Electric"
    #[serde(rename = "type")]
    pub kind: String,
    /// Base damage, at least 1
    pub damage: u32,
    /// Lifecycle status
    pub status: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Ability {
    /// Materialise a validated ability under a fresh key
    #[must_use]
    pub fn from_new(new: NewAbility, now: DateTime<Utc>) -> Self {
        Self {
            id: AbilityId::new(),
            name: new.name,
            kind: new.kind,
            damage: new.damage,
            status: new.status,
            created_at: now,
            updated_at: now,
        }
    }
}

/// How ability lookups compare (name, type) pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityMatch {
    /// Byte-for-byte equality on both fields
    #[default]
    Exact,
    /// Unicode lowercase comparison on both fields
    IgnoreCase,
}

impl AbilityMatch {
    /// Whether a stored ability matches the requested pair
    #[must_use]
    pub fn matches(self, ability: &Ability, name: &str, kind: &str) -> bool {
        match self {
            Self::Exact => ability.name == name && ability.kind == kind,
            Self::IgnoreCase => {
                ability.name.to_lowercase() == name.to_lowercase()
                    && ability.kind.to_lowercase() == kind.to_lowercase()
            }
        }
    }
}

/// Ability as submitted by a client
///
/// Missing fields deserialize to blanks so they surface as validation errors
/// instead of body parse failures. The legacy `ability` key is accepted for
/// `name`; extra keys (`id`, `masterId`, timestamps) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityDescriptor {
    /// Display name
    #[serde(default, alias = "ability")]
    pub name: String,
    /// Damage category
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Requested damage
    #[serde(default)]
    pub damage: Option<i64>,
    /// Requested status, defaults to "Active"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl AbilityDescriptor {
    /// Shorthand constructor
    #[must_use]
    pub fn new(name: impl Into<String>, kind: impl Into<String>, damage: i64) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            damage: Some(damage),
            status: None,
        }
    }

    /// With explicit status
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Check required fields and the damage floor
    ///
    /// # Errors
    /// [`ValidationError::Required`] for blank name/type or absent damage,
    /// [`ValidationError::DamageOutOfRange`] for damage below 1.
    pub fn validate(&self) -> Result<NewAbility, ValidationError> {
        required("name", &self.name)?;
        required("type", &self.kind)?;
        let raw = self.damage.ok_or(ValidationError::Required { field: "damage" })?;
        let damage = u32::try_from(raw)
            .ok()
            .filter(|d| *d >= 1)
            .ok_or(ValidationError::DamageOutOfRange { damage: raw })?;

        Ok(NewAbility {
            name: self.name.clone(),
            kind: self.kind.clone(),
            damage,
            status: status_or_default(self.status.as_deref()),
        })
    }
}

/// Validate a list of descriptors, all or nothing
///
/// # Errors
/// The first failing descriptor, tagged with its position.
pub fn validate_all(descriptors: &[AbilityDescriptor]) -> Result<Vec<NewAbility>, ValidationError> {
    descriptors
        .iter()
        .enumerate()
        .map(|(i, d)| d.validate().map_err(|e| ValidationError::at_ability(i, e)))
        .collect()
}

/// Validated ability awaiting a store key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAbility {
    /// Display name
    pub name: String,
    /// Damage category
    pub kind: String,
    /// Base damage, at least 1
    pub damage: u32,
    /// Lifecycle status
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_accepts_legacy_key() {
        let d: AbilityDescriptor = serde_json::from_str(
            r#"{"ability":"Tackle","type":"Normal","damage":35,"masterId":1}"#,
        )
        .unwrap();
        assert_eq!(d.name, "Tackle");
        assert_eq!(d.kind, "Normal");
        assert_eq!(d.damage, Some(35));
    }

    #[test]
    fn validate_fills_default_status() {
        let new = AbilityDescriptor::new("Tackle", "Normal", 35).validate().unwrap();
        assert_eq!(new.status, "Active");
        assert_eq!(new.damage, 35);
    }

    #[test]
    fn validate_rejects_low_damage() {
        for damage in [0, -5] {
            let err = AbilityDescriptor::new("Tackle", "Normal", damage)
                .validate()
                .unwrap_err();
            assert_eq!(err, ValidationError::DamageOutOfRange { damage });
        }
    }

    #[test]
    fn validate_rejects_missing_fields() {
        let err = AbilityDescriptor::new("", "Normal", 10).validate().unwrap_err();
        assert_eq!(err, ValidationError::Required { field: "name" });

        let err = AbilityDescriptor::new("Tackle", " ", 10).validate().unwrap_err();
        assert_eq!(err, ValidationError::Required { field: "type" });

        let d: AbilityDescriptor =
            serde_json::from_str(r#"{"name":"Tackle","type":"Normal"}"#).unwrap();
        assert_eq!(d.validate().unwrap_err(), ValidationError::Required { field: "damage" });
    }

    #[test]
    fn validate_all_reports_position() {
        let list = vec![
            AbilityDescriptor::new("Tackle", "Normal", 35),
            AbilityDescriptor::new("Growl", "Normal", 0),
        ];
        let err = validate_all(&list).unwrap_err();
        assert!(matches!(err, ValidationError::Ability { index: 1, .. }));
    }

    #[test]
    fn match_modes() {
        let ability = Ability::from_new(
            AbilityDescriptor::new("Thunder Shock", "Electric", 40).validate().unwrap(),
            Utc::now(),
        );
        assert!(AbilityMatch::Exact.matches(&ability, "Thunder Shock", "Electric"));
        assert!(!AbilityMatch::Exact.matches(&ability, "thunder shock", "electric"));
        assert!(AbilityMatch::IgnoreCase.matches(&ability, "thunder shock", "ELECTRIC"));
    }

    proptest::proptest! {
        #[test]
        fn prop_damage_floor(damage in -1_000i64..1_000) {
            let result = AbilityDescriptor::new("Tackle", "Normal", damage).validate();
            proptest::prop_assert_eq!(result.is_ok(), damage >= 1);
        }
    }

    #[test]
    fn ability_wire_shape() {
        let ability = Ability::from_new(
            AbilityDescriptor::new("Tackle", "Normal", 35).validate().unwrap(),
            Utc::now(),
        );
        let value = serde_json::to_value(&ability).unwrap();
        assert_eq!(value["type"], "Normal");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("kind").is_none());
    }
}
