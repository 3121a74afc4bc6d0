//! Record service configuration

use dex_model::AbilityMatch;
use serde::{Deserialize, Serialize};

/// Identity assignment policy for new creatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityPolicy {
    /// Store computes `max + 1` inside the insert's critical section
    #[default]
    Arbitrated,
    /// Persisted counter; identities of deleted creatures are not reused
    Sequence,
    /// Read the maximum, then insert with an explicit identity
    ///
    /// Two concurrent creations can observe the same maximum; the loser is
    /// rejected by the store's identity uniqueness constraint.
    MaxScan,
}

/// How `create` persists submitted abilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateAbilities {
    /// Every descriptor becomes a new ability record
    #[default]
    Insert,
    /// Match-or-create by (name, type), same as `update`
    Reconcile,
}

/// Record service configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Identity assignment policy
    pub identity_policy: IdentityPolicy,
    /// Ability handling on create
    pub create_abilities: CreateAbilities,
    /// Ability (name, type) comparison
    pub ability_match: AbilityMatch,
}

impl ServiceConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With identity policy
    #[inline]
    #[must_use]
    pub fn with_identity_policy(mut self, policy: IdentityPolicy) -> Self {
        self.identity_policy = policy;
        self
    }

    /// With create-time ability handling
    #[inline]
    #[must_use]
    pub fn with_create_abilities(mut self, mode: CreateAbilities) -> Self {
        self.create_abilities = mode;
        self
    }

    /// With ability matching mode
    #[inline]
    #[must_use]
    pub fn with_ability_match(mut self, matching: AbilityMatch) -> Self {
        self.ability_match = matching;
        self
    }
}
