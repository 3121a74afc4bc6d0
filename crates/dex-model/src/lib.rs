//! Pokédex data model
//!
//! Documents, client payloads and validation for the two catalog collections:
//! - [`Ability`]: named attacks, shared by reference
//! - [`Creature`]: catalog entries with a system-assigned [`Identity`] and an
//!   ordered list of [`AbilityId`] references
//!
//! Payload types ([`NewCreature`], [`CreaturePatch`], [`AbilityDescriptor`])
//! validate into write-ready values before anything reaches the store.

#![warn(unreachable_pub)]

pub mod ability;
pub mod creature;
pub mod ids;
pub mod validation;

pub use ability::{validate_all, Ability, AbilityDescriptor, AbilityMatch, NewAbility};
pub use creature::{
    name_key, Creature, CreatureChanges, CreatureDraft, CreaturePatch, CreatureRecord,
    CreatureView, NewCreature,
};
pub use ids::{AbilityId, Identity};
pub use validation::ValidationError;

/// Status given to records created without one
pub const DEFAULT_STATUS: &str = "Active";
