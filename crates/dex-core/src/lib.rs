//! Pokédex record service
//!
//! Catalog operations over a [`dex_store::DocumentStore`]:
//! - identity assignment for new creatures (`max + 1`, per [`IdentityPolicy`])
//! - match-or-create reconciliation of abilities by (name, type)
//! - list, lookup, create, update and cascade-free delete
//!
//! # Example
//!
//! ```rust,ignore
//! use dex_core::prelude::*;
//!
//! # async fn example() -> Result<(), ServiceError> {
//! let service = RecordService::in_memory(ServiceConfig::new());
//!
//! let eevee = NewCreature::new("Eevee", "http://img/eevee.png")
//!     .with_ability(AbilityDescriptor::new("Tackle", "Normal", 35));
//! let created = service.create(eevee).await?;
//!
//! assert_eq!(service.get_by_name("eevee").await?.id, created.id);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
mod identity;
pub mod reconcile;
pub mod service;

pub use config::{CreateAbilities, IdentityPolicy, ServiceConfig};
pub use error::{ServiceError, ServiceResult};
pub use reconcile::{AbilityResolution, Reconciler};
pub use service::{DeletedCreature, RecordService};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the record service
    pub use crate::{
        CreateAbilities, DeletedCreature, IdentityPolicy, RecordService, ServiceConfig,
        ServiceError, ServiceResult,
    };
    pub use dex_model::{
        AbilityDescriptor, AbilityMatch, CreaturePatch, CreatureView, Identity, NewCreature,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
