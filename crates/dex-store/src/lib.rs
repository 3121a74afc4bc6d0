//! Document store for the Pokédex catalog
//!
//! [`DocumentStore`] is the persistence contract used by the record service.
//! [`MemoryStore`] implements it in memory with an optional JSON snapshot file,
//! enforcing the constraints a document database would:
//! - unique creature identity
//! - unique creature name, ignoring case
//! - every ability reference resolves
//!
//! Identity assignment is offered as a store primitive ([`IdentitySource`]) so
//! that `max + 1` can be computed inside the same critical section as the
//! insert.

#![warn(unreachable_pub)]

pub mod error;
pub mod memory;
pub mod snapshot;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use snapshot::SNAPSHOT_VERSION;
pub use traits::{DocumentStore, IdentitySource};
