//! Store error types

use dex_model::{AbilityId, Identity};

/// Persistence failure or constraint violation
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Identity uniqueness constraint
    #[error("duplicate identity: {0}")]
    DuplicateIdentity(Identity),

    /// Case-insensitive name uniqueness constraint
    #[error("duplicate name: {name}")]
    DuplicateName {
        /// Name as submitted
        name: String,
    },

    /// Creature would reference an ability that does not exist
    #[error("dangling ability reference: {0}")]
    DanglingReference(AbilityId),

    /// Ability is still referenced and cannot be removed
    #[error("ability {id} is referenced by creature {creature}")]
    AbilityInUse {
        /// Ability that was to be removed
        id: AbilityId,
        /// First creature found referencing it
        creature: Identity,
    },

    /// Creature vanished between lookup and write
    #[error("creature not found: {0}")]
    CreatureNotFound(Identity),

    /// Snapshot file IO
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot encoding
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Snapshot written by an incompatible version
    #[error("snapshot version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Version this build writes
        expected: u32,
        /// Version found on disk
        found: u32,
    },

    /// Backend cannot serve requests
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether this is a uniqueness or reference constraint
    #[inline]
    #[must_use]
    pub fn is_constraint(&self) -> bool {
        matches!(
            self,
            Self::DuplicateIdentity(_)
                | Self::DuplicateName { .. }
                | Self::DanglingReference(_)
                | Self::AbilityInUse { .. }
        )
    }

    /// Whether only the durable copy failed
    ///
    /// The in-memory documents may already reflect the write.
    #[inline]
    #[must_use]
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Serialization(_))
    }
}

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_classification() {
        assert!(StoreError::DuplicateIdentity(Identity(1)).is_constraint());
        assert!(StoreError::DuplicateName {
            name: "Eevee".into()
        }
        .is_constraint());
        assert!(!StoreError::Unavailable("down".into()).is_constraint());
        assert!(StoreError::AbilityInUse {
            id: AbilityId::new(),
            creature: Identity(1)
        }
        .is_constraint());
        assert!(StoreError::Io(std::io::Error::other("disk")).is_persistence());
        assert!(!StoreError::Unavailable("down".into()).is_persistence());
    }

    #[test]
    fn display_names_the_record() {
        let err = StoreError::DuplicateName {
            name: "Eevee".into(),
        };
        assert_eq!(err.to_string(), "duplicate name: Eevee");
    }
}
