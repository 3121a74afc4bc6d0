//! Error types for the record service
//!
//! Three kinds reach the API boundary:
//! - malformed input ([`ServiceError::Validation`])
//! - unknown identity or name ([`ServiceError::NotFound`])
//! - persistence failures and constraint violations ([`ServiceError::Store`])

use dex_model::{AbilityId, Identity, ValidationError};
use dex_store::StoreError;

/// Main record service error type
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Invalid payload
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// No record matches
    #[error("{message}")]
    NotFound {
        /// Human-readable description
        message: String,
    },

    /// Underlying store failure
    #[error("store error: {0}")]
    Store(StoreError),
}

impl ServiceError {
    /// No creature with this identity
    #[must_use]
    pub fn identity_not_found(id: Identity) -> Self {
        Self::NotFound {
            message: format!("No Pokémon found with id: {id}"),
        }
    }

    /// No creature with this name
    #[must_use]
    pub fn name_not_found(name: &str) -> Self {
        Self::NotFound {
            message: format!("No Pokémon found with name: {name}"),
        }
    }

    /// No ability with this key
    #[must_use]
    pub fn ability_not_found(id: AbilityId) -> Self {
        Self::NotFound {
            message: format!("No ability found with id: {id}"),
        }
    }

    /// Whether the caller asked for something that does not exist
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            // The record disappeared between lookup and write
            StoreError::CreatureNotFound(id) => Self::identity_not_found(id),
            other => Self::Store(other),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_messages() {
        assert_eq!(
            ServiceError::identity_not_found(Identity(7)).to_string(),
            "No Pokémon found with id: 7"
        );
        assert_eq!(
            ServiceError::name_not_found("missingno").to_string(),
            "No Pokémon found with name: missingno"
        );
    }

    #[test]
    fn store_race_maps_to_not_found() {
        let err: ServiceError = StoreError::CreatureNotFound(Identity(3)).into();
        assert!(err.is_not_found());

        let err: ServiceError = StoreError::Unavailable("down".into()).into();
        assert!(matches!(err, ServiceError::Store(_)));
    }

    #[test]
    fn validation_conversion() {
        let err: ServiceError = ValidationError::Required { field: "name" }.into();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(!err.is_not_found());
    }
}
