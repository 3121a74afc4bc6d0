//! Field validation for incoming payloads
//!
//! Validation runs before anything is written, so a rejected payload never
//! leaves partial documents behind.

/// Malformed input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Required field missing or blank
    #[error("`{field}` is required")]
    Required {
        /// Field name as it appears on the wire
        field: &'static str,
    },

    /// Damage outside `1..=u32::MAX`
    #[error("`damage` must be at least 1 (got {damage})")]
    DamageOutOfRange {
        /// Offending value
        damage: i64,
    },

    /// One ability descriptor in a list failed validation
    #[error("ability #{index}: {source}")]
    Ability {
        /// Position in the submitted list
        index: usize,
        /// Underlying failure
        #[source]
        source: Box<ValidationError>,
    },
}

impl ValidationError {
    /// Wrap a descriptor failure with its list position
    #[inline]
    #[must_use]
    pub fn at_ability(index: usize, source: ValidationError) -> Self {
        Self::Ability {
            index,
            source: Box::new(source),
        }
    }
}

/// Require a non-blank string
pub(crate) fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(())
}

/// Fall back to the default status when absent or blank
pub(crate) fn status_or_default(status: Option<&str>) -> String {
    match status {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => crate::DEFAULT_STATUS.to_string(),
    }
}
