//! Identity assignment for new creatures
//!
//! The next identity is `max(existing) + 1`, or 1 for an empty catalog.
//! How that maximum is observed depends on [`IdentityPolicy`].

use crate::config::IdentityPolicy;
use crate::error::ServiceResult;
use dex_model::Identity;
use dex_store::{DocumentStore, IdentitySource};

/// Translate the policy into the store primitive to insert with
///
/// Only [`IdentityPolicy::MaxScan`] touches the store here; the other
/// policies defer the decision to the insert itself.
pub(crate) async fn identity_source(
    store: &dyn DocumentStore,
    policy: IdentityPolicy,
) -> ServiceResult<IdentitySource> {
    Ok(match policy {
        IdentityPolicy::Arbitrated => IdentitySource::ArbitratedMax,
        IdentityPolicy::Sequence => IdentitySource::Sequence,
        IdentityPolicy::MaxScan => {
            let max = store.max_identity().await?;
            let next = Identity::after(max);
            tracing::debug!(?max, %next, "identity derived from max scan");
            IdentitySource::Explicit(next)
        }
    })
}
