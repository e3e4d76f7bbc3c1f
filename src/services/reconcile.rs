//! Identity reconciliation
//!
//! Every verification path funnels through `Reconciler::reconcile`, which
//! brings the users table in line with the provider identity exactly once:
//! unknown identities are inserted, unverified records are promoted, and
//! already verified records are left untouched.
use std::sync::Arc;

use tracing::info;

use crate::error::{AccountError, Result};
use crate::models::{Identity, NewUserRecord, UserPatch};
use crate::store::UserStore;

/// What the reconciliation did to the users table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No record existed; one was inserted
    Created,
    /// The record was already verified; nothing was written
    AlreadyVerified,
    /// An unverified record existed and was promoted to verified
    JustVerified,
}

#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn UserStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Synchronize one provider identity into the users table.
    ///
    /// `mark_verified` controls the verified flag on a freshly inserted
    /// record; admin registration inserts unverified, the callback paths
    /// insert verified. Concurrent first-time reconciles race on the insert
    /// and the loser surfaces `DuplicateEmail` from the unique constraint.
    pub async fn reconcile(
        &self,
        identity: &Identity,
        mark_verified: bool,
    ) -> Result<ReconcileOutcome> {
        match self.store.find_by_identity_id(&identity.id).await? {
            None => {
                // The provider is fixed at creation. Signing in with a
                // different method against a registered email is refused
                // instead of aliasing the record.
                if let Some(existing) = self.store.find_by_email(&identity.email).await? {
                    if existing.provider != identity.provider {
                        return Err(AccountError::ProviderMismatch);
                    }
                }

                self.store
                    .insert(NewUserRecord::from_identity(identity, mark_verified))
                    .await?;
                info!(identity_id = %identity.id, "user record created");
                Ok(ReconcileOutcome::Created)
            }
            Some(record) if record.verified => Ok(ReconcileOutcome::AlreadyVerified),
            Some(_) => {
                self.store
                    .update(&identity.id, UserPatch::verify(identity))
                    .await?;
                info!(identity_id = %identity.id, "user record verified");
                Ok(ReconcileOutcome::JustVerified)
            }
        }
    }
}
