//! Account lifecycle operations
use std::sync::Arc;

use tracing::{error, info};

use crate::error::{AccountError, Result};
use crate::models::UserPatch;
use crate::provider::IdentityProvider;
use crate::store::UserStore;

#[derive(Clone)]
pub struct AccountService {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn UserStore>,
}

impl AccountService {
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Arc<dyn UserStore>) -> Self {
        Self { provider, store }
    }

    /// Delete an account from both systems.
    ///
    /// The local record goes first. Losing the race the other way would leave
    /// a users row pointing at a deleted identity; this order leaves at worst
    /// an orphaned identity in the provider, which is reported as
    /// `PartialDeletion` so an operator can finish the job.
    pub async fn delete_account(&self, identity_id: &str) -> Result<()> {
        self.store.delete(identity_id).await?;

        if let Err(err) = self.provider.delete_identity(identity_id).await {
            error!(identity_id = %identity_id, error = %err, "identity deletion failed after store deletion");
            return Err(AccountError::PartialDeletion {
                identity_id: identity_id.to_string(),
            });
        }

        info!(identity_id = %identity_id, "account deleted");
        Ok(())
    }

    /// Update the profile picture of the caller's own record.
    ///
    /// The access token must resolve to the identity being updated.
    pub async fn update_picture(
        &self,
        access_token: &str,
        identity_id: &str,
        picture_url: &str,
    ) -> Result<()> {
        let identity = self
            .provider
            .current_identity(access_token)
            .await?
            .ok_or(AccountError::NoActiveSession)?;

        if identity.id != identity_id {
            return Err(AccountError::IdentityMismatch);
        }

        self.store
            .update(identity_id, UserPatch::picture(picture_url))
            .await
    }
}
