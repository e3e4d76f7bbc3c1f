//! Identity provider clients
//!
//! The auth provider owns credentials, OTP tokens, the OAuth handshake and
//! session issuance; this service only consumes its REST API. Consumers
//! depend on the `IdentityProvider` trait so the GoTrue client can be
//! replaced with a fake in tests.
pub mod gotrue;

pub use gotrue::GoTrueProvider;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Identity, Provider, Session};

/// Result of an OTP verification call.
///
/// The provider may accept the token and still return no identity payload;
/// callers decide how to treat that case.
#[derive(Debug, Clone, Default)]
pub struct OtpVerification {
    pub identity: Option<Identity>,
    pub session: Option<Session>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify a one-time passcode and obtain the resulting identity/session
    async fn verify_otp(&self, email: &str, token: &str) -> Result<OtpVerification>;

    /// Resolve the identity behind an access token, `None` when the token is
    /// not accepted
    async fn current_identity(&self, access_token: &str) -> Result<Option<Identity>>;

    /// Build the OAuth authorization redirect URL for a provider
    fn authorize_url(&self, provider: Provider, redirect_to: &str) -> Result<String>;

    /// Delete an identity from the provider (admin operation)
    async fn delete_identity(&self, identity_id: &str) -> Result<()>;
}
