//! Auth callback dispatch
//!
//! One endpoint serves three verification paths. Which one runs is decided
//! by the parameters present:
//!
//! - an OAuth `code` with an active session reconciles the session identity
//! - an OTP `token` + `email` pair verifies the token, then reconciles the
//!   returned identity (sign-up) or defers to the password entry step
//!   (password reset)
//! - neither is an error, nothing to verify
use std::sync::Arc;

use tracing::{info, warn};

use super::reconcile::{ReconcileOutcome, Reconciler};
use crate::error::{AccountError, Result};
use crate::models::{Identity, Session};
use crate::provider::IdentityProvider;

/// Parameters extracted from the callback request
#[derive(Debug, Default)]
pub struct CallbackParams {
    /// OTP token from the verification email
    pub token: Option<String>,
    /// Email the OTP was sent to
    pub email: Option<String>,
    /// OAuth authorization code (the front end already exchanged it for a
    /// session; its presence selects the OAuth path)
    pub code: Option<String>,
    /// Verification kind, `password-reset` defers reconciliation
    pub kind: Option<String>,
    /// Identity behind the caller's session, when one was presented
    pub session_identity: Option<Identity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The identity was reconciled into the users table
    Reconciled(ReconcileOutcome),
    /// Password-reset token accepted; the users table was not touched
    PendingPasswordEntry,
}

#[derive(Debug)]
pub struct CallbackResult {
    pub outcome: CallbackOutcome,
    pub message: &'static str,
    /// Session issued during OTP verification, forwarded to the caller
    pub session: Option<Session>,
}

const PASSWORD_RESET_KIND: &str = "password-reset";

fn reconcile_message(outcome: ReconcileOutcome) -> &'static str {
    match outcome {
        ReconcileOutcome::Created => "User added & verified in users db",
        ReconcileOutcome::AlreadyVerified => "User already verified and registered in users db",
        ReconcileOutcome::JustVerified => "User just verified in users db",
    }
}

#[derive(Clone)]
pub struct VerificationFlow {
    provider: Arc<dyn IdentityProvider>,
    reconciler: Reconciler,
}

impl VerificationFlow {
    pub fn new(provider: Arc<dyn IdentityProvider>, reconciler: Reconciler) -> Self {
        Self {
            provider,
            reconciler,
        }
    }

    pub async fn handle_callback(&self, params: CallbackParams) -> Result<CallbackResult> {
        if params.code.is_some() {
            let identity = params
                .session_identity
                .ok_or(AccountError::NoActiveSession)?;
            let outcome = self.reconciler.reconcile(&identity, true).await?;
            return Ok(CallbackResult {
                outcome: CallbackOutcome::Reconciled(outcome),
                message: reconcile_message(outcome),
                session: None,
            });
        }

        if let (Some(token), Some(email)) = (params.token.as_deref(), params.email.as_deref()) {
            match params.kind.as_deref() {
                Some(PASSWORD_RESET_KIND) => {
                    let verification = self.verify_otp(email, token).await?;
                    info!(email = %email, "password-reset token accepted");
                    Ok(CallbackResult {
                        outcome: CallbackOutcome::PendingPasswordEntry,
                        message: "Token verified. Please reset your password.",
                        session: verification.session,
                    })
                }
                None => {
                    let verification = self.verify_otp(email, token).await?;
                    let identity = verification.identity.ok_or(AccountError::IdentityMissing)?;
                    let outcome = self.reconciler.reconcile(&identity, true).await?;
                    Ok(CallbackResult {
                        outcome: CallbackOutcome::Reconciled(outcome),
                        message: reconcile_message(outcome),
                        session: verification.session,
                    })
                }
                Some(other) => {
                    warn!(kind = %other, "unsupported verification type");
                    Err(AccountError::Provider(format!(
                        "unsupported verification type: {other}"
                    )))
                }
            }
        } else {
            Err(AccountError::NoAuthData)
        }
    }

    async fn verify_otp(&self, email: &str, token: &str) -> Result<crate::provider::OtpVerification> {
        self.provider
            .verify_otp(email, token)
            .await
            .map_err(|err| match err {
                AccountError::Provider(msg) => AccountError::OtpVerificationFailed(msg),
                other => other,
            })
    }
}
