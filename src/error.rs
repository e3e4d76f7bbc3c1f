use axum::http::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AccountError>;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("User store error: {0}")]
    Store(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Account already registered with a different sign-in method")]
    ProviderMismatch,

    #[error("OTP verification failed: {0}")]
    OtpVerificationFailed(String),

    #[error("User verified but no user data could be retrieved")]
    IdentityMissing,

    #[error("User id mismatch")]
    IdentityMismatch,

    #[error("No Active user found")]
    NoActiveSession,

    #[error("No authentication data was received")]
    NoAuthData,

    #[error("Account partially deleted: identity {identity_id} is orphaned in the auth provider")]
    PartialDeletion { identity_id: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AccountError {
    /// HTTP status for the callback and account endpoints
    pub fn status_code(&self) -> StatusCode {
        match self {
            AccountError::NoAuthData | AccountError::IdentityMissing => StatusCode::NOT_FOUND,
            AccountError::DuplicateEmail | AccountError::ProviderMismatch => StatusCode::CONFLICT,
            AccountError::IdentityMismatch => StatusCode::FORBIDDEN,
            AccountError::OtpVerificationFailed(_) => StatusCode::UNAUTHORIZED,
            AccountError::NoActiveSession
            | AccountError::Provider(_)
            | AccountError::Store(_)
            | AccountError::PartialDeletion { .. }
            | AccountError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Conversions from external error types
impl From<sqlx::Error> for AccountError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Store error: {}", err);
        AccountError::Store(err.to_string())
    }
}

impl From<reqwest::Error> for AccountError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("Provider request error: {}", err);
        AccountError::Provider(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_callback_contract() {
        assert_eq!(
            AccountError::NoActiveSession.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(AccountError::NoAuthData.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AccountError::IdentityMissing.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AccountError::DuplicateEmail.status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn no_active_session_message_names_the_missing_user() {
        assert!(AccountError::NoActiveSession
            .to_string()
            .contains("No Active user"));
    }
}
