use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::identity::{Identity, Provider};

/// User record - the locally owned row synchronized from the auth provider.
///
/// This service is the only writer. Email carries the unique constraint;
/// identity_id is a denormalized copy of the provider id used as the lookup
/// key during reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub identity_id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub provider: Provider,
    pub verified: bool,
    pub is_admin: bool,
    /// Cached identity snapshot, refreshed on verification
    pub identity: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new user record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUserRecord {
    pub identity_id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub provider: Provider,
    pub verified: bool,
    pub is_admin: bool,
    pub identity: serde_json::Value,
}

impl NewUserRecord {
    /// Derive the insert payload from a provider identity
    pub fn from_identity(identity: &Identity, verified: bool) -> Self {
        Self {
            identity_id: identity.id.clone(),
            email: identity.email.clone(),
            name: identity.display_name(),
            picture: identity.derived_picture(),
            provider: identity.provider,
            verified,
            is_admin: false,
            identity: identity.snapshot(),
        }
    }
}

/// Optional fields for record updates (single writer via this service)
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub verified: Option<bool>,
    pub picture: Option<String>,
    pub identity: Option<serde_json::Value>,
}

impl UserPatch {
    /// Mark the record verified and refresh the cached identity snapshot
    pub fn verify(identity: &Identity) -> Self {
        Self {
            verified: Some(true),
            picture: None,
            identity: Some(identity.snapshot()),
        }
    }

    /// Replace the profile picture only
    pub fn picture(url: &str) -> Self {
        Self {
            verified: None,
            picture: Some(url.to_string()),
            identity: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::identity::IdentityMetadata;

    #[test]
    fn new_record_carries_identity_fields() {
        let identity = Identity {
            id: "abc".to_string(),
            email: "user@example.com".to_string(),
            provider: Provider::Github,
            metadata: IdentityMetadata {
                name: None,
                avatar_url: Some("https://github.test/a.png".to_string()),
                picture: None,
            },
            email_confirmed: true,
        };

        let record = NewUserRecord::from_identity(&identity, true);
        assert_eq!(record.identity_id, "abc");
        assert_eq!(record.email, "user@example.com");
        assert_eq!(record.name, "no_name");
        assert_eq!(record.picture.as_deref(), Some("https://github.test/a.png"));
        assert_eq!(record.provider, Provider::Github);
        assert!(record.verified);
        assert!(!record.is_admin);
        assert_eq!(record.identity["id"], "abc");
    }

    #[test]
    fn verify_patch_sets_flag_and_snapshot() {
        let identity = Identity {
            id: "abc".to_string(),
            email: "user@example.com".to_string(),
            provider: Provider::Email,
            metadata: IdentityMetadata::default(),
            email_confirmed: true,
        };

        let patch = UserPatch::verify(&identity);
        assert_eq!(patch.verified, Some(true));
        assert!(patch.picture.is_none());
        assert!(patch.identity.is_some());
    }
}
