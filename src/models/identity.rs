use serde::{Deserialize, Serialize};
use sqlx::Type;

/// Authentication provider enum matching database provider_type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "provider_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Email,
    Github,
    Google,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Email => "email",
            Provider::Github => "github",
            Provider::Google => "google",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "email" => Some(Provider::Email),
            "github" => Some(Provider::Github),
            "google" => Some(Provider::Google),
            _ => None,
        }
    }
}

/// Profile metadata supplied by the auth provider alongside an identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityMetadata {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub picture: Option<String>,
}

/// The authenticated principal as known by the auth provider.
///
/// Read-only to this service: the provider owns credential storage and token
/// issuance, we only reconcile identities into the local users table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque unique identifier assigned by the provider
    pub id: String,
    pub email: String,
    pub provider: Provider,
    #[serde(default)]
    pub metadata: IdentityMetadata,
    /// Whether the provider has confirmed the email address
    #[serde(default)]
    pub email_confirmed: bool,
}

impl Identity {
    /// Profile picture URL under the provider-specific metadata key
    pub fn derived_picture(&self) -> Option<String> {
        match self.provider {
            Provider::Github => self.metadata.avatar_url.clone(),
            Provider::Google => self.metadata.picture.clone(),
            Provider::Email => None,
        }
    }

    /// Display name, placeholder when the provider supplied none
    pub fn display_name(&self) -> String {
        self.metadata
            .name
            .clone()
            .unwrap_or_else(|| "no_name".to_string())
    }

    /// JSON snapshot cached on the user record
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Access token bundle issued by the provider on OTP login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(provider: Provider) -> Identity {
        Identity {
            id: "identity-1".to_string(),
            email: "user@example.com".to_string(),
            provider,
            metadata: IdentityMetadata {
                name: Some("User".to_string()),
                avatar_url: Some("https://github.test/avatar.png".to_string()),
                picture: Some("https://google.test/photo.jpg".to_string()),
            },
            email_confirmed: true,
        }
    }

    #[test]
    fn picture_derivation_is_provider_specific() {
        assert_eq!(
            identity(Provider::Github).derived_picture().as_deref(),
            Some("https://github.test/avatar.png")
        );
        assert_eq!(
            identity(Provider::Google).derived_picture().as_deref(),
            Some("https://google.test/photo.jpg")
        );
        assert_eq!(identity(Provider::Email).derived_picture(), None);
    }

    #[test]
    fn display_name_defaults_to_placeholder() {
        let mut identity = identity(Provider::Email);
        identity.metadata.name = None;
        assert_eq!(identity.display_name(), "no_name");
    }

    #[test]
    fn provider_round_trips_through_str() {
        for provider in [Provider::Email, Provider::Github, Provider::Google] {
            assert_eq!(Provider::from_str(provider.as_str()), Some(provider));
        }
        assert_eq!(Provider::from_str("facebook"), None);
    }
}
