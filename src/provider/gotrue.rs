//! GoTrue auth provider client
//!
//! Talks to a GoTrue-compatible auth REST API (the flavor hosted database
//! platforms expose):
//!
//! - `POST /verify`: OTP verification, returns a session and the identity
//! - `GET /user`: resolve the identity behind an access token
//! - `GET /authorize`: OAuth redirect entry point
//! - `DELETE /admin/users/{id}`: admin deletion, service-role key required
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use super::{IdentityProvider, OtpVerification};
use crate::config::AuthProviderSettings;
use crate::error::{AccountError, Result};
use crate::models::{Identity, IdentityMetadata, Provider, Session};

#[derive(Clone)]
pub struct GoTrueProvider {
    settings: AuthProviderSettings,
    http: Client,
}

impl GoTrueProvider {
    pub fn new(settings: AuthProviderSettings) -> Self {
        Self {
            settings,
            http: Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path)
    }
}

/// Identity payload as the provider serializes it
#[derive(Debug, Deserialize)]
struct RawIdentity {
    id: String,
    email: Option<String>,
    #[serde(default)]
    app_metadata: RawAppMetadata,
    #[serde(default)]
    user_metadata: RawUserMetadata,
    email_confirmed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAppMetadata {
    provider: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawUserMetadata {
    name: Option<String>,
    avatar_url: Option<String>,
    picture: Option<String>,
}

impl TryFrom<RawIdentity> for Identity {
    type Error = AccountError;

    fn try_from(raw: RawIdentity) -> Result<Self> {
        let email = raw
            .email
            .ok_or_else(|| AccountError::Provider("identity has no email".to_string()))?;

        let provider_name = raw.app_metadata.provider.unwrap_or_default();
        let provider = Provider::from_str(&provider_name).ok_or_else(|| {
            AccountError::Provider(format!("unsupported identity provider: {provider_name}"))
        })?;

        Ok(Identity {
            id: raw.id,
            email,
            provider,
            metadata: IdentityMetadata {
                name: raw.user_metadata.name,
                avatar_url: raw.user_metadata.avatar_url,
                picture: raw.user_metadata.picture,
            },
            email_confirmed: raw.email_confirmed_at.is_some(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    user: Option<RawIdentity>,
}

#[async_trait]
impl IdentityProvider for GoTrueProvider {
    async fn verify_otp(&self, email: &str, token: &str) -> Result<OtpVerification> {
        let response = self
            .http
            .post(self.endpoint("verify"))
            .header("apikey", &self.settings.anon_key)
            .json(&json!({ "email": email, "token": token, "type": "email" }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(email = %email, status = %status, "OTP verification rejected by provider");
            return Err(AccountError::Provider(format!(
                "OTP rejected ({status}): {body}"
            )));
        }

        let verify: VerifyResponse = response.json().await?;
        let identity = verify.user.map(Identity::try_from).transpose()?;
        let session = verify.access_token.map(|access_token| Session {
            access_token,
            token_type: verify.token_type.unwrap_or_else(|| "bearer".to_string()),
            expires_in: verify.expires_in.unwrap_or(3600),
            refresh_token: verify.refresh_token,
        });

        debug!(email = %email, has_identity = identity.is_some(), "OTP verified");
        Ok(OtpVerification { identity, session })
    }

    async fn current_identity(&self, access_token: &str) -> Result<Option<Identity>> {
        let response = self
            .http
            .get(self.endpoint("user"))
            .header("apikey", &self.settings.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let raw: RawIdentity = response.json().await?;
                Ok(Some(Identity::try_from(raw)?))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(AccountError::Provider(format!(
                    "identity lookup failed ({status}): {body}"
                )))
            }
        }
    }

    fn authorize_url(&self, provider: Provider, redirect_to: &str) -> Result<String> {
        if provider == Provider::Email {
            return Err(AccountError::Provider(
                "email is not an OAuth provider".to_string(),
            ));
        }

        let mut url = Url::parse(&self.settings.base_url)
            .map_err(|err| AccountError::Configuration(format!("invalid auth base URL: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| AccountError::Configuration("auth base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push("authorize");
        url.query_pairs_mut()
            .append_pair("provider", provider.as_str())
            .append_pair("redirect_to", redirect_to);

        Ok(url.to_string())
    }

    async fn delete_identity(&self, identity_id: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.endpoint(&format!("admin/users/{identity_id}")))
            .header("apikey", &self.settings.anon_key)
            .bearer_auth(&self.settings.service_role_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AccountError::Provider(format!(
                "identity deletion failed ({status}): {body}"
            )));
        }

        Ok(())
    }
}
