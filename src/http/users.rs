//! User record endpoints: internal registration and lookup, plus the
//! self-service deletion, picture and OAuth redirect routes
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::callback::bearer_token;
use super::HttpServerState;
use crate::error::AccountError;
use crate::models::{NewUserRecord, Provider, UserPatch};

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MessageResponse {
    fn message(text: impl Into<String>) -> Self {
        Self {
            message: Some(text.into()),
            error: None,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            message: None,
            error: Some(text.into()),
        }
    }
}

fn error_response(err: AccountError) -> Response {
    (err.status_code(), Json(MessageResponse::error(err.to_string()))).into_response()
}

fn bad_request(text: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(MessageResponse::error(text))).into_response()
}

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub identity_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub provider: Option<String>,
    /// Raw identity payload to cache on the record
    pub identity: Option<Value>,
}

/// Internal registration: insert an unverified record ahead of the user's
/// first verification callback
pub async fn register_user(
    State(state): State<HttpServerState>,
    Json(request): Json<RegisterUserRequest>,
) -> Response {
    let (Some(identity_id), Some(email), Some(provider_name)) =
        (request.identity_id, request.email, request.provider)
    else {
        return bad_request("identity_id, email and provider are required");
    };

    let Some(provider) = Provider::from_str(&provider_name) else {
        return bad_request("unknown provider");
    };

    match state.store.find_by_identity_id(&identity_id).await {
        Ok(Some(_)) => (
            StatusCode::OK,
            Json(MessageResponse::message("User already registered")),
        )
            .into_response(),
        Ok(None) => {
            let record = NewUserRecord {
                identity_id: identity_id.clone(),
                email,
                name: request.name.unwrap_or_else(|| "no_name".to_string()),
                picture: request.picture,
                provider,
                verified: false,
                is_admin: false,
                identity: request.identity.unwrap_or(Value::Null),
            };
            match state.store.insert(record).await {
                Ok(_) => {
                    info!(identity_id = %identity_id, "user registered unverified");
                    (
                        StatusCode::CREATED,
                        Json(MessageResponse::message("User registered")),
                    )
                        .into_response()
                }
                Err(err) => error_response(err),
            }
        }
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub struct VerifyUserRequest {
    pub identity_id: String,
}

/// Internal verification: promote a known record to verified
pub async fn verify_user(
    State(state): State<HttpServerState>,
    Json(request): Json<VerifyUserRequest>,
) -> Response {
    match state.store.find_by_identity_id(&request.identity_id).await {
        Ok(Some(record)) if record.verified => (
            StatusCode::OK,
            Json(MessageResponse::message(
                "User already verified and registered in users db",
            )),
        )
            .into_response(),
        Ok(Some(_)) => {
            let patch = UserPatch {
                verified: Some(true),
                picture: None,
                identity: None,
            };
            match state.store.update(&request.identity_id, patch).await {
                Ok(()) => (
                    StatusCode::OK,
                    Json(MessageResponse::message("User just verified in users db")),
                )
                    .into_response(),
                Err(err) => error_response(err),
            }
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(MessageResponse::error("User not found")),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn get_user(
    State(state): State<HttpServerState>,
    Path(identity_id): Path<String>,
) -> Response {
    match state.store.find_by_identity_id(&identity_id).await {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(MessageResponse::error("User not found")),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

/// Delete the caller's own account from the store and the auth provider
pub async fn delete_user(State(state): State<HttpServerState>, headers: HeaderMap) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(MessageResponse::error("Missing bearer token")),
        )
            .into_response();
    };

    let identity = match state.provider.current_identity(token).await {
        Ok(Some(identity)) => identity,
        Ok(None) => return error_response(AccountError::NoActiveSession),
        Err(err) => return error_response(err),
    };

    match state.account.delete_account(&identity.id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse::message("User deleted")),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePictureRequest {
    pub identity_id: Option<String>,
    pub picture_url: Option<String>,
}

pub async fn update_picture(
    State(state): State<HttpServerState>,
    headers: HeaderMap,
    Json(request): Json<UpdatePictureRequest>,
) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(MessageResponse::error("Missing bearer token")),
        )
            .into_response();
    };

    let (Some(identity_id), Some(picture_url)) = (request.identity_id, request.picture_url) else {
        return bad_request("identity_id and picture_url are required");
    };

    match state
        .account
        .update_picture(token, &identity_id, &picture_url)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse::message("Picture updated")),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub struct OauthRedirectQuery {
    pub redirect_to: Option<String>,
}

/// Redirect the browser into the provider's OAuth handshake
pub async fn oauth_redirect(
    State(state): State<HttpServerState>,
    Path(provider_name): Path<String>,
    Query(query): Query<OauthRedirectQuery>,
) -> Response {
    let Some(provider) = Provider::from_str(&provider_name) else {
        return bad_request("unknown provider");
    };
    if provider == Provider::Email {
        return bad_request("email is not an OAuth provider");
    }

    let Some(redirect_to) = query.redirect_to.or_else(|| state.default_redirect_url.clone())
    else {
        return bad_request("redirect_to is required");
    };

    match state.provider.authorize_url(provider, &redirect_to) {
        Ok(url) => Redirect::temporary(&url).into_response(),
        Err(err) => error_response(err),
    }
}
