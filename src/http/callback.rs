//! Auth callback endpoint
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::HttpServerState;
use crate::models::Session;
use crate::services::CallbackParams;

pub(super) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

#[derive(Debug, Default, Deserialize)]
pub struct CallbackRequest {
    pub token: Option<String>,
    pub email: Option<String>,
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
}

pub async fn handle_callback(
    State(state): State<HttpServerState>,
    headers: HeaderMap,
    body: Option<Json<CallbackRequest>>,
) -> (StatusCode, Json<CallbackResponse>) {
    let request = body.map(|Json(r)| r).unwrap_or_default();

    // An OAuth callback identifies the user through the session it carries,
    // not through the request body
    let session_identity = match bearer_token(&headers) {
        Some(token) if request.code.is_some() => {
            match state.provider.current_identity(token).await {
                Ok(identity) => identity,
                Err(err) => {
                    return (
                        err.status_code(),
                        Json(CallbackResponse {
                            message: None,
                            error: Some(err.to_string()),
                            session: None,
                        }),
                    )
                }
            }
        }
        _ => None,
    };

    let params = CallbackParams {
        token: request.token,
        email: request.email,
        code: request.code,
        kind: request.kind,
        session_identity,
    };

    match state.flow.handle_callback(params).await {
        Ok(result) => {
            debug!(message = result.message, "callback handled");
            (
                StatusCode::OK,
                Json(CallbackResponse {
                    message: Some(result.message.to_string()),
                    error: None,
                    session: result.session,
                }),
            )
        }
        Err(err) => (
            err.status_code(),
            Json(CallbackResponse {
                message: None,
                error: Some(err.to_string()),
                session: None,
            }),
        ),
    }
}
