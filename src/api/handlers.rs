use super::AppState;
use crate::domain::model::{ContentRequest, ContentResult, RefreshResponse, TokenStatus};
use crate::utils::error::{GatewayError, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;

/// Get content from the content platform
///
/// Retrieves the value of the `content` mapping field of a post, normalized
/// as HTML (default) or plain text.
#[utoipa::path(
    post,
    path = "/content",
    tag = "content",
    request_body = ContentRequest,
    responses(
        (status = 200, description = "OK", body = ContentResult),
        (status = 400, description = "Bad request", body = String, content_type = "text/plain"),
        (status = 500, description = "Internal server error", body = String, content_type = "text/plain")
    )
)]
pub async fn get_content(State(state): State<AppState>, body: Bytes) -> Result<Json<ContentResult>> {
    // 不檢查 Content-Type，只要本文是合法 JSON 即可
    let request: ContentRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!("Invalid request body: {}", e);
        GatewayError::validation("Invalid request body")
    })?;

    let result = state.content.get_content(request).await?;
    Ok(Json(result))
}

/// Force a token refresh (admin)
#[utoipa::path(
    get,
    path = "/token/refresh",
    tag = "token",
    responses(
        (status = 200, description = "Token refreshed", body = RefreshResponse),
        (status = 401, description = "Missing or invalid admin token", body = String, content_type = "text/plain"),
        (status = 500, description = "Refresh failed", body = String, content_type = "text/plain")
    )
)]
pub async fn refresh_token(State(state): State<AppState>) -> Result<Json<RefreshResponse>> {
    state
        .tokens
        .refresh_token()
        .await
        .map_err(|e| e.context("Failed to refresh token"))?;

    Ok(Json(RefreshResponse {
        status: "success".to_string(),
        message: "Token refreshed successfully".to_string(),
    }))
}

/// Report the current token state (admin)
#[utoipa::path(
    get,
    path = "/token/status",
    tag = "token",
    responses(
        (status = 200, description = "Current token state", body = TokenStatus),
        (status = 401, description = "Missing or invalid admin token", body = String, content_type = "text/plain")
    )
)]
pub async fn token_status(State(state): State<AppState>) -> Json<TokenStatus> {
    Json(state.tokens.status().await)
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
