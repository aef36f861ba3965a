use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use standbook_client_core::AUTH_DECLINED_CODE;

use super::{api_error, ApiError};
use crate::middleware::issue_token;
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: String,
    pub username: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = match state.users.verify(&payload.username, &payload.password).await {
        Some(u) => u,
        None => {
            tracing::warn!("Failed login for {}", payload.username);
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "code": AUTH_DECLINED_CODE,
                    "error": "Invalid username or password"
                })),
            ));
        }
    };

    let token = issue_token(&state.config, &user).map_err(|e| {
        tracing::error!("Error issuing token: {:?}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Token error")
    })?;

    tracing::info!("User {} logged in", user.username);
    Ok(Json(AuthResponse {
        token,
        user_id: user.id.to_string(),
        username: user.username,
    }))
}
