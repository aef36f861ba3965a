use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use standbook_client_core::AUTH_DECLINED_CODE;
use uuid::Uuid;

use crate::config::Config;
use crate::users::UserRecord;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub username: String,
    pub exp: usize,
}

#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
}

pub fn issue_token(config: &Config, user: &UserRecord) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = chrono::Utc::now().timestamp() as usize + config.jwt_expiration as usize;
    let claims = Claims {
        user_id: user.id.to_string(),
        username: user.username.clone(),
        exp,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_ref()),
    )
}

/// 401 with a code so the client only drops its session when the server explicitly declined it.
fn auth_declined_response() -> Response {
    let body = serde_json::json!({
        "code": AUTH_DECLINED_CODE,
        "message": "Authentication required or session invalid"
    });
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

pub async fn auth_middleware(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = match req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
    {
        Some(t) => t.to_string(),
        None => return auth_declined_response(),
    };

    let decoding_key = DecodingKey::from_secret(state.config.jwt_secret.as_ref());
    let validation = Validation::new(Algorithm::HS256);
    let claims = match decode::<Claims>(&token, &decoding_key, &validation) {
        Ok(d) => d.claims,
        Err(e) => {
            tracing::debug!("Rejected token: {:?}", e);
            return auth_declined_response();
        }
    };
    let user_id = match Uuid::parse_str(&claims.user_id) {
        Ok(u) => u,
        Err(_) => return auth_declined_response(),
    };

    req.extensions_mut().insert(AuthUser {
        user_id,
        username: claims.username,
    });
    next.run(req).await
}
