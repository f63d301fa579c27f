use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::password::verify_password;
use crate::error::ApiError;
use crate::middleware::JsonBody;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /api/auth/login - exchange username/password for a bearer token
///
/// Unknown usernames and wrong passwords get the same 401 and cost the same
/// bcrypt verification.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state.users.find_by_username(&payload.username).await?;
    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());

    let verified = verify_password(payload.password, stored_hash).await;
    let user = match user {
        Some(user) if verified => user,
        _ => {
            warn!("Failed login attempt for username '{}'", payload.username);
            return Err(ApiError::unauthorized("Invalid credentials"));
        }
    };

    let token = state.tokens.issue(&user)?;
    info!("User '{}' logged in", user.username);

    Ok(Json(LoginResponse { token }))
}
