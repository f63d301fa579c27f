// handlers/profile.rs - the singleton profile (no ids, no delete)

use axum::{extract::State, Json};
use tracing::info;

use super::validated;
use crate::database::models::{Profile, ProfileInput};
use crate::error::ApiError;
use crate::middleware::{AuthUser, JsonBody};
use crate::state::AppState;

/// GET /api/profile
pub async fn get(State(state): State<AppState>) -> Result<Json<Profile>, ApiError> {
    state
        .profile
        .get()
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Profile not found"))
}

/// PUT /api/profile - creates the profile on first write, replaces it afterwards
pub async fn put(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<ProfileInput>,
) -> Result<Json<Profile>, ApiError> {
    let input = validated(input, "profile")?;
    let profile = state.profile.upsert(input).await?;

    info!("Profile updated by '{}'", auth.username);
    Ok(Json(profile))
}
