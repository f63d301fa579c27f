// handlers/collection.rs - CRUD and reorder for ordered collections
//
// Routed once per resource: `collection::list::<Project>`, `collection::list::<Contact>`, ...

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::{parse_path_id, validated, MessageResponse};
use crate::database::models::{Contact, Project};
use crate::database::{OrderedRecord, OrderedRepository};
use crate::error::ApiError;
use crate::middleware::{AuthUser, JsonBody};
use crate::state::AppState;

/// An ordered record type with a repository in `AppState`.
pub trait Collection: OrderedRecord {
    fn repository(state: &AppState) -> Arc<dyn OrderedRepository<Self>>;
}

impl Collection for Project {
    fn repository(state: &AppState) -> Arc<dyn OrderedRepository<Self>> {
        state.projects.clone()
    }
}

impl Collection for Contact {
    fn repository(state: &AppState) -> Arc<dyn OrderedRepository<Self>> {
        state.contacts.clone()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub ordered_ids: Vec<String>,
}

/// GET /api/{collection}
pub async fn list<T: Collection>(State(state): State<AppState>) -> Result<Json<Vec<T>>, ApiError> {
    Ok(Json(T::repository(&state).list().await?))
}

/// GET /api/{collection}/:id
pub async fn get<T: Collection>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<T>, ApiError> {
    let id = parse_path_id(&id, T::LABEL)?;
    T::repository(&state)
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found::<T>())
}

/// POST /api/{collection}
pub async fn create<T: Collection>(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<T::Input>,
) -> Result<Json<T>, ApiError> {
    let input = validated(input, T::LABEL)?;
    let item = T::repository(&state).create(input).await?;

    info!("{} {} created by '{}'", T::LABEL, item.id(), auth.username);
    Ok(Json(item))
}

/// PUT /api/{collection}/:id
pub async fn update<T: Collection>(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<T::Input>,
) -> Result<Json<T>, ApiError> {
    let id = parse_path_id(&id, T::LABEL)?;
    let input = validated(input, T::LABEL)?;
    let item = T::repository(&state)
        .update(id, input)
        .await?
        .ok_or_else(|| not_found::<T>())?;

    info!("{} {} updated by '{}'", T::LABEL, id, auth.username);
    Ok(Json(item))
}

/// DELETE /api/{collection}/:id
pub async fn delete<T: Collection>(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_path_id(&id, T::LABEL)?;
    if !T::repository(&state).delete(id).await? {
        return Err(not_found::<T>());
    }

    info!("{} {} deleted by '{}'", T::LABEL, id, auth.username);
    Ok(Json(MessageResponse::new(format!("{} deleted successfully", T::LABEL))))
}

/// PUT /api/{collection}/reorder - body `{ "orderedIds": [...] }`
pub async fn reorder<T: Collection>(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ReorderRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let ids = payload
        .ordered_ids
        .iter()
        .map(|raw| {
            Uuid::parse_str(raw).map_err(|_| {
                ApiError::bad_request(format!("Invalid payload: '{}' is not a valid id", raw))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    T::repository(&state).reorder(&ids).await?;

    info!("{} {} reordered by '{}'", ids.len(), T::TABLE, auth.username);
    Ok(Json(MessageResponse::new(format!("{} reordered successfully", T::PLURAL))))
}

fn not_found<T: Collection>() -> ApiError {
    ApiError::not_found(format!("{} not found", T::LABEL))
}
