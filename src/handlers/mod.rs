// handlers/mod.rs - HTTP handlers, one module per resource.
//
// Reads are public. Every mutating handler takes an `AuthUser` argument, which
// rejects the request with 401 before the handler body runs.
pub mod auth;
pub mod collection;
pub mod profile;
pub mod system;

use serde::Serialize;
use uuid::Uuid;

use crate::database::models::Validate;
use crate::error::ApiError;

/// `{ "message": ... }` body for operations without a row to return.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Normalizes then validates a request payload.
pub(crate) fn validated<I: Validate>(input: I, label: &str) -> Result<I, ApiError> {
    let input = input.normalized();
    let errors = input.field_errors();
    if errors.is_empty() {
        Ok(input)
    } else {
        Err(ApiError::validation_error(
            format!("Invalid {} payload", label.to_lowercase()),
            Some(errors),
        ))
    }
}

/// A path segment that is not a UUID cannot name any row.
pub(crate) fn parse_path_id(raw: &str, label: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(format!("{} not found", label)))
}
