use axum::Json;

use crate::handlers::MessageResponse;

/// POST /api/auth/logout
///
/// Tokens are stateless and there is no server-side revocation list; the client
/// forgets its token and it stays valid until it expires.
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse::new("Logged out successfully"))
}
