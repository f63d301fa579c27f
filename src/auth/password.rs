use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};
use once_cell::sync::Lazy;

/// Compared against when the username does not exist, so both paths cost one bcrypt verify.
static DUMMY_HASH: Lazy<String> =
    Lazy::new(|| hash("portfolio-api-dummy-password", DEFAULT_COST).unwrap_or_default());

pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, BcryptError> {
    hash(password, cost)
}

/// Checks `password` against `stored_hash` on the blocking pool.
///
/// A missing hash (unknown user) still performs a full verify and returns `false`.
pub async fn verify_password(password: String, stored_hash: Option<String>) -> bool {
    let known_user = stored_hash.is_some();
    let result = tokio::task::spawn_blocking(move || {
        let target = stored_hash.unwrap_or_else(|| DUMMY_HASH.clone());
        verify(password, &target)
    })
    .await;

    match result {
        Ok(Ok(matches)) => matches && known_user,
        Ok(Err(e)) => {
            tracing::warn!("Password verification failed: {}", e);
            false
        }
        Err(e) => {
            tracing::error!("Password verification task failed: {}", e);
            false
        }
    }
}
