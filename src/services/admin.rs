use bcrypt::{BcryptError, DEFAULT_COST};
use tracing::info;

use crate::auth::password::hash_password_with_cost;
use crate::database::models::User;
use crate::database::{DatabaseError, UserRepository};

#[derive(Debug)]
pub enum SeedOutcome {
    Created(User),
    /// Some account exists already; nothing was written
    AlreadyExists,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Password hashing failed: {0}")]
    Hash(#[from] BcryptError),
    #[error("Password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("Invalid admin credentials: {0}")]
    InvalidInput(&'static str),
}

/// Creates the first admin account. Runs only against an empty users table.
pub async fn seed_admin(
    users: &dyn UserRepository,
    username: &str,
    password: &str,
) -> Result<SeedOutcome, SeedError> {
    seed_admin_with_cost(users, username, password, DEFAULT_COST).await
}

pub async fn seed_admin_with_cost(
    users: &dyn UserRepository,
    username: &str,
    password: &str,
    cost: u32,
) -> Result<SeedOutcome, SeedError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(SeedError::InvalidInput("username must not be blank"));
    }
    if password.is_empty() {
        return Err(SeedError::InvalidInput("password must not be empty"));
    }

    if users.count().await? > 0 {
        info!("Admin user already exists, skipping seed");
        return Ok(SeedOutcome::AlreadyExists);
    }

    let password = password.to_string();
    let hash = tokio::task::spawn_blocking(move || hash_password_with_cost(&password, cost)).await??;
    let user = users.create(username, &hash).await?;

    info!("Created admin user {} ({})", user.username, user.id);
    Ok(SeedOutcome::Created(user))
}
