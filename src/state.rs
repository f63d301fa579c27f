use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::TokenService;
use crate::database::models::{Contact, Project};
use crate::database::postgres::{PgProfile, PgRepository, PgUsers};
use crate::database::{Database, HealthCheck, OrderedRepository, ProfileRepository, UserRepository};

/// Everything a handler may touch, injected once at router construction.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub profile: Arc<dyn ProfileRepository>,
    pub projects: Arc<dyn OrderedRepository<Project>>,
    pub contacts: Arc<dyn OrderedRepository<Contact>>,
    pub tokens: Arc<TokenService>,
    pub health: Arc<dyn HealthCheck>,
}

impl AppState {
    pub fn postgres(database: &Database, tokens: TokenService) -> Self {
        let pool = database.pool().clone();
        Self {
            users: Arc::new(PgUsers::new(pool.clone())),
            profile: Arc::new(PgProfile::new(pool.clone())),
            projects: Arc::new(PgRepository::<Project>::new(pool.clone())),
            contacts: Arc::new(PgRepository::<Contact>::new(pool)),
            tokens: Arc::new(tokens),
            health: Arc::new(database.clone()),
        }
    }
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}
