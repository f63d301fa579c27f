//! In-memory repositories and a router harness for handler tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tower::ServiceExt;
use uuid::Uuid;

use crate::app::app;
use crate::auth::password::hash_password_with_cost;
use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::models::{Contact, ContactInput, Profile, ProfileInput, Project, ProjectInput, User};
use crate::database::reorder;
use crate::database::{DatabaseError, HealthCheck, OrderedRecord, OrderedRepository, ProfileRepository, UserRepository};
use crate::state::AppState;

pub const TEST_SECRET: &str = "test-secret-key-with-at-least-32-bytes!!";

/// Row construction the SQL layer does with INSERT/UPDATE statements.
pub trait MemoryRecord: OrderedRecord {
    fn build(id: Uuid, input: Self::Input, order_index: i32) -> Self;
    fn apply(&mut self, input: Self::Input);
    fn set_order_index(&mut self, order_index: i32);
}

impl MemoryRecord for Project {
    fn build(id: Uuid, input: ProjectInput, order_index: i32) -> Self {
        let now = Utc::now();
        Project {
            id,
            title: input.title,
            description: input.description,
            image_url: input.image_url,
            technologies: input.technologies,
            github_url: input.github_url,
            live_url: input.live_url,
            order_index,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: ProjectInput) {
        self.title = input.title;
        self.description = input.description;
        self.image_url = input.image_url;
        self.technologies = input.technologies;
        self.github_url = input.github_url;
        self.live_url = input.live_url;
        self.updated_at = Utc::now();
    }

    fn set_order_index(&mut self, order_index: i32) {
        self.order_index = order_index;
    }
}

impl MemoryRecord for Contact {
    fn build(id: Uuid, input: ContactInput, order_index: i32) -> Self {
        let now = Utc::now();
        Contact {
            id,
            kind: input.kind,
            value: input.value,
            url: input.url,
            icon: input.icon,
            order_index,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: ContactInput) {
        self.kind = input.kind;
        self.value = input.value;
        self.url = input.url;
        self.icon = input.icon;
        self.updated_at = Utc::now();
    }

    fn set_order_index(&mut self, order_index: i32) {
        self.order_index = order_index;
    }
}

/// Counts every mutating call so tests can assert the guard ran first.
#[derive(Default)]
pub struct WriteLog {
    writes: std::sync::atomic::AtomicUsize,
}

impl WriteLog {
    fn record(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

pub struct MemoryCollection<T> {
    rows: RwLock<Vec<T>>,
    writes: Arc<WriteLog>,
}

impl<T: MemoryRecord> MemoryCollection<T> {
    pub fn new(writes: Arc<WriteLog>) -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            writes,
        }
    }

    /// Direct access for arranging states the API cannot produce.
    pub async fn rows_mut(&self) -> tokio::sync::RwLockWriteGuard<'_, Vec<T>> {
        self.rows.write().await
    }
}

#[async_trait]
impl<T: MemoryRecord> OrderedRepository<T> for MemoryCollection<T> {
    async fn list(&self) -> Result<Vec<T>, DatabaseError> {
        let mut rows = self.rows.read().await.clone();
        rows.sort_by(|a, b| {
            a.order_index()
                .cmp(&b.order_index())
                .then_with(|| a.natural_key().cmp(b.natural_key()))
        });
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        Ok(self.rows.read().await.iter().find(|r| r.id() == id).cloned())
    }

    async fn create(&self, input: T::Input) -> Result<T, DatabaseError> {
        self.writes.record();
        let mut rows = self.rows.write().await;
        let next = rows.iter().map(|r| r.order_index()).max().unwrap_or(0) + 1;
        let row = T::build(Uuid::new_v4(), input, next);
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, input: T::Input) -> Result<Option<T>, DatabaseError> {
        self.writes.record();
        let mut rows = self.rows.write().await;
        Ok(rows.iter_mut().find(|r| r.id() == id).map(|row| {
            row.apply(input);
            row.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        self.writes.record();
        let mut rows = self.rows.write().await;
        let Some(position) = rows.iter().position(|r| r.id() == id) else {
            return Ok(false);
        };
        let removed = rows.remove(position).order_index();
        for row in rows.iter_mut().filter(|r| r.order_index() > removed) {
            let shifted = row.order_index() - 1;
            row.set_order_index(shifted);
        }
        Ok(true)
    }

    async fn reorder(&self, ids: &[Uuid]) -> Result<(), DatabaseError> {
        self.writes.record();
        reorder::ensure_unique(ids)?;

        let mut rows = self.rows.write().await;
        reorder::ensure_complete(ids.len(), rows.len() as i64)?;

        // Work on a copy; only a fully applied order replaces the table.
        let mut staged = rows.clone();
        for (position, id) in ids.iter().enumerate() {
            let row = staged
                .iter_mut()
                .find(|r| r.id() == *id)
                .ok_or_else(|| reorder::unknown_id(T::LABEL, *id))?;
            row.set_order_index(reorder::order_index_at(position));
        }

        *rows = staged;
        Ok(())
    }
}

pub struct MemoryUsers {
    users: RwLock<Vec<User>>,
}

impl MemoryUsers {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        Ok(self.users.read().await.len() as i64)
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == username) {
            return Err(DatabaseError::Validation(format!("username {} already taken", username)));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }
}

pub struct MemoryProfile {
    profile: RwLock<Option<Profile>>,
    writes: Arc<WriteLog>,
}

#[async_trait]
impl ProfileRepository for MemoryProfile {
    async fn get(&self) -> Result<Option<Profile>, DatabaseError> {
        Ok(self.profile.read().await.clone())
    }

    async fn upsert(&self, input: ProfileInput) -> Result<Profile, DatabaseError> {
        self.writes.record();
        let mut slot = self.profile.write().await;
        let now = Utc::now();
        let profile = match slot.take() {
            Some(existing) => Profile {
                name: input.name,
                title: input.title,
                bio: input.bio,
                image_url: input.image_url,
                skills: input.skills,
                updated_at: now,
                ..existing
            },
            None => Profile {
                id: Uuid::new_v4(),
                name: input.name,
                title: input.title,
                bio: input.bio,
                image_url: input.image_url,
                skills: input.skills,
                created_at: now,
                updated_at: now,
            },
        };
        *slot = Some(profile.clone());
        Ok(profile)
    }
}

/// Health probe whose answer tests can flip.
pub struct FakeHealth {
    up: AtomicBool,
}

impl FakeHealth {
    pub fn set_up(&self, up: bool) {
        self.up.store(up, Ordering::SeqCst);
    }
}

#[async_trait]
impl HealthCheck for FakeHealth {
    async fn ping(&self) -> Result<(), DatabaseError> {
        if self.up.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DatabaseError::Sqlx(sqlx::Error::PoolClosed))
        }
    }
}

/// Full router over in-memory repositories.
pub struct TestContext {
    pub state: AppState,
    pub router: Router,
    pub users: Arc<MemoryUsers>,
    pub projects: Arc<MemoryCollection<Project>>,
    pub contacts: Arc<MemoryCollection<Contact>>,
    pub health: Arc<FakeHealth>,
    pub writes: Arc<WriteLog>,
}

pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://localhost/portfolio_test".to_string()),
        "JWT_SECRET" => Some(TEST_SECRET.to_string()),
        _ => None,
    })
    .expect("test config")
}

impl TestContext {
    pub fn new() -> Self {
        let writes = Arc::new(WriteLog::default());
        let users = Arc::new(MemoryUsers::new());
        let projects = Arc::new(MemoryCollection::<Project>::new(writes.clone()));
        let contacts = Arc::new(MemoryCollection::<Contact>::new(writes.clone()));
        let profile = Arc::new(MemoryProfile {
            profile: RwLock::new(None),
            writes: writes.clone(),
        });
        let health = Arc::new(FakeHealth {
            up: AtomicBool::new(true),
        });
        let tokens = TokenService::new(TEST_SECRET.as_bytes(), Duration::hours(24)).expect("token service");

        let state = AppState {
            users: users.clone(),
            profile,
            projects: projects.clone(),
            contacts: contacts.clone(),
            tokens: Arc::new(tokens),
            health: health.clone(),
        };
        let router = app(state.clone(), &test_config());

        Self {
            state,
            router,
            users,
            projects,
            contacts,
            health,
            writes,
        }
    }

    /// Creates a user with a cheap bcrypt cost and returns it with a valid token.
    pub async fn seed_user(&self, username: &str, password: &str) -> (User, String) {
        let hash = hash_password_with_cost(password, 4).expect("hash");
        let user = self.users.create(username, &hash).await.expect("create user");
        let token = self.state.tokens.issue(&user).expect("issue token");
        (user, token)
    }

    pub async fn admin_token(&self) -> String {
        self.seed_user("admin-admin", "admin_admin").await.1
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }
}
