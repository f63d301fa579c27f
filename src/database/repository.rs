use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{postgres::PgRow, FromRow};
use uuid::Uuid;

use super::models::{Contact, ContactInput, Profile, ProfileInput, Project, ProjectInput, User, Validate};
use super::DatabaseError;

/// A table whose rows are displayed in `order_index` order.
pub trait OrderedRecord:
    for<'r> FromRow<'r, PgRow> + Serialize + Clone + Send + Sync + Unpin + 'static
{
    type Input: DeserializeOwned + Validate + Send + Sync + 'static;

    const TABLE: &'static str;
    /// SQL ordering; ties on `order_index` fall back to the natural key
    const ORDER_BY: &'static str;
    /// Singular label for messages ("Project")
    const LABEL: &'static str;
    /// Plural label for messages ("Projects")
    const PLURAL: &'static str;

    fn id(&self) -> Uuid;
    fn order_index(&self) -> i32;
    /// Secondary sort key, matching `ORDER_BY`
    fn natural_key(&self) -> &str;
}

impl OrderedRecord for Project {
    type Input = ProjectInput;

    const TABLE: &'static str = "projects";
    const ORDER_BY: &'static str = "order_index ASC, title ASC";
    const LABEL: &'static str = "Project";
    const PLURAL: &'static str = "Projects";

    fn id(&self) -> Uuid {
        self.id
    }

    fn order_index(&self) -> i32 {
        self.order_index
    }

    fn natural_key(&self) -> &str {
        &self.title
    }
}

impl OrderedRecord for Contact {
    type Input = ContactInput;

    const TABLE: &'static str = "contacts";
    const ORDER_BY: &'static str = "order_index ASC, type ASC";
    const LABEL: &'static str = "Contact";
    const PLURAL: &'static str = "Contacts";

    fn id(&self) -> Uuid {
        self.id
    }

    fn order_index(&self) -> i32 {
        self.order_index
    }

    fn natural_key(&self) -> &str {
        &self.kind
    }
}

/// Credential store. Read-only from the API; rows come from the seed command.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn count(&self) -> Result<i64, DatabaseError>;

    async fn create(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError>;
}

/// Singleton profile: read, or create-or-replace.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get(&self) -> Result<Option<Profile>, DatabaseError>;

    async fn upsert(&self, input: ProfileInput) -> Result<Profile, DatabaseError>;
}

/// CRUD plus atomic reordering for an ordered collection.
#[async_trait]
pub trait OrderedRepository<T: OrderedRecord>: Send + Sync {
    /// All rows by `order_index`, ties broken by the natural key
    async fn list(&self) -> Result<Vec<T>, DatabaseError>;

    async fn get(&self, id: Uuid) -> Result<Option<T>, DatabaseError>;

    /// Inserts with `order_index` one past the current maximum
    async fn create(&self, input: T::Input) -> Result<T, DatabaseError>;

    async fn update(&self, id: Uuid, input: T::Input) -> Result<Option<T>, DatabaseError>;

    /// Returns whether a row was removed
    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;

    /// Sets `order_index = position + 1` for every id in one transaction.
    ///
    /// Fails without persisting anything when `ids` has duplicates, does not
    /// cover the whole collection, or names a row that does not exist.
    async fn reorder(&self, ids: &[Uuid]) -> Result<(), DatabaseError>;
}
