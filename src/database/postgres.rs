use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::models::{Contact, ContactInput, Profile, ProfileInput, Project, ProjectInput, User};
use super::reorder;
use super::repository::{OrderedRecord, OrderedRepository, ProfileRepository, UserRepository};
use super::DatabaseError;

/// Postgres-backed repository for one ordered table.
pub struct PgRepository<T> {
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: OrderedRecord> PgRepository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    async fn select_all(&self) -> Result<Vec<T>, DatabaseError> {
        let sql = format!("SELECT * FROM {} ORDER BY {}", T::TABLE, T::ORDER_BY);
        Ok(sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?)
    }

    async fn select_one(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", T::TABLE);
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Deletes one row and closes the gap it leaves in `order_index`.
    async fn delete_one(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let delete_sql = format!("DELETE FROM {} WHERE id = $1 RETURNING order_index", T::TABLE);
        let removed: Option<(i32,)> = sqlx::query_as(&delete_sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some((removed,)) = removed else {
            tx.rollback().await?;
            return Ok(false);
        };

        let shift_sql = format!(
            "UPDATE {} SET order_index = order_index - 1 WHERE order_index > $1",
            T::TABLE
        );
        sqlx::query(&shift_sql).bind(removed).execute(&mut *tx).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn reorder_all(&self, ids: &[Uuid]) -> Result<(), DatabaseError> {
        reorder::ensure_unique(ids)?;

        let mut tx = self.pool.begin().await?;

        let count_sql = format!("SELECT COUNT(*) FROM {}", T::TABLE);
        let (existing,): (i64,) = sqlx::query_as(&count_sql).fetch_one(&mut *tx).await?;
        reorder::ensure_complete(ids.len(), existing)?;

        let update_sql = format!("UPDATE {} SET order_index = $1 WHERE id = $2", T::TABLE);
        for (position, id) in ids.iter().enumerate() {
            let result = sqlx::query(&update_sql)
                .bind(reorder::order_index_at(position))
                .bind(id)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                tx.rollback().await?;
                return Err(reorder::unknown_id(T::LABEL, *id));
            }
        }

        tx.commit().await?;
        debug!("Reordered {} {}", ids.len(), T::TABLE);
        Ok(())
    }
}

#[async_trait]
impl OrderedRepository<Project> for PgRepository<Project> {
    async fn list(&self) -> Result<Vec<Project>, DatabaseError> {
        self.select_all().await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Project>, DatabaseError> {
        self.select_one(id).await
    }

    async fn create(&self, input: ProjectInput) -> Result<Project, DatabaseError> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (title, description, image_url, technologies, github_url, live_url, order_index)
            SELECT $1, $2, $3, $4, $5, $6, COALESCE(MAX(order_index), 0) + 1 FROM projects
            RETURNING *
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(&input.technologies)
        .bind(&input.github_url)
        .bind(&input.live_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(project)
    }

    async fn update(&self, id: Uuid, input: ProjectInput) -> Result<Option<Project>, DatabaseError> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET title = $1, description = $2, image_url = $3, technologies = $4,
                github_url = $5, live_url = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(&input.technologies)
        .bind(&input.github_url)
        .bind(&input.live_url)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        self.delete_one(id).await
    }

    async fn reorder(&self, ids: &[Uuid]) -> Result<(), DatabaseError> {
        self.reorder_all(ids).await
    }
}

#[async_trait]
impl OrderedRepository<Contact> for PgRepository<Contact> {
    async fn list(&self) -> Result<Vec<Contact>, DatabaseError> {
        self.select_all().await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Contact>, DatabaseError> {
        self.select_one(id).await
    }

    async fn create(&self, input: ContactInput) -> Result<Contact, DatabaseError> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (type, value, url, icon, order_index)
            SELECT $1, $2, $3, $4, COALESCE(MAX(order_index), 0) + 1 FROM contacts
            RETURNING *
            "#,
        )
        .bind(&input.kind)
        .bind(&input.value)
        .bind(&input.url)
        .bind(&input.icon)
        .fetch_one(&self.pool)
        .await?;

        Ok(contact)
    }

    async fn update(&self, id: Uuid, input: ContactInput) -> Result<Option<Contact>, DatabaseError> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            UPDATE contacts
            SET type = $1, value = $2, url = $3, icon = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&input.kind)
        .bind(&input.value)
        .bind(&input.url)
        .bind(&input.icon)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(contact)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        self.delete_one(id).await
    }

    async fn reorder(&self, ids: &[Uuid]) -> Result<(), DatabaseError> {
        self.reorder_all(ids).await
    }
}

pub struct PgUsers {
    pool: PgPool,
}

impl PgUsers {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUsers {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at, updated_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }
}

pub struct PgProfile {
    pool: PgPool,
}

impl PgProfile {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfile {
    async fn get(&self) -> Result<Option<Profile>, DatabaseError> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn upsert(&self, input: ProfileInput) -> Result<Profile, DatabaseError> {
        // The unique `singleton` column turns a second insert into an update.
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (name, title, bio, image_url, skills)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (singleton) DO UPDATE
            SET name = EXCLUDED.name, title = EXCLUDED.title, bio = EXCLUDED.bio,
                image_url = EXCLUDED.image_url, skills = EXCLUDED.skills, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.title)
        .bind(&input.bio)
        .bind(&input.image_url)
        .bind(&input.skills)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }
}
