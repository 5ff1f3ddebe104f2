use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    auth::repo_types::{NewUser, User},
    db,
    error::AppResult,
};

const RESOURCE: &str = "user";

/// Persistence contract for users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Active (not soft-deleted) user with exactly this email, or `NotFound`.
    async fn find_by_email(&self, email: &str) -> AppResult<User>;

    /// `AlreadyExists` when the email is taken.
    async fn create(&self, new_user: NewUser<'_>) -> AppResult<User>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at, deleted_at
            FROM users
            WHERE email = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(email)
        .fetch_one(&self.db)
        .await
        .map_err(|e| db::classify(e, RESOURCE))
    }

    async fn create(&self, new_user: NewUser<'_>) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, created_at, updated_at, deleted_at
            "#,
        )
        .bind(new_user.name)
        .bind(new_user.email)
        .bind(new_user.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| db::classify(e, RESOURCE))
    }
}
