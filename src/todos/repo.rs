use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db,
    error::{AppError, AppResult},
    todos::repo_types::Todo,
};

const RESOURCE: &str = "todo";

/// Persistence contract for todos. Every lookup and write is scoped to the owner.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn find_all(&self, owner_id: Uuid) -> AppResult<Vec<Todo>>;

    /// `NotFound` when the id is missing or belongs to another owner.
    async fn find_by_id(&self, id: Uuid, owner_id: Uuid) -> AppResult<Todo>;

    async fn create(&self, owner_id: Uuid, title: &str, content: Option<&str>) -> AppResult<Todo>;

    /// Conditional on `(id, owner_id)`; `NotFound` when no row matches.
    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        title: &str,
        content: Option<&str>,
    ) -> AppResult<Todo>;

    /// Conditional on `(id, owner_id)`; zero rows affected is `NotFound`.
    async fn delete(&self, id: Uuid, owner_id: Uuid) -> AppResult<()>;
}

#[derive(Clone)]
pub struct PgTodoRepository {
    db: PgPool,
}

impl PgTodoRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TodoRepository for PgTodoRepository {
    async fn find_all(&self, owner_id: Uuid) -> AppResult<Vec<Todo>> {
        sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, user_id, title, content, created_at, updated_at
            FROM todos
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await
        .map_err(|e| db::classify(e, RESOURCE))
    }

    async fn find_by_id(&self, id: Uuid, owner_id: Uuid) -> AppResult<Todo> {
        sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, user_id, title, content, created_at, updated_at
            FROM todos
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| db::classify(e, RESOURCE))
    }

    async fn create(&self, owner_id: Uuid, title: &str, content: Option<&str>) -> AppResult<Todo> {
        sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (user_id, title, content)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, title, content, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(title)
        .bind(content)
        .fetch_one(&self.db)
        .await
        .map_err(|e| db::classify(e, RESOURCE))
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        title: &str,
        content: Option<&str>,
    ) -> AppResult<Todo> {
        sqlx::query_as::<_, Todo>(
            r#"
            UPDATE todos
               SET title = $3, content = $4, updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, content, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(title)
        .bind(content)
        .fetch_one(&self.db)
        .await
        .map_err(|e| db::classify(e, RESOURCE))
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(r#"DELETE FROM todos WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(owner_id)
            .execute(&self.db)
            .await
            .map_err(|e| db::classify(e, RESOURCE))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("todo not found"));
        }
        Ok(())
    }
}
