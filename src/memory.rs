//! In-memory repositories, interchangeable with the Postgres ones.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::{
        repo::UserRepository,
        repo_types::{NewUser, User},
    },
    error::{AppError, AppResult},
    todos::{repo::TodoRepository, repo_types::Todo},
};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<User> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email == email && u.deleted_at.is_none())
            .cloned()
            .ok_or_else(|| AppError::not_found("user not found"))
    }

    async fn create(&self, new_user: NewUser<'_>) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == new_user.email) {
            return Err(AppError::already_exists("user already exists"));
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name.to_string(),
            email: new_user.email.to_string(),
            password_hash: new_user.password_hash.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[derive(Default)]
pub struct InMemoryTodoRepository {
    todos: RwLock<HashMap<Uuid, Todo>>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn find_all(&self, owner_id: Uuid) -> AppResult<Vec<Todo>> {
        let mut owned: Vec<Todo> = self
            .todos
            .read()
            .await
            .values()
            .filter(|t| t.user_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(owned)
    }

    async fn find_by_id(&self, id: Uuid, owner_id: Uuid) -> AppResult<Todo> {
        self.todos
            .read()
            .await
            .get(&id)
            .filter(|t| t.user_id == owner_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("todo not found"))
    }

    async fn create(&self, owner_id: Uuid, title: &str, content: Option<&str>) -> AppResult<Todo> {
        let now = OffsetDateTime::now_utc();
        let todo = Todo {
            id: Uuid::new_v4(),
            user_id: owner_id,
            title: title.to_string(),
            content: content.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        self.todos.write().await.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        title: &str,
        content: Option<&str>,
    ) -> AppResult<Todo> {
        let mut todos = self.todos.write().await;
        let todo = todos
            .get_mut(&id)
            .filter(|t| t.user_id == owner_id)
            .ok_or_else(|| AppError::not_found("todo not found"))?;
        todo.title = title.to_string();
        todo.content = content.map(str::to_string);
        todo.updated_at = OffsetDateTime::now_utc();
        Ok(todo.clone())
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> AppResult<()> {
        let mut todos = self.todos.write().await;
        match todos.get(&id) {
            Some(t) if t.user_id == owner_id => {
                todos.remove(&id);
                Ok(())
            }
            _ => Err(AppError::not_found("todo not found")),
        }
    }
}
