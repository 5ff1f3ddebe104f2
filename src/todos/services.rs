use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    todos::{
        dto::{TodoListResponse, TodoRequest, TodoResponse},
        repo::TodoRepository,
    },
};

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_CONTENT_LEN: usize = 1000;

fn require_id(id: Uuid, field: &str) -> AppResult<()> {
    if id.is_nil() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(())
}

impl TodoRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.title.is_empty() {
            return Err(AppError::validation("title is required"));
        }
        if self.title.chars().count() > MAX_TITLE_LEN {
            return Err(AppError::validation(format!(
                "title must be at most {MAX_TITLE_LEN} characters"
            )));
        }
        if let Some(content) = &self.content {
            if content.chars().count() > MAX_CONTENT_LEN {
                return Err(AppError::validation(format!(
                    "content must be at most {MAX_CONTENT_LEN} characters"
                )));
            }
        }
        Ok(())
    }
}

/// Todo operations. Every call is scoped to an already resolved owner.
#[async_trait]
pub trait TodoUseCase: Send + Sync {
    async fn list_todo(&self, owner_id: Uuid) -> AppResult<TodoListResponse>;
    async fn get_todo(&self, id: Uuid, owner_id: Uuid) -> AppResult<TodoResponse>;
    async fn create_todo(&self, owner_id: Uuid, input: TodoRequest) -> AppResult<TodoResponse>;
    async fn update_todo(
        &self,
        id: Uuid,
        owner_id: Uuid,
        input: TodoRequest,
    ) -> AppResult<TodoResponse>;
    async fn delete_todo(&self, id: Uuid, owner_id: Uuid) -> AppResult<()>;
}

pub struct TodoService {
    todos: Arc<dyn TodoRepository>,
}

impl TodoService {
    pub fn new(todos: Arc<dyn TodoRepository>) -> Self {
        Self { todos }
    }
}

#[async_trait]
impl TodoUseCase for TodoService {
    async fn list_todo(&self, owner_id: Uuid) -> AppResult<TodoListResponse> {
        require_id(owner_id, "user_id")?;
        let todos: Vec<TodoResponse> = self
            .todos
            .find_all(owner_id)
            .await?
            .into_iter()
            .map(TodoResponse::from)
            .collect();
        Ok(TodoListResponse {
            total: todos.len(),
            todos,
        })
    }

    async fn get_todo(&self, id: Uuid, owner_id: Uuid) -> AppResult<TodoResponse> {
        require_id(id, "id")?;
        require_id(owner_id, "user_id")?;
        Ok(self.todos.find_by_id(id, owner_id).await?.into())
    }

    async fn create_todo(&self, owner_id: Uuid, input: TodoRequest) -> AppResult<TodoResponse> {
        require_id(owner_id, "user_id")?;
        input.validate()?;
        let todo = self
            .todos
            .create(owner_id, &input.title, input.content.as_deref())
            .await?;
        info!(todo_id = %todo.id, %owner_id, "todo created");
        Ok(todo.into())
    }

    async fn update_todo(
        &self,
        id: Uuid,
        owner_id: Uuid,
        input: TodoRequest,
    ) -> AppResult<TodoResponse> {
        require_id(id, "id")?;
        require_id(owner_id, "user_id")?;
        input.validate()?;

        // The write below is itself conditional on (id, owner_id), so a row that
        // disappears after this check surfaces as NotFound.
        self.todos.find_by_id(id, owner_id).await?;
        let todo = self
            .todos
            .update(id, owner_id, &input.title, input.content.as_deref())
            .await?;
        debug!(todo_id = %todo.id, %owner_id, "todo updated");
        Ok(todo.into())
    }

    async fn delete_todo(&self, id: Uuid, owner_id: Uuid) -> AppResult<()> {
        require_id(id, "id")?;
        require_id(owner_id, "user_id")?;

        self.todos.find_by_id(id, owner_id).await?;
        self.todos.delete(id, owner_id).await?;
        info!(todo_id = %id, %owner_id, "todo deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, memory::InMemoryTodoRepository, todos::repo_types::Todo};

    fn service() -> TodoService {
        TodoService::new(Arc::new(InMemoryTodoRepository::new()))
    }

    fn req(title: &str, content: Option<&str>) -> TodoRequest {
        TodoRequest {
            title: title.into(),
            content: content.map(Into::into),
        }
    }

    #[tokio::test]
    async fn create_then_get_returns_same_fields() {
        let svc = service();
        let owner = Uuid::new_v4();
        let created = svc
            .create_todo(owner, req("buy milk", Some("2 litres")))
            .await
            .unwrap();
        let fetched = svc.get_todo(created.id, owner).await.unwrap();
        assert_eq!(fetched.title, "buy milk");
        assert_eq!(fetched.content.as_deref(), Some("2 litres"));
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn other_owner_always_gets_not_found() {
        let svc = service();
        let (ann, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let todo = svc.create_todo(ann, req("secret", None)).await.unwrap();

        let get = svc.get_todo(todo.id, bob).await.unwrap_err();
        let update = svc
            .update_todo(todo.id, bob, req("mine now", None))
            .await
            .unwrap_err();
        let delete = svc.delete_todo(todo.id, bob).await.unwrap_err();
        for err in [get, update, delete] {
            assert_eq!(err.kind, ErrorKind::NotFound);
            assert_eq!(err.message, "todo not found");
        }

        // Untouched for the real owner.
        assert_eq!(svc.get_todo(todo.id, ann).await.unwrap().title, "secret");
        assert_eq!(svc.list_todo(bob).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn delete_twice_is_ok_then_not_found() {
        let svc = service();
        let owner = Uuid::new_v4();
        let todo = svc.create_todo(owner, req("once", None)).await.unwrap();
        svc.delete_todo(todo.id, owner).await.unwrap();
        let err = svc.delete_todo(todo.id, owner).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn title_and_content_length_boundaries() {
        let svc = service();
        let owner = Uuid::new_v4();

        let title_max = "t".repeat(MAX_TITLE_LEN);
        let content_max = "c".repeat(MAX_CONTENT_LEN);
        assert!(svc.create_todo(owner, req(&title_max, None)).await.is_ok());
        assert!(svc
            .create_todo(owner, req("ok", Some(&content_max)))
            .await
            .is_ok());

        let title_over = "t".repeat(MAX_TITLE_LEN + 1);
        let content_over = "c".repeat(MAX_CONTENT_LEN + 1);
        for input in [req(&title_over, None), req("ok", Some(&content_over)), req("", None)] {
            let err = svc.create_todo(owner, input).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::ValidationError);
        }
        assert_eq!(svc.list_todo(owner).await.unwrap().total, 2);
    }

    #[tokio::test]
    async fn lengths_count_characters_not_bytes() {
        let svc = service();
        let owner = Uuid::new_v4();
        let title = "é".repeat(MAX_TITLE_LEN);
        assert!(svc.create_todo(owner, req(&title, None)).await.is_ok());
    }

    #[tokio::test]
    async fn update_replaces_title_and_content() {
        let svc = service();
        let owner = Uuid::new_v4();
        let todo = svc
            .create_todo(owner, req("draft", Some("notes")))
            .await
            .unwrap();
        let updated = svc
            .update_todo(todo.id, owner, req("final", None))
            .await
            .unwrap();
        assert_eq!(updated.id, todo.id);
        assert_eq!(updated.title, "final");
        assert_eq!(updated.content, None);
        assert!(updated.updated_at >= todo.updated_at);
    }

    #[tokio::test]
    async fn update_validates_before_lookup() {
        let svc = service();
        let err = svc
            .update_todo(Uuid::new_v4(), Uuid::new_v4(), req("", None))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValidationError);
    }

    #[tokio::test]
    async fn nil_ids_are_validation_errors() {
        let svc = service();
        let owner = Uuid::new_v4();
        assert_eq!(
            svc.get_todo(Uuid::nil(), owner).await.unwrap_err().kind,
            ErrorKind::ValidationError
        );
        assert_eq!(
            svc.delete_todo(Uuid::new_v4(), Uuid::nil()).await.unwrap_err().kind,
            ErrorKind::ValidationError
        );
        assert_eq!(
            svc.list_todo(Uuid::nil()).await.unwrap_err().kind,
            ErrorKind::ValidationError
        );
    }

    #[tokio::test]
    async fn list_counts_only_owned_items() {
        let svc = service();
        let (ann, bob) = (Uuid::new_v4(), Uuid::new_v4());
        svc.create_todo(ann, req("a1", None)).await.unwrap();
        svc.create_todo(ann, req("a2", None)).await.unwrap();
        svc.create_todo(bob, req("b1", None)).await.unwrap();
        let list = svc.list_todo(ann).await.unwrap();
        assert_eq!(list.total, 2);
        assert!(list.todos.iter().all(|t| t.title.starts_with('a')));
    }

    /// Lets the pre-check see the row, then drops it before the write lands.
    struct VanishingTodos(InMemoryTodoRepository);

    #[async_trait]
    impl TodoRepository for VanishingTodos {
        async fn find_all(&self, owner_id: Uuid) -> AppResult<Vec<Todo>> {
            self.0.find_all(owner_id).await
        }

        async fn find_by_id(&self, id: Uuid, owner_id: Uuid) -> AppResult<Todo> {
            self.0.find_by_id(id, owner_id).await
        }

        async fn create(&self, owner_id: Uuid, title: &str, content: Option<&str>) -> AppResult<Todo> {
            self.0.create(owner_id, title, content).await
        }

        async fn update(
            &self,
            id: Uuid,
            owner_id: Uuid,
            title: &str,
            content: Option<&str>,
        ) -> AppResult<Todo> {
            self.0.delete(id, owner_id).await?;
            self.0.update(id, owner_id, title, content).await
        }

        async fn delete(&self, id: Uuid, owner_id: Uuid) -> AppResult<()> {
            self.0.delete(id, owner_id).await?;
            self.0.delete(id, owner_id).await
        }
    }

    #[tokio::test]
    async fn row_removed_after_precheck_is_not_found() {
        let svc = TodoService::new(Arc::new(VanishingTodos(InMemoryTodoRepository::new())));
        let owner = Uuid::new_v4();

        let todo = svc.create_todo(owner, req("racy", None)).await.unwrap();
        let err = svc
            .update_todo(todo.id, owner, req("too late", None))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let todo = svc.create_todo(owner, req("racy", None)).await.unwrap();
        let err = svc.delete_todo(todo.id, owner).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
