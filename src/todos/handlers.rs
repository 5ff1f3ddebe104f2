use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::extractors::CurrentOwner,
    error::AppResult,
    extract::{ApiJson, ApiPath},
    state::AppState,
    todos::dto::{TodoListResponse, TodoRequest, TodoResponse},
};

pub fn todo_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/:id",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
}

#[instrument(skip(state))]
pub async fn list_todos(
    State(state): State<AppState>,
    CurrentOwner(owner_id): CurrentOwner,
) -> AppResult<Json<TodoListResponse>> {
    Ok(Json(state.todos.list_todo(owner_id).await?))
}

#[instrument(skip(state))]
pub async fn get_todo(
    State(state): State<AppState>,
    CurrentOwner(owner_id): CurrentOwner,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<TodoResponse>> {
    Ok(Json(state.todos.get_todo(id, owner_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_todo(
    State(state): State<AppState>,
    CurrentOwner(owner_id): CurrentOwner,
    ApiJson(payload): ApiJson<TodoRequest>,
) -> AppResult<(StatusCode, Json<TodoResponse>)> {
    let todo = state.todos.create_todo(owner_id, payload).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

#[instrument(skip(state, payload))]
pub async fn update_todo(
    State(state): State<AppState>,
    CurrentOwner(owner_id): CurrentOwner,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<TodoRequest>,
) -> AppResult<Json<TodoResponse>> {
    Ok(Json(state.todos.update_todo(id, owner_id, payload).await?))
}

#[instrument(skip(state))]
pub async fn delete_todo(
    State(state): State<AppState>,
    CurrentOwner(owner_id): CurrentOwner,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<StatusCode> {
    state.todos.delete_todo(id, owner_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
