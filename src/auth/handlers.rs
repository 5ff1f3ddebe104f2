use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::instrument;

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RegisterRequest},
        extractors::AuthUser,
    },
    error::AppResult,
    extract::ApiJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup))
        .route("/auth/authentication", post(check_authentication))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let out = state.auth.login(payload).await?;
    Ok(Json(out))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let out = state.auth.register_user(payload).await?;
    Ok((StatusCode::CREATED, Json(out)))
}

#[instrument(skip(state, email))]
pub async fn check_authentication(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
) -> AppResult<Json<AuthResponse>> {
    let out = state.auth.check_authentication(&email).await?;
    Ok(Json(out))
}
