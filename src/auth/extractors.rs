use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;
use uuid::Uuid;

use crate::{
    auth::jwt::JwtKeys,
    error::{AppError, ErrorKind},
    state::AppState,
};

/// Caller whose bearer token was verified; holds the token subject email.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Read Authorization header
        let auth = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("authorization header is required"))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized("invalid authorization header format"))?;

        let email = JwtKeys::from_ref(state).verify_token(token)?;
        Ok(AuthUser(email))
    }
}

/// Verified caller resolved to the owning user's id.
#[derive(Debug, Clone, Copy)]
pub struct CurrentOwner(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for CurrentOwner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(email) = AuthUser::from_request_parts(parts, state).await?;
        match state.users.get_user_by_email(&email).await {
            Ok(user) => Ok(CurrentOwner(user.id)),
            // A valid token for an account that no longer resolves is not a missing todo.
            Err(e) if e.kind == ErrorKind::NotFound => {
                warn!("token subject does not resolve to an active user");
                Err(AppError::unauthorized("invalid or expired token").with_cause(e))
            }
            Err(e) => Err(e),
        }
    }
}
