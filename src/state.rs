use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::{
    auth::{
        jwt::JwtKeys,
        repo::{PgUserRepository, UserRepository},
        services::{AuthService, AuthUseCase, UserService, UserUseCase},
    },
    config::{AppConfig, StorageBackend},
    db,
    memory::{InMemoryTodoRepository, InMemoryUserRepository},
    todos::{
        repo::{PgTodoRepository, TodoRepository},
        services::{TodoService, TodoUseCase},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
    pub auth: Arc<dyn AuthUseCase>,
    pub users: Arc<dyn UserUseCase>,
    pub todos: Arc<dyn TodoUseCase>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        match config.storage {
            StorageBackend::Postgres => {
                let pool = db::connect(&config).await?;
                Self::postgres(config, pool).await
            }
            StorageBackend::Memory => {
                tracing::warn!("using in-memory storage; data is lost on restart");
                Ok(Self::in_memory(config))
            }
        }
    }

    /// Applies pending migrations, then wires the Postgres repositories.
    /// A failed migration aborts startup.
    pub async fn postgres(config: AppConfig, pool: PgPool) -> anyhow::Result<Self> {
        db::migrate(&pool).await?;
        Ok(Self::from_parts(
            config,
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgTodoRepository::new(pool)),
        ))
    }

    /// Wires use cases over the given repositories.
    pub fn from_parts(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        todos: Arc<dyn TodoRepository>,
    ) -> Self {
        let keys = JwtKeys::new(&config.jwt);
        Self {
            auth: Arc::new(AuthService::new(users.clone(), keys.clone())),
            users: Arc::new(UserService::new(users)),
            todos: Arc::new(TodoService::new(todos)),
            keys,
            config: Arc::new(config),
        }
    }

    pub fn in_memory(config: AppConfig) -> Self {
        Self::from_parts(
            config,
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryTodoRepository::new()),
        )
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}
