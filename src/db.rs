use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{config::AppConfig, error::AppError};

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is not set")?;
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(url)
        .await
        .context("connect to database")
}

pub async fn migrate(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")
}

/// Classifies a storage error into the application taxonomy.
///
/// This is the only place where driver-specific error text is inspected.
pub fn classify(err: sqlx::Error, resource: &str) -> AppError {
    if matches!(err, sqlx::Error::RowNotFound) {
        return AppError::not_found(format!("{resource} not found")).with_cause(err);
    }

    let text = err.to_string();
    let classified = if is_duplicate_error(&text) {
        AppError::already_exists(format!("{resource} already exists"))
    } else if is_foreign_key_error(&text) {
        AppError::validation(format!("invalid reference in {resource}"))
    } else {
        AppError::internal(format!(
            "database error occurred while processing {resource}"
        ))
    };
    classified.with_cause(err)
}

fn is_duplicate_error(text: &str) -> bool {
    text.contains("duplicate key value violates unique constraint") // PostgreSQL
        || text.contains("Error 1062: Duplicate entry") // MySQL
}

fn is_foreign_key_error(text: &str) -> bool {
    text.contains("violates foreign key constraint") // PostgreSQL
        || text.contains("Error 1452: Cannot add or update a child row") // MySQL
}
