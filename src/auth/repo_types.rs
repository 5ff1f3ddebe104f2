use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
///
/// Deliberately not `Serialize`: responses go through `PublicUser`.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,                            // unique user ID
    pub name: String,                        // display name
    pub email: String,                       // unique, case-sensitive
    pub password_hash: String,               // Argon2 hash
    pub created_at: OffsetDateTime,          // creation timestamp
    pub updated_at: OffsetDateTime,          // last update timestamp
    pub deleted_at: Option<OffsetDateTime>,  // soft-delete marker
}

/// Fields needed to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}
