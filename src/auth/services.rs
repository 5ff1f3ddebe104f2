use std::sync::Arc;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::UserRepository,
        repo_types::{NewUser, User},
    },
    error::{AppError, AppResult, ErrorKind},
};

const MAX_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 100;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 100;

const INVALID_CREDENTIALS: &str = "invalid email or password";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
    }
    EMAIL_RE.is_match(email)
}

fn require(value: &str, field: &str) -> AppResult<()> {
    if value.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(())
}

impl RegisterRequest {
    pub fn validate(&self) -> AppResult<()> {
        require(&self.name, "name")?;
        require(&self.email, "email")?;
        require(&self.password, "password")?;
        if self.name.chars().count() > MAX_NAME_LEN {
            return Err(AppError::validation(format!(
                "name must be at most {MAX_NAME_LEN} characters"
            )));
        }
        if self.email.chars().count() > MAX_EMAIL_LEN || !is_valid_email(&self.email) {
            return Err(AppError::validation("invalid email"));
        }
        let password_len = self.password.chars().count();
        if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&password_len) {
            return Err(AppError::validation(format!(
                "password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }
}

impl LoginRequest {
    pub fn validate(&self) -> AppResult<()> {
        require(&self.email, "email")?;
        require(&self.password, "password")
    }
}

/// Registration, login and token re-issue.
#[async_trait]
pub trait AuthUseCase: Send + Sync {
    async fn login(&self, input: LoginRequest) -> AppResult<AuthResponse>;
    async fn register_user(&self, input: RegisterRequest) -> AppResult<AuthResponse>;
    /// Re-resolves the subject of an already verified token and issues a fresh one.
    async fn check_authentication(&self, email: &str) -> AppResult<AuthResponse>;
}

/// Identity resolution: bearer subject email to owner.
#[async_trait]
pub trait UserUseCase: Send + Sync {
    async fn get_user_by_email(&self, email: &str) -> AppResult<PublicUser>;
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, keys: JwtKeys) -> Self {
        Self { users, keys }
    }

    fn issue(&self, user: &User) -> AppResult<AuthResponse> {
        let token = self.keys.generate_token(&user.email)?;
        Ok(AuthResponse {
            token,
            user: PublicUser::from(user),
        })
    }
}

lazy_static! {
    // Verified against when the email is unknown so both login failures cost the same.
    static ref DUMMY_HASH: Option<String> = hash_password("tasklist-dummy-password").ok();
}

#[async_trait]
impl AuthUseCase for AuthService {
    async fn login(&self, input: LoginRequest) -> AppResult<AuthResponse> {
        input.validate()?;

        let user = match self.users.find_by_email(&input.email).await {
            Ok(user) => user,
            Err(e) if e.kind == ErrorKind::NotFound => {
                if let Some(hash) = DUMMY_HASH.as_deref() {
                    let _ = verify_password(hash, &input.password);
                }
                warn!("login unknown email");
                return Err(AppError::unauthorized(INVALID_CREDENTIALS).with_cause(e));
            }
            Err(e) => return Err(e),
        };

        if !verify_password(&user.password_hash, &input.password)? {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let out = self.issue(&user)?;
        info!(user_id = %user.id, "user logged in");
        Ok(out)
    }

    async fn register_user(&self, input: RegisterRequest) -> AppResult<AuthResponse> {
        input.validate()?;

        let hash = hash_password(&input.password)?;
        let user = self
            .users
            .create(NewUser {
                name: &input.name,
                email: &input.email,
                password_hash: &hash,
            })
            .await?;

        let out = self.issue(&user)?;
        info!(user_id = %user.id, "user registered");
        Ok(out)
    }

    async fn check_authentication(&self, email: &str) -> AppResult<AuthResponse> {
        require(email, "email")?;
        let user = self.users.find_by_email(email).await?;
        self.issue(&user)
    }
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserUseCase for UserService {
    async fn get_user_by_email(&self, email: &str) -> AppResult<PublicUser> {
        require(email, "email")?;
        let user = self.users.find_by_email(email).await?;
        Ok(PublicUser::from(&user))
    }
}
