//! Multi-tenant task-list HTTP service.
//!
//! Users sign up and authenticate with a bearer token; every todo read or
//! write is scoped to the owner resolved from that token.

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod memory;
pub mod state;
pub mod todos;

pub use app::build_app;
pub use error::{AppError, AppResult, ErrorKind};
pub use state::AppState;
