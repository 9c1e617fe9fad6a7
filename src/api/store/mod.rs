//! Persistence capabilities used by the gates and handlers.
//!
//! The server wires [`PgStore`]; tests build their own [`MemoryStore`]. Lookups
//! return `Ok(None)` for missing rows so callers decide which error kind a miss
//! becomes (the authentication gate turns a missing user into `401`, the
//! ownership gate turns a missing todo into `404`).

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::{PgStore, SCHEMA_SQL};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::api::error::ApiError;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique constraint violation (duplicate email).
    #[error("unique constraint violated")]
    Conflict,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => Self::conflict("email has been used"),
            StoreError::Database(e) => Self::internal(e),
        }
    }
}

/// Persisted user. `password_hash` never leaves the process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Clone, Debug)]
pub struct UserChanges {
    pub name: String,
    pub email: String,
}

/// Persisted todo, serialized with the public field names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct Todo {
    pub id: i64,
    #[serde(skip)]
    pub user_id: i64,
    /// Todo text.
    pub todos: String,
    /// Completion flag.
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct TodoChanges {
    pub todos: String,
    pub status: bool,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user, `StoreError::Conflict` when the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;
    async fn fetch_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
    async fn fetch_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    /// Update name and email. `Ok(None)` when the user does not exist.
    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>, StoreError>;

    /// Round-trip to the backend for health reporting.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn create(&self, owner_id: i64, todos: String) -> Result<Todo, StoreError>;
    async fn fetch_by_id(&self, id: i64) -> Result<Option<Todo>, StoreError>;
    /// Todos owned by `owner_id`, oldest first.
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Todo>, StoreError>;
    async fn update(&self, id: i64, changes: TodoChanges) -> Result<Option<Todo>, StoreError>;
    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}
