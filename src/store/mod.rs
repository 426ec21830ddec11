//! Persistence collaborator.
//!
//! The lifecycle engine talks to storage only through [`UserStore`] and
//! [`TodoStore`]. [`PgStore`] backs them with PostgreSQL; [`MemoryStore`] keeps
//! everything in-process for tests and database-less runs.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

use crate::models::{NewUser, Todo, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Failures reported by a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record matched the lookup.
    NotFound,
    /// A unique constraint rejected the write; carries the offending field name.
    Conflict(String),
    /// Any other backend failure. The text is for logs only.
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "record not found"),
            StoreError::Conflict(field) => write!(f, "duplicate value for {}", field),
            StoreError::Backend(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// The only fields an update is allowed to touch. Owner and creation time are
/// never part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoChanges {
    pub title: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: &NewUser) -> Result<User, StoreError>;

    async fn find_user(&self, id: i32) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<User, StoreError>;
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Persists a prepared ToDo and returns it with its assigned identifier.
    async fn insert_todo(&self, todo: &Todo) -> Result<Todo, StoreError>;

    async fn find_todo(&self, id: i64) -> Result<Todo, StoreError>;

    /// Applies a partial update. Returns `StoreError::NotFound` if nothing matched.
    async fn update_todo(&self, id: i64, changes: &TodoChanges) -> Result<(), StoreError>;

    /// Deletes by identifier and returns the number of rows removed.
    async fn delete_todo(&self, id: i64) -> Result<u64, StoreError>;

    /// ToDos owned by `author_id`, newest first, at most `limit` of them.
    async fn find_todos_by_author(&self, author_id: i32, limit: i64)
        -> Result<Vec<Todo>, StoreError>;
}

/// Everything the application needs from storage.
pub trait Store: UserStore + TodoStore {}

impl<T: UserStore + TodoStore> Store for T {}
