use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered account. Owns zero or more ToDos.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    /// bcrypt hash of the password. Never serialized into responses.
    #[serde(default, skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user about to be inserted; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    /// Normalizes the identity fields the same way they are compared on login.
    pub fn new(username: &str, email: &str, password_hash: String) -> Self {
        Self {
            username: username.trim().to_string(),
            email: email.trim().to_lowercase(),
            password_hash,
        }
    }
}
