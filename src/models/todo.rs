use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::ErrorSet;
use crate::models::User;
use crate::security::sanitize_input;

/// A ToDo item as stored and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Validate)]
pub struct Todo {
    /// Identifier assigned by the store on insert.
    pub id: i64,
    /// Trimmed, HTML-escaped, unique across all ToDos.
    #[validate(length(min = 1, code = "Required_title", message = "Required Title"))]
    pub title: String,
    /// Trimmed, HTML-escaped.
    #[validate(length(min = 1, code = "Required_content", message = "Required Content"))]
    pub content: String,
    /// Snapshot of the owner, resolved at request time for responses only.
    /// Never persisted.
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
    /// Identifier of the owning user. Fixed at creation.
    #[validate(range(min = 1, code = "Required_author", message = "Required Author"))]
    pub author_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields a client may submit when creating or updating a ToDo.
///
/// Missing and `null` text fields decode to empty so the validator, not the
/// decoder, reports them. `id` and `author_id` must still be unsigned
/// integers of the right width, but their values are always overridden by
/// the server.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TodoDraft {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub author_id: Option<u32>,
}

impl Todo {
    /// Builds an unsaved ToDo from a client draft. Identity fields come from
    /// the caller, never from the draft.
    pub fn from_draft(draft: TodoDraft, id: i64, author_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: draft.title.unwrap_or_default(),
            content: draft.content.unwrap_or_default(),
            author: None,
            author_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Normalizes the record before validation and persistence: trims and
    /// escapes title and content, drops any embedded owner snapshot and stamps
    /// both timestamps with `now`.
    pub fn prepare_at(&mut self, now: DateTime<Utc>) {
        self.title = sanitize_input(&self.title);
        self.content = sanitize_input(&self.content);
        self.author = None;
        self.created_at = now;
        self.updated_at = now;
    }

    pub fn prepare(&mut self) {
        self.prepare_at(Utc::now());
    }

    /// Checks every field rule and reports all violations together.
    /// An empty set means the ToDo is valid.
    pub fn check(&self) -> ErrorSet {
        match self.validate() {
            Ok(()) => ErrorSet::new(),
            Err(errors) => ErrorSet::from(&errors),
        }
    }
}
