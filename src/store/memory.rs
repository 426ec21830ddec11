use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::models::{NewUser, Todo, User};
use crate::store::{StoreError, TodoChanges, TodoStore, UserStore};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    todos: BTreeMap<i64, Todo>,
    next_user_id: i32,
    next_todo_id: i64,
}

/// In-process store with the same constraints as the PostgreSQL schema:
/// unique username, email and title, and ToDo authors must exist.
///
/// Every operation takes the single lock for its whole duration, so writes to
/// the same record are serialized.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &NewUser) -> Result<User, StoreError> {
        let mut tables = self.lock()?;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict("username".into()));
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("email".into()));
        }

        tables.next_user_id += 1;
        let now = Utc::now();
        let created = User {
            id: tables.next_user_id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_user(&self, id: i32) -> Result<User, StoreError> {
        self.lock()?.users.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.lock()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn insert_todo(&self, todo: &Todo) -> Result<Todo, StoreError> {
        let mut tables = self.lock()?;
        if !tables.users.contains_key(&todo.author_id) {
            return Err(StoreError::Backend(format!(
                "foreign key violation: user {} does not exist",
                todo.author_id
            )));
        }
        if tables.todos.values().any(|t| t.title == todo.title) {
            return Err(StoreError::Conflict("title".into()));
        }

        tables.next_todo_id += 1;
        let mut created = todo.clone();
        created.id = tables.next_todo_id;
        created.author = None;
        tables.todos.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_todo(&self, id: i64) -> Result<Todo, StoreError> {
        self.lock()?.todos.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn update_todo(&self, id: i64, changes: &TodoChanges) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if tables
            .todos
            .values()
            .any(|t| t.id != id && t.title == changes.title)
        {
            return Err(StoreError::Conflict("title".into()));
        }

        let todo = tables.todos.get_mut(&id).ok_or(StoreError::NotFound)?;
        todo.title = changes.title.clone();
        todo.content = changes.content.clone();
        todo.updated_at = changes.updated_at;
        Ok(())
    }

    async fn delete_todo(&self, id: i64) -> Result<u64, StoreError> {
        let removed = self.lock()?.todos.remove(&id);
        Ok(u64::from(removed.is_some()))
    }

    async fn find_todos_by_author(
        &self,
        author_id: i32,
        limit: i64,
    ) -> Result<Vec<Todo>, StoreError> {
        let tables = self.lock()?;
        let mut todos: Vec<Todo> = tables
            .todos
            .values()
            .filter(|t| t.author_id == author_id)
            .cloned()
            .collect();
        // Ids break ties so that equal timestamps still list newest first.
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        todos.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(todos)
    }
}
