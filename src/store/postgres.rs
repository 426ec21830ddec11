use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::models::{NewUser, Todo, User};
use crate::store::{StoreError, TodoChanges, TodoStore, UserStore};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at, updated_at";
const TODO_COLUMNS: &str = "id, title, content, author_id, created_at, updated_at";

/// PostgreSQL-backed store. The schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and brings the schema up to date.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(format!("migration failed: {}", e)))?;
        Ok(Self::new(pool))
    }
}

/// Converts `sqlx::Error` into `StoreError`.
///
/// `RowNotFound` becomes `NotFound`; unique violations name the column taken
/// from the constraint (`todos_title_key` -> `title`).
impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> StoreError {
        match &error {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                let field = db_err
                    .constraint()
                    .and_then(|name| {
                        ["title", "email", "username"]
                            .into_iter()
                            .find(|field| name.contains(field))
                    })
                    .unwrap_or("record");
                StoreError::Conflict(field.to_string())
            }
            _ => StoreError::Backend(error.to_string()),
        }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: &NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn find_user(&self, id: i32) -> Result<User, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn insert_todo(&self, todo: &Todo) -> Result<Todo, StoreError> {
        let sql = format!(
            "INSERT INTO todos (title, content, author_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            TODO_COLUMNS
        );
        let created = sqlx::query_as::<_, Todo>(&sql)
            .bind(&todo.title)
            .bind(&todo.content)
            .bind(todo.author_id)
            .bind(todo.created_at)
            .bind(todo.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn find_todo(&self, id: i64) -> Result<Todo, StoreError> {
        let sql = format!("SELECT {} FROM todos WHERE id = $1", TODO_COLUMNS);
        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(todo)
    }

    async fn update_todo(&self, id: i64, changes: &TodoChanges) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE todos SET title = $1, content = $2, updated_at = $3 WHERE id = $4")
                .bind(&changes.title)
                .bind(&changes.content)
                .bind(changes.updated_at)
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_todo(&self, id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn find_todos_by_author(
        &self,
        author_id: i32,
        limit: i64,
    ) -> Result<Vec<Todo>, StoreError> {
        let sql = format!(
            "SELECT {} FROM todos WHERE author_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2",
            TODO_COLUMNS
        );
        let todos = sqlx::query_as::<_, Todo>(&sql)
            .bind(author_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(todos)
    }
}
