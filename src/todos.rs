//! ToDo lifecycle engine.
//!
//! Each operation is a fixed pipeline; the first failing step ends it and its
//! error is the whole answer. Callers arrive already authenticated: the id
//! passed in is the one the bearer token proved.

use crate::auth::authorize;
use crate::error::AppError;
use crate::models::{Todo, TodoDraft, User};
use crate::payload::parse_json;
use crate::store::{Store, StoreError, TodoChanges};

/// Upper bound on the number of ToDos returned by a listing.
pub const LIST_LIMIT: i64 = 100;

pub struct TodoLifecycle<'a> {
    store: &'a dyn Store,
}

impl<'a> TodoLifecycle<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Creates a ToDo owned by `caller` from a JSON body.
    ///
    /// The owner is always the caller; an `author_id` in the body is ignored.
    /// A caller whose account no longer exists is rejected as unauthorized.
    pub async fn create(&self, caller: i32, body: &[u8]) -> Result<Todo, AppError> {
        let draft: TodoDraft = parse_json(body)?;

        self.store.find_user(caller).await.map_err(|e| match e {
            StoreError::NotFound => AppError::Unauthorized,
            other => AppError::from(other),
        })?;

        let mut todo = Todo::from_draft(draft, 0, caller);
        todo.prepare();
        reject_invalid(&todo)?;

        let created = self.store.insert_todo(&todo).await?;
        log::info!("user {} created todo {}", caller, created.id);
        Ok(created)
    }

    /// Replaces title and content of a ToDo the caller owns.
    ///
    /// Title and content are both required on every update; nothing is merged
    /// from the stored record. Owner and creation time never change.
    pub async fn update(&self, caller: i32, todo_id: i64, body: &[u8]) -> Result<Todo, AppError> {
        let existing = self.load(todo_id).await?;
        authorize(caller, existing.author_id)?;

        let draft: TodoDraft = parse_json(body)?;
        let mut todo = Todo::from_draft(draft, existing.id, existing.author_id);
        todo.prepare();
        reject_invalid(&todo)?;

        let changes = TodoChanges {
            title: todo.title,
            content: todo.content,
            updated_at: todo.updated_at,
        };
        self.store
            .update_todo(existing.id, &changes)
            .await
            .map_err(not_found_as_todo)?;

        let mut updated = self.load(existing.id).await?;
        updated.author = self.owner_snapshot(updated.author_id).await?;
        log::info!("user {} updated todo {}", caller, updated.id);
        Ok(updated)
    }

    /// Deletes a ToDo the caller owns.
    pub async fn delete(&self, caller: i32, todo_id: i64) -> Result<(), AppError> {
        let existing = self.load(todo_id).await?;
        authorize(caller, existing.author_id)?;

        let removed = self.store.delete_todo(existing.id).await?;
        if removed == 0 {
            // Lost a race with another delete.
            return Err(AppError::TodoNotFound);
        }
        log::info!("user {} deleted todo {}", caller, existing.id);
        Ok(())
    }

    /// Lists up to [`LIST_LIMIT`] ToDos of `owner_id`, newest first, each with
    /// its owner attached. No ToDos is an empty list, not an error.
    ///
    /// Any authenticated caller may list any user's ToDos.
    pub async fn list_by_owner(&self, owner_id: i32) -> Result<Vec<Todo>, AppError> {
        let mut todos = self.store.find_todos_by_author(owner_id, LIST_LIMIT).await?;
        if todos.is_empty() {
            return Ok(todos);
        }

        let owner = self.owner_snapshot(owner_id).await?;
        for todo in todos.iter_mut() {
            todo.author = owner.clone();
        }
        Ok(todos)
    }

    async fn load(&self, todo_id: i64) -> Result<Todo, AppError> {
        self.store.find_todo(todo_id).await.map_err(not_found_as_todo)
    }

    /// The owner as it is right now. A vanished owner yields no snapshot.
    async fn owner_snapshot(&self, owner_id: i32) -> Result<Option<User>, AppError> {
        match self.store.find_user(owner_id).await {
            Ok(user) => Ok(Some(user)),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn reject_invalid(todo: &Todo) -> Result<(), AppError> {
    let errors = todo.check();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

fn not_found_as_todo(error: StoreError) -> AppError {
    match error {
        StoreError::NotFound => AppError::TodoNotFound,
        other => AppError::from(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::store::{MemoryStore, TodoStore, UserStore};
    use serde_json::json;

    async fn store_with_users() -> (MemoryStore, i32, i32) {
        let store = MemoryStore::new();
        let a = store
            .insert_user(&NewUser::new("alice", "alice@example.com", "hash".into()))
            .await
            .unwrap();
        let b = store
            .insert_user(&NewUser::new("bob", "bob@example.com", "hash".into()))
            .await
            .unwrap();
        (store, a.id, b.id)
    }

    fn body(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[actix_rt::test]
    async fn test_create_binds_owner_to_caller() {
        let (store, alice, bob) = store_with_users().await;
        let engine = TodoLifecycle::new(&store);

        let created = engine
            .create(
                alice,
                &body(json!({"title": " Dance class ", "content": "find a class", "author_id": bob})),
            )
            .await
            .unwrap();
        assert_eq!(created.author_id, alice);
        assert_eq!(created.title, "Dance class");
        assert!(created.id > 0);
    }

    #[actix_rt::test]
    async fn test_create_reports_every_missing_field() {
        let (store, alice, _) = store_with_users().await;
        let engine = TodoLifecycle::new(&store);

        match engine.create(alice, &body(json!({"title": "", "content": "  "}))).await {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors.len(), 2);
                assert!(errors.contains("Required_title"));
                assert!(errors.contains("Required_content"));
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_create_treats_null_title_as_missing() {
        let (store, alice, _) = store_with_users().await;
        let engine = TodoLifecycle::new(&store);

        match engine.create(alice, &body(json!({"title": null, "content": "x"}))).await {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors.get("Required_title"), Some("Required Title"));
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_create_ignores_oversized_author_id() {
        let (store, alice, _) = store_with_users().await;
        let engine = TodoLifecycle::new(&store);

        let created = engine
            .create(
                alice,
                &body(json!({"title": "big owner", "content": "x", "author_id": 3_000_000_000u64})),
            )
            .await
            .unwrap();
        assert_eq!(created.author_id, alice);

        let result = engine
            .create(alice, &body(json!({"id": -5, "title": "negative id", "content": "x"})))
            .await;
        assert!(matches!(result, Err(AppError::MalformedBody(_))));
    }

    #[actix_rt::test]
    async fn test_create_rejects_vanished_caller() {
        let (store, _, _) = store_with_users().await;
        let engine = TodoLifecycle::new(&store);

        let result = engine
            .create(404, &body(json!({"title": "t", "content": "c"})))
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[actix_rt::test]
    async fn test_update_keeps_owner_and_creation_time() {
        let (store, alice, bob) = store_with_users().await;
        let engine = TodoLifecycle::new(&store);
        let created = engine
            .create(alice, &body(json!({"title": "Dance class", "content": "find a class"})))
            .await
            .unwrap();

        let updated = engine
            .update(
                alice,
                created.id,
                &body(json!({"id": 999, "title": "Dance class", "content": "booked", "author_id": bob})),
            )
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.author_id, alice);
        assert_eq!(updated.content, "booked");
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.author.as_ref().map(|u| u.id), Some(alice));

        let stored = store.find_todo(created.id).await.unwrap();
        assert_eq!(stored.author_id, alice);
    }

    #[actix_rt::test]
    async fn test_update_by_other_user_is_unauthorized() {
        let (store, alice, bob) = store_with_users().await;
        let engine = TodoLifecycle::new(&store);
        let created = engine
            .create(alice, &body(json!({"title": "mine", "content": "c"})))
            .await
            .unwrap();

        let result = engine
            .update(bob, created.id, &body(json!({"title": "theirs", "content": "c"})))
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
        assert_eq!(store.find_todo(created.id).await.unwrap().title, "mine");
    }

    #[actix_rt::test]
    async fn test_update_checks_ownership_before_body() {
        let (store, alice, bob) = store_with_users().await;
        let engine = TodoLifecycle::new(&store);
        let created = engine
            .create(alice, &body(json!({"title": "mine", "content": "c"})))
            .await
            .unwrap();

        let result = engine.update(bob, created.id, b"not json").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));

        let result = engine.update(alice, created.id, b"not json").await;
        assert!(matches!(result, Err(AppError::MalformedBody(_))));
    }

    #[actix_rt::test]
    async fn test_update_missing_todo() {
        let (store, alice, _) = store_with_users().await;
        let engine = TodoLifecycle::new(&store);
        let result = engine
            .update(alice, 12345, &body(json!({"title": "t", "content": "c"})))
            .await;
        assert!(matches!(result, Err(AppError::TodoNotFound)));
    }

    #[actix_rt::test]
    async fn test_delete_then_load_is_not_found() {
        let (store, alice, bob) = store_with_users().await;
        let engine = TodoLifecycle::new(&store);
        let created = engine
            .create(alice, &body(json!({"title": "short lived", "content": "c"})))
            .await
            .unwrap();

        assert!(matches!(
            engine.delete(bob, created.id).await,
            Err(AppError::Unauthorized)
        ));
        engine.delete(alice, created.id).await.unwrap();
        assert!(matches!(
            engine.delete(alice, created.id).await,
            Err(AppError::TodoNotFound)
        ));
        assert!(matches!(
            engine
                .update(alice, created.id, &body(json!({"title": "t", "content": "c"})))
                .await,
            Err(AppError::TodoNotFound)
        ));
    }

    #[actix_rt::test]
    async fn test_list_by_owner() {
        let (store, alice, bob) = store_with_users().await;
        let engine = TodoLifecycle::new(&store);
        for title in ["first", "second"] {
            engine
                .create(alice, &body(json!({"title": title, "content": "c"})))
                .await
                .unwrap();
        }

        let todos = engine.list_by_owner(alice).await.unwrap();
        assert_eq!(todos.len(), 2);
        assert_eq!(todos[0].title, "second");
        assert!(todos.iter().all(|t| t.author.as_ref().map(|u| u.id) == Some(alice)));

        assert!(engine.list_by_owner(bob).await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn test_list_is_capped() {
        let (store, alice, _) = store_with_users().await;
        let engine = TodoLifecycle::new(&store);
        for i in 0..(LIST_LIMIT + 5) {
            engine
                .create(alice, &body(json!({"title": format!("todo {}", i), "content": "c"})))
                .await
                .unwrap();
        }
        let todos = engine.list_by_owner(alice).await.unwrap();
        assert_eq!(todos.len() as i64, LIST_LIMIT);
    }
}
