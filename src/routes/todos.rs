use actix_web::{http::StatusCode, web, Error as ActixError, HttpResponse};

use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    payload::parse_id,
    routes::respond,
    state::AppState,
    todos::TodoLifecycle,
};

/// Creates a ToDo owned by the authenticated user.
///
/// ## Request Body:
/// `{ "title": "...", "content": "..." }`. Any `author_id` is ignored.
///
/// ## Responses:
/// - `201 Created`: the created ToDo.
/// - `401 Unauthorized`: missing/invalid token, or the account no longer exists.
/// - `422 Unprocessable Entity`: unreadable body, undecodable JSON, or
///   `Required_title` / `Required_content` violations (all reported together).
/// - `500 Internal Server Error`: storage failure, e.g. `Taken_title`.
pub async fn create_todo(
    state: web::Data<AppState>,
    user: AuthenticatedUserId,
    body: Result<web::Bytes, ActixError>,
) -> Result<HttpResponse, AppError> {
    let body = body.map_err(|_| AppError::InvalidBody)?;
    let created = TodoLifecycle::new(state.store.as_ref())
        .create(user.0, &body)
        .await?;
    Ok(respond(StatusCode::CREATED, created))
}

/// Replaces the title and content of a ToDo the caller owns.
///
/// ## Path Parameters:
/// - `id`: the ToDo identifier.
///
/// ## Responses:
/// - `200 OK`: the updated ToDo with its owner attached.
/// - `400 Bad Request`: `id` is not an unsigned integer.
/// - `401 Unauthorized`: bad token, or the caller does not own the ToDo.
/// - `404 Not Found`: no ToDo with that id.
/// - `422 Unprocessable Entity`: bad body or validation failure.
/// - `500 Internal Server Error`: storage failure.
pub async fn update_todo(
    state: web::Data<AppState>,
    path: web::Path<String>,
    user: AuthenticatedUserId,
    body: Result<web::Bytes, ActixError>,
) -> Result<HttpResponse, AppError> {
    let todo_id = todo_id(&path)?;
    let body = body.map_err(|_| AppError::InvalidBody)?;
    let updated = TodoLifecycle::new(state.store.as_ref())
        .update(user.0, todo_id, &body)
        .await?;
    Ok(respond(StatusCode::OK, updated))
}

/// Deletes a ToDo the caller owns.
///
/// ## Responses:
/// - `200 OK`: `"todo deleted"`.
/// - `400 Bad Request`, `401 Unauthorized`, `404 Not Found`, `500` as for updates.
pub async fn delete_todo(
    state: web::Data<AppState>,
    path: web::Path<String>,
    user: AuthenticatedUserId,
) -> Result<HttpResponse, AppError> {
    let todo_id = todo_id(&path)?;
    TodoLifecycle::new(state.store.as_ref())
        .delete(user.0, todo_id)
        .await?;
    Ok(respond(StatusCode::OK, "todo deleted"))
}

/// Lists a user's ToDos, newest first, capped at 100.
///
/// Any authenticated caller may list any user.
///
/// ## Responses:
/// - `200 OK`: array of ToDos (empty if the user has none).
/// - `400 Bad Request`: `id` is not an unsigned integer.
/// - `401 Unauthorized`: missing/invalid token.
pub async fn get_user_todos(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let owner_id: u64 = parse_id(&path)?;
    let todos = match i32::try_from(owner_id) {
        Ok(owner_id) => {
            TodoLifecycle::new(state.store.as_ref())
                .list_by_owner(owner_id)
                .await?
        }
        // No account can have an id this large.
        Err(_) => Vec::new(),
    };
    Ok(respond(StatusCode::OK, todos))
}

/// Any unsigned id is well formed; one past the store's range names no ToDo.
fn todo_id(raw: &str) -> Result<i64, AppError> {
    let id: u64 = parse_id(raw)?;
    i64::try_from(id).map_err(|_| AppError::TodoNotFound)
}
