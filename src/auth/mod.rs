pub mod extractors;
pub mod guard;
pub mod middleware;
pub mod password;
pub mod token;

use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use crate::models::User;

// Re-export necessary items
pub use extractors::AuthenticatedUserId;
pub use guard::authorize;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenCodec, TokenError};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Must be a valid email format.
    #[validate(email(code = "Invalid_email", message = "Invalid Email"))]
    pub email: String,
    /// Must be at least 6 characters long.
    #[validate(length(min = 6, code = "Invalid_password", message = "Invalid Password"))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Between 3 and 32 characters: alphanumeric, underscores or hyphens.
    #[validate(
        length(min = 3, max = 32, code = "Invalid_username", message = "Invalid Username"),
        regex(
            path = "USERNAME_REGEX",
            code = "Invalid_username",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    #[validate(email(code = "Invalid_email", message = "Invalid Email"))]
    pub email: String,
    #[validate(length(min = 6, code = "Invalid_password", message = "Invalid Password"))]
    pub password: String,
}

/// Response structure after a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The signed token to present as `Authorization: Bearer <token>`.
    pub token: String,
    /// The unique identifier of the authenticated user.
    pub user_id: i32,
}

/// Response structure after a successful signup: the created user and a
/// token minted for it.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignupResponse {
    pub user: User,
    pub token: String,
}

/// Reads the token out of an `Authorization: Bearer <token>` header.
///
/// Returns `None` when the header is absent, not valid text, uses another
/// scheme, or carries an empty token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Extracts and verifies the bearer token, yielding the caller's user id.
///
/// A missing header, a malformed value, and a failed verification all fold
/// into one `AppError::Unauthorized`; the caller is never told which.
pub fn authenticate(headers: &HeaderMap, tokens: &TokenCodec) -> Result<i32, AppError> {
    let token = bearer_token(headers).ok_or(AppError::Unauthorized)?;
    tokens.verify(token).map_err(|e| {
        log::warn!("rejected bearer token: {}", e);
        AppError::Unauthorized
    })
}
