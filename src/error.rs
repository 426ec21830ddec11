//!
//! # Error Handling
//!
//! This module defines the per-request `ErrorSet` and the `AppError` type that
//! aggregates every failure a request can end in.
//!
//! Every `AppError` variant maps to exactly one HTTP status and one `ErrorSet`,
//! rendered through `actix_web::error::ResponseError` as
//! `{ "status": <code>, "error": { "<Code>": "<message>", ... } }`.
//! Only validation failures carry more than one entry.
//!
//! `From` implementations for `validator::ValidationErrors`, `StoreError` and
//! `bcrypt::BcryptError` let handlers and the lifecycle engine use `?` freely.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;
use validator::ValidationErrors;

use crate::store::StoreError;

/// Mapping from a short symbolic error code (e.g. `Required_title`) to a
/// human-readable message.
///
/// A fresh set is built for each request and returned up the call chain; it is
/// never shared between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorSet(BTreeMap<String, String>);

impl ErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set holding a single entry.
    pub fn single(code: impl Into<String>, message: impl Into<String>) -> Self {
        let mut set = Self::new();
        set.insert(code, message);
        set
    }

    pub fn insert(&mut self, code: impl Into<String>, message: impl Into<String>) {
        self.0.insert(code.into(), message.into());
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.contains_key(code)
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.0.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Collects every field failure reported by `validator`.
///
/// The validation error `code` becomes the symbolic code, and its `message`
/// (falling back to the code) becomes the human-readable text.
impl From<&ValidationErrors> for ErrorSet {
    fn from(errors: &ValidationErrors) -> Self {
        let mut set = ErrorSet::new();
        for field_errors in errors.field_errors().values() {
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                set.insert(error.code.to_string(), message);
            }
        }
        set
    }
}

/// Represents all failure classes a request can end in.
#[derive(Debug)]
pub enum AppError {
    /// A path parameter could not be parsed (HTTP 400).
    BadRequest,
    /// The request body could not be read (HTTP 422).
    InvalidBody,
    /// The request body could not be decoded into the expected shape (HTTP 422).
    MalformedBody(String),
    /// The request-gating middleware rejected the bearer token (HTTP 401).
    TokenRejected,
    /// Authentication failed inside a handler, or the caller does not own the
    /// resource (HTTP 401). Both cases share one code.
    Unauthorized,
    /// Login with an unknown email or a wrong password (HTTP 401).
    InvalidCredentials,
    /// No ToDo exists at the requested identifier (HTTP 404).
    TodoNotFound,
    /// Any other record lookup that came back empty (HTTP 404).
    NotFound,
    /// One or more field rules were violated (HTTP 422).
    Validation(ErrorSet),
    /// The persistence layer failed; the set already holds a user-safe message
    /// (HTTP 500).
    Storage(ErrorSet),
    /// An unexpected server-side failure (HTTP 500). The message is logged only.
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest => StatusCode::BAD_REQUEST,
            AppError::InvalidBody | AppError::MalformedBody(_) | AppError::Validation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::TokenRejected | AppError::Unauthorized | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AppError::TodoNotFound | AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The error set sent to the client for this failure.
    pub fn error_set(&self) -> ErrorSet {
        match self {
            AppError::BadRequest => ErrorSet::single("Invalid_request", "Invalid Request"),
            AppError::InvalidBody => ErrorSet::single("Invalid_body", "Unable to get request"),
            AppError::MalformedBody(_) => {
                ErrorSet::single("Unmarshal_error", "Cannot unmarshal body")
            }
            AppError::TokenRejected => ErrorSet::single("unauthorized", "Unauthorized"),
            AppError::Unauthorized => ErrorSet::single("Unauthorized", "Unauthorized"),
            AppError::InvalidCredentials => {
                ErrorSet::single("Incorrect_details", "Incorrect Details")
            }
            AppError::TodoNotFound => ErrorSet::single("No_todo", "No ToDo Found"),
            AppError::NotFound => ErrorSet::single("No_record", "No Record Found"),
            AppError::Validation(set) | AppError::Storage(set) => set.clone(),
            AppError::Internal(_) => ErrorSet::single("Internal_error", "Please try again later"),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::BadRequest => write!(f, "Bad Request: unparseable path parameter"),
            AppError::InvalidBody => write!(f, "Unprocessable: unreadable body"),
            AppError::MalformedBody(msg) => write!(f, "Unprocessable: {}", msg),
            AppError::TokenRejected => write!(f, "Unauthorized: token rejected"),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::InvalidCredentials => write!(f, "Unauthorized: incorrect credentials"),
            AppError::TodoNotFound => write!(f, "Not Found: todo"),
            AppError::NotFound => write!(f, "Not Found: record"),
            AppError::Validation(set) => {
                write!(f, "Validation Error: {}", set.codes().collect::<Vec<_>>().join(", "))
            }
            AppError::Storage(set) => {
                write!(f, "Storage Error: {}", set.codes().collect::<Vec<_>>().join(", "))
            }
            AppError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

/// Renders the failure envelope.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        HttpResponse::build(status).json(json!({
            "status": status.as_u16(),
            "error": self.error_set(),
        }))
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        AppError::Validation(ErrorSet::from(&errors))
    }
}

/// Translates persistence failures into a user-safe error set.
///
/// Unique-constraint conflicts name the taken field; everything else becomes a
/// generic retry message. The raw storage text is logged, never returned.
impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::NotFound => AppError::NotFound,
            StoreError::Conflict(field) => {
                let mut label = field.clone();
                if let Some(first) = label.get_mut(0..1) {
                    first.make_ascii_uppercase();
                }
                AppError::Storage(ErrorSet::single(
                    format!("Taken_{}", field),
                    format!("{} Already Taken", label),
                ))
            }
            StoreError::Backend(msg) => {
                log::error!("storage failure: {}", msg);
                AppError::Storage(ErrorSet::single("Other_error", "Please try again later"))
            }
        }
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(error.to_string())
    }
}
