use serde::de::DeserializeOwned;
use std::str::FromStr;

use crate::error::AppError;

/// Decodes a JSON request body. Any decode failure is a 422 `Unmarshal_error`.
pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::MalformedBody(e.to_string()))
}

/// Parses an unsigned decimal identifier from a path segment.
///
/// Signs, whitespace and out-of-range values are all a 400 `Invalid_request`.
pub fn parse_id<T: FromStr>(raw: &str) -> Result<T, AppError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::BadRequest);
    }
    raw.parse().map_err(|_| AppError::BadRequest)
}
