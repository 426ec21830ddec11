use crate::error::AppError;

/// Ownership check applied before any mutation of an existing ToDo.
///
/// A mismatch is reported with the same `Unauthorized` code as an
/// authentication failure.
pub fn authorize(caller_id: i32, owner_id: i32) -> Result<(), AppError> {
    if caller_id == owner_id {
        Ok(())
    } else {
        log::warn!("user {} denied access to a resource owned by {}", caller_id, owner_id);
        Err(AppError::Unauthorized)
    }
}
