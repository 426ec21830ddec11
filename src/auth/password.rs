use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AppError;

/// Work factor for stored account passwords.
pub const PASSWORD_COST: u32 = DEFAULT_COST;

/// Hashes a signup password for storage. The salt is random per call.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    Ok(hash(password, PASSWORD_COST)?)
}

/// Checks a login password against a stored hash. A stored value that is not
/// a bcrypt hash is a server fault, not a wrong password.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    Ok(verify(password, password_hash)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;

    #[test]
    fn test_signup_hash_verifies_at_login() {
        let user = NewUser::new(" martin ", "Martin@Example.com", hash_password("martin123").unwrap());

        assert!(user.password_hash.starts_with(&format!("$2b${:02}$", PASSWORD_COST)));
        assert!(verify_password("martin123", &user.password_hash).unwrap());
        assert!(!verify_password("Martin123", &user.password_hash).unwrap());
        assert!(!verify_password("martin123 ", &user.password_hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same-password").unwrap();
        let second = hash_password("same-password").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("same-password", &first).unwrap());
        assert!(verify_password("same-password", &second).unwrap());
    }

    #[test]
    fn test_corrupt_stored_hash_is_internal_error() {
        let err = verify_password("martin123", "plaintext-password").unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(err.status(), 500);
        assert!(err.error_set().contains("Internal_error"));
    }
}
