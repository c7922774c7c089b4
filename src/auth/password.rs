use crate::error::AppError;
use bcrypt::{hash, verify};

/// bcrypt work factor used for every stored credential.
pub const HASH_COST: u32 = 10;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, HASH_COST)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}

/// Whether `value` has the shape of a bcrypt hash (`$2?$cc$` + 53 chars).
pub fn is_password_hash(value: &str) -> bool {
    value.len() == 60 && value.starts_with("$2") && value.as_bytes()[3] == b'$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing_and_verification() {
        let password = "test_password123";
        let hashed = hash_password(password).unwrap();

        assert_ne!(hashed, password);
        assert!(hashed.starts_with("$2b$10$"));
        assert!(verify_password(password, &hashed).unwrap());
        assert!(!verify_password("wrong_password", &hashed).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("secret123").unwrap();
        let second = hash_password("secret123").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("secret123", &second).unwrap());
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        match verify_password("test_password123", "invalidhashformat") {
            Err(AppError::InternalServerError(msg)) => {
                assert!(msg.contains("Failed to verify password"));
            }
            Ok(false) => {}
            Ok(true) => panic!("Password verification should fail for invalid hash format"),
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    }

    #[test]
    fn test_is_password_hash() {
        let hashed = hash_password("secret123").unwrap();
        assert!(is_password_hash(&hashed));
        assert!(!is_password_hash("secret123"));
        assert!(!is_password_hash(""));
        assert!(!is_password_hash(&"x".repeat(60)));
    }
}
