//! Password hashing and the shared password-pair policy.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use once_cell::sync::Lazy;
use whisper_common::{AppError, AppResult};

/// Minimum length of account and status-check passwords.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Hash verified on lookups that found no record, so both paths cost the same.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("whisper-dummy-password").ok());

/// Check a password and its confirmation.
///
/// Order matters: missing fields, then mismatch, then length.
pub fn validate_password_pair(password: &str, password_confirm: &str) -> AppResult<()> {
    if password.is_empty() || password_confirm.is_empty() {
        return Err(AppError::Validation(
            "password and password confirmation are required".to_string(),
        ));
    }
    if password != password_confirm {
        return Err(AppError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::PasswordPolicy(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Burn one verification against a fixed hash.
pub fn verify_dummy(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_missing_field() {
        assert!(matches!(
            validate_password_pair("", "secret1"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_password_pair("secret1", ""),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_pair_mismatch() {
        assert!(matches!(
            validate_password_pair("secret1", "secret2"),
            Err(AppError::PasswordMismatch)
        ));
    }

    #[test]
    fn test_pair_mismatch_checked_before_length() {
        assert!(matches!(
            validate_password_pair("abc", "abd"),
            Err(AppError::PasswordMismatch)
        ));
    }

    #[test]
    fn test_pair_too_short() {
        assert!(matches!(
            validate_password_pair("abc12", "abc12"),
            Err(AppError::PasswordPolicy(_))
        ));
        assert!(validate_password_pair("abc123", "abc123").is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("secret1").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret1", &hash).unwrap());
        assert!(!verify_password("secret2", &hash).unwrap());
    }

    #[test]
    fn test_verify_invalid_hash() {
        assert!(verify_password("test", "invalid_hash").is_err());
    }

    #[test]
    fn test_dummy_hash_is_available() {
        assert!(DUMMY_HASH.is_some());
        verify_dummy("anything");
    }
}
