//! Password value object - hashing happens before a credential reaches the store.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::errors::{AppError, AppResult};

/// Password value object that handles hashing and verification.
#[derive(Clone, PartialEq, Eq)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Create a new password by hashing the plain text.
    ///
    /// # Errors
    /// Returns a validation error if the password is empty.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        if plain_text.is_empty() {
            return Err(AppError::validation("Password is required"));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?
            .to_string();

        Ok(Self { hash })
    }

    /// Create a Password from an existing hash (from the store).
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    pub fn verify(&self, plain_text: &str) -> bool {
        PasswordHash::new(&self.hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(plain_text.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let password = Password::new("p").unwrap();

        assert_ne!(password.as_str(), "p");
        assert!(password.verify("p"));
        assert!(!password.verify("q"));
    }

    #[test]
    fn test_same_password_different_salts() {
        let first = Password::new("SamePassword123").unwrap();
        let second = Password::new("SamePassword123").unwrap();

        assert_ne!(first.as_str(), second.as_str());
        assert!(Password::from_hash(second.into_string()).verify("SamePassword123"));
    }

    #[test]
    fn test_empty_password_rejected() {
        assert!(matches!(Password::new(""), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!Password::from_hash("plain".to_string()).verify("plain"));
    }
}
