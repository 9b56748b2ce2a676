//! Password hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::errors::Error;

/// Argon2 hashing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Argon2Params {
    fn to_argon2(self) -> Result<Argon2<'static>, Error> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None).map_err(|e| Error::Internal {
            operation: format!("create argon2 params: {e}"),
        })?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for Argon2Params {
    /// Secure defaults for production (Argon2id RFC recommendations)
    fn default() -> Self {
        Self {
            memory_kib: 19456, // 19 MB
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Hash a password into a PHC string.
///
/// CPU-bound: call from `tokio::task::spawn_blocking` inside request handlers.
pub fn hash_password(password: &str, params: Argon2Params) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = params
        .to_argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Internal {
            operation: format!("hash password: {e}"),
        })?;

    Ok(hash.to_string())
}

/// Verify a password against a stored PHC string.
///
/// Verification uses the parameters embedded in the hash, so changing the configured cost
/// does not invalidate existing accounts.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, Error> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| Error::Internal {
        operation: format!("parse password hash: {e}"),
    })?;

    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed_hash).is_ok())
}

/// Check a candidate password against the configured length bounds.
pub fn check_length(password: &str, min_length: usize, max_length: usize) -> Result<(), Error> {
    let length = password.chars().count();
    if length < min_length {
        return Err(Error::field("password", format!("Password must be at least {min_length} characters")));
    }
    if length > max_length {
        return Err(Error::field("password", format!("Password must be no more than {max_length} characters")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Cheap params so the suite stays fast
    fn fast() -> Argon2Params {
        Argon2Params {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("test_password_123", fast()).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("test_password_123", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_same_password_different_salts() {
        let hash1 = hash_password("password1", fast()).unwrap();
        let hash2 = hash_password("password1", fast()).unwrap();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_with_default_params_hash() {
        let hash = hash_password("defaults", Argon2Params::default()).unwrap();
        assert!(verify_password("defaults", &hash).unwrap());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = Argon2Params {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };
        assert!(hash_password("pw", params).is_err());
    }

    #[test]
    fn test_malformed_hash_is_error() {
        assert!(verify_password("pw", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_check_length() {
        assert!(check_length("12345678", 8, 64).is_ok());
        assert!(matches!(check_length("short", 8, 64), Err(Error::Validation { .. })));
        assert!(check_length(&"x".repeat(65), 8, 64).is_err());
    }
}
