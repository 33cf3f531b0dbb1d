/// Password hashing and verification using Argon2id
///
/// Uses the `argon2` crate's recommended default parameters (Argon2id,
/// v0x13, 19 MiB, 2 iterations, 1 lane) with a random 16-byte salt. The PHC
/// output string carries the algorithm, parameters and salt, so verification
/// needs nothing but the stored hash.
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

/// Password hashing and verification errors
///
/// None of the variants carry the password or the stored hash.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),

    #[error("Failed to verify password: {0}")]
    VerificationFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,

    #[error("Password does not match")]
    PasswordMismatch,
}

/// Hash a plaintext password using Argon2id
///
/// # Returns
///
/// * `Ok(String)` - PHC string format hash (includes algorithm, parameters, salt, and hash)
/// * `Err(PasswordError::HashingFailed)` - If the primitive cannot compute
///
/// # Example
///
/// ```no_run
/// use chirpy_api::auth::password::hash_password;
///
/// let hash = hash_password("04234").expect("Failed to hash password");
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    Ok(password_hash.to_string())
}

/// Verify a plaintext password against a stored hash
///
/// The comparison is done by the hash's own constant-time routine.
///
/// # Returns
///
/// * `Ok(())` - Password matches
/// * `Err(PasswordError::PasswordMismatch)` - Password does not match
/// * `Err(PasswordError::InvalidHashFormat)` - Stored hash cannot be parsed
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(()),
        Err(argon2::password_hash::Error::Password) => Err(PasswordError::PasswordMismatch),
        Err(e) => Err(PasswordError::VerificationFailed(e.to_string())),
    }
}

/// [`hash_password`] on the blocking thread pool
pub async fn hash_password_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?
}

/// [`verify_password`] on the blocking thread pool
pub async fn verify_password_blocking(password: String, hash: String) -> Result<(), PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| PasswordError::VerificationFailed(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[tokio::test]
    async fn test_blocking_variants() {
        let hash = hash_password_blocking("04234".to_string()).await.unwrap();
        assert!(verify_password_blocking("04234".to_string(), hash.clone())
            .await
            .is_ok());
        assert!(matches!(
            verify_password_blocking("nope".to_string(), hash).await,
            Err(PasswordError::PasswordMismatch)
        ));
    }

    #[test]
    fn test_hash_and_verify_password() {
        let password = "04234";
        let hash = hash_password(password).expect("Failed to hash password");

        assert!(verify_password(password, &hash).is_ok());
        assert!(matches!(
            verify_password("04235", &hash),
            Err(PasswordError::PasswordMismatch)
        ));
    }

    #[test]
    fn test_same_password_produces_different_hashes() {
        // Due to random salt, same password should produce different hashes
        let password = "SamePassword123!";

        let hash1 = hash_password(password).unwrap();
        let hash2 = hash_password(password).unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password(password, &hash1).is_ok());
        assert!(verify_password(password, &hash2).is_ok());
    }

    #[test]
    fn test_invalid_hash_format() {
        let result = verify_password("password", "invalid-hash-format");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }

    #[test]
    fn test_errors_do_not_leak_secrets() {
        let hash = hash_password("hunter2").unwrap();
        let err = verify_password("hunter3", &hash).unwrap_err();
        let message = err.to_string();

        assert!(!message.contains("hunter"));
        assert!(!message.contains(&hash));
    }

    proptest! {
        // argon2 is deliberately slow
        #![proptest_config(ProptestConfig::with_cases(4))]

        #[test]
        fn prop_hash_verifies_only_its_own_password(
            p1 in "[ -~]{1,32}",
            p2 in "[ -~]{1,32}",
        ) {
            prop_assume!(p1 != p2);
            let hash = hash_password(&p1).unwrap();
            prop_assert!(verify_password(&p1, &hash).is_ok());
            prop_assert!(verify_password(&p2, &hash).is_err());
        }
    }
}
