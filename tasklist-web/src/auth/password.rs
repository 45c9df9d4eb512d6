//! Password hashing and verification using Argon2

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Prefix carried by every PHC-formatted Argon2 digest
const DIGEST_PREFIX: &str = "$argon2";

/// Password hashing errors
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Value is already a password digest")]
    AlreadyHashed,
    #[error("Failed to hash password")]
    HashFailure,
    #[error("Malformed password digest")]
    MalformedDigest,
}

/// Hash a plaintext secret with a fresh random salt.
///
/// Refuses input that already carries the algorithm tag, so a record
/// update that passes a digest through by mistake cannot double-hash it.
pub fn hash(secret: &str) -> Result<String, PasswordError> {
    if secret.starts_with(DIGEST_PREFIX) {
        return Err(PasswordError::AlreadyHashed);
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(secret.as_bytes(), &salt)
        .map(|digest| digest.to_string())
        .map_err(|_| PasswordError::HashFailure)
}

/// Verify a plaintext secret against a stored digest.
///
/// A non-matching secret returns `Ok(false)`; only a digest that cannot
/// be parsed is an error.
pub fn verify(secret: &str, digest: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(digest).map_err(|_| PasswordError::MalformedDigest)?;

    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_round_trip() {
        let digest = hash("abcdef").unwrap();
        assert!(verify("abcdef", &digest).unwrap());
        assert!(!verify("abcdeg", &digest).unwrap());
    }

    #[test]
    fn test_distinct_salts() {
        let first = hash("correct horse").unwrap();
        let second = hash("correct horse").unwrap();
        assert_ne!(first, second);
        assert!(verify("correct horse", &first).unwrap());
        assert!(verify("correct horse", &second).unwrap());
    }

    #[test]
    fn test_refuses_double_hash() {
        let digest = hash("abcdef").unwrap();
        assert!(matches!(hash(&digest), Err(PasswordError::AlreadyHashed)));
    }

    #[test]
    fn test_malformed_digest() {
        assert!(matches!(
            verify("abcdef", "not-a-digest"),
            Err(PasswordError::MalformedDigest)
        ));
    }
}
