//! Password verification using Argon2id.

use std::borrow::Cow;

use argon2::{Argon2, PasswordVerifier};

use crate::error::AuthError;

/// Verify a plaintext password against an Argon2id PHC-format hash.
///
/// If `pepper` is provided it is prepended to the password before
/// verification; it must match the pepper used when the user registered.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or
/// `Err(AuthError::Crypto)` if the stored hash is malformed.
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    let input = peppered(password, pepper);
    match Argon2::default().verify_password(input.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}

fn peppered<'a>(password: &'a str, pepper: Option<&str>) -> Cow<'a, str> {
    match pepper {
        Some(p) => Cow::Owned(format!("{p}{password}")),
        None => Cow::Borrowed(password),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::PasswordHasher;
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;

    fn hash_password(password: &str, pepper: Option<&str>) -> String {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(peppered(password, pepper).as_bytes(), &salt)
            .expect("hashing failed")
            .to_string()
    }

    #[test]
    fn matching_password_verifies() {
        let hash = hash_password("rahasia-pengantin", None);
        assert!(verify_password("rahasia-pengantin", &hash, None).unwrap());
        assert!(!verify_password("rahasia-lain", &hash, None).unwrap());
    }

    #[test]
    fn pepper_must_match() {
        let hash = hash_password("rahasia-pengantin", Some("server-pepper"));
        assert!(verify_password("rahasia-pengantin", &hash, Some("server-pepper")).unwrap());
        assert!(!verify_password("rahasia-pengantin", &hash, Some("other")).unwrap());
        assert!(!verify_password("rahasia-pengantin", &hash, None).unwrap());
    }

    #[test]
    fn stored_hash_that_is_not_phc_is_a_crypto_error() {
        assert!(matches!(
            verify_password("pw", "plaintext-pw", None),
            Err(AuthError::Crypto(_))
        ));
    }
}
