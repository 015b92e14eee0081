//! Password gate.
//!
//! Passwords are compared as lowercase hex SHA-256 digests against the value
//! held by the [`PasswordStore`].

use sha2::{Digest, Sha256};

use crate::config::PasswordStore;
use crate::error::{AuthError, AuthResult};

/// Minimum accepted length for a new password.
pub const MIN_PASSWORD_LEN: usize = 4;

/// Lowercase hex SHA-256 of the UTF-8 bytes of `password`.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Check a candidate password. Missing or empty input is never valid.
pub fn verify_password(store: &PasswordStore, password: Option<&str>) -> bool {
    match password {
        Some(p) if !p.is_empty() => hash_password(p) == store.load_hash(),
        _ => false,
    }
}

/// Form fields of a password change request.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct PasswordChange {
    #[serde(default)]
    pub current: String,
    #[serde(default)]
    pub new: String,
    #[serde(default)]
    pub confirm: String,
}

/// Replace the stored digest after validating the request.
///
/// Callers are responsible for dropping active sessions on success.
pub fn change_password(store: &PasswordStore, request: &PasswordChange) -> AuthResult<()> {
    if request.current.is_empty() || request.new.is_empty() || request.confirm.is_empty() {
        return Err(AuthError::MissingField);
    }
    if hash_password(&request.current) != store.load_hash() {
        return Err(AuthError::WrongCurrentPassword);
    }
    if request.new != request.confirm {
        return Err(AuthError::Mismatch);
    }
    if request.new.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::TooShort(MIN_PASSWORD_LEN));
    }

    store.save_hash(&hash_password(&request.new))?;
    tracing::info!(path = %store.path().display(), "password changed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_with(password: &str) -> (tempfile::TempDir, PasswordStore) {
        let dir = tempdir().unwrap();
        let store = PasswordStore::new(dir.path().join("config.json"));
        store.save_hash(&hash_password(password)).unwrap();
        (dir, store)
    }

    #[test]
    fn test_hash_is_lowercase_hex_sha256() {
        assert_eq!(
            hash_password("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_empty_and_missing_never_verify() {
        let (_dir, store) = store_with("secreto");
        assert!(!verify_password(&store, None));
        assert!(!verify_password(&store, Some("")));
    }

    #[test]
    fn test_verify_against_store() {
        let (_dir, store) = store_with("secreto");
        assert!(verify_password(&store, Some("secreto")));
        assert!(!verify_password(&store, Some("Secreto")));
    }

    #[test]
    fn test_change_password_flow() {
        let (_dir, store) = store_with("viejo");
        let request = PasswordChange {
            current: "viejo".into(),
            new: "nuevo1".into(),
            confirm: "nuevo1".into(),
        };
        change_password(&store, &request).unwrap();
        assert!(verify_password(&store, Some("nuevo1")));
        assert!(!verify_password(&store, Some("viejo")));
    }

    #[test]
    fn test_change_password_rejections() {
        let (_dir, store) = store_with("viejo");

        let wrong = PasswordChange {
            current: "otro".into(),
            new: "abcd".into(),
            confirm: "abcd".into(),
        };
        assert!(matches!(change_password(&store, &wrong), Err(AuthError::WrongCurrentPassword)));

        let mismatch = PasswordChange {
            current: "viejo".into(),
            new: "abcd".into(),
            confirm: "abce".into(),
        };
        assert!(matches!(change_password(&store, &mismatch), Err(AuthError::Mismatch)));

        let short = PasswordChange {
            current: "viejo".into(),
            new: "abc".into(),
            confirm: "abc".into(),
        };
        assert!(matches!(change_password(&store, &short), Err(AuthError::TooShort(4))));

        let empty = PasswordChange { current: "viejo".into(), ..Default::default() };
        assert!(matches!(change_password(&store, &empty), Err(AuthError::MissingField)));

        assert!(verify_password(&store, Some("viejo")));
    }
}
