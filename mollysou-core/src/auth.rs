//! Password hashing and credential normalisation.

use anyhow::Context as _;
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use tracing::warn;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Trim and lowercase an email address, or `None` if it cannot be one.
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.is_empty() || email.contains(char::is_whitespace) {
        return None;
    }
    Some(email)
}

/// Argon2id PHC string for `password`, computed off the async runtime.
pub async fn hash_password(password: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))
    })
    .await
    .context("password hashing task failed")?
}

/// Whether `password` matches the stored PHC string. Malformed hashes never
/// match.
pub async fn verify_password(password: String, stored_hash: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || {
        let parsed = match PasswordHash::new(&stored_hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "stored password hash is malformed");
                return false;
            }
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
    .await
    .context("password verification task failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(
            normalize_email("  Molly@Example.COM "),
            Some("molly@example.com".to_string())
        );
        assert_eq!(normalize_email("a@x.com"), normalize_email("A@X.com"));
    }

    #[test]
    fn malformed_emails_are_refused() {
        for raw in ["", "   ", "molly", "@example.com", "molly@", "mol ly@example.com"] {
            assert_eq!(normalize_email(raw), None, "{raw:?}");
        }
    }

    #[tokio::test]
    async fn hashed_password_verifies() {
        let hash = hash_password("correct horse".to_string()).await.unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(!hash.contains("correct horse"));

        assert!(
            verify_password("correct horse".to_string(), hash.clone())
                .await
                .unwrap()
        );
        assert!(
            !verify_password("wrong horse".to_string(), hash)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn malformed_hash_never_matches() {
        assert!(
            !verify_password("anything".to_string(), "plaintext".to_string())
                .await
                .unwrap()
        );
    }
}
