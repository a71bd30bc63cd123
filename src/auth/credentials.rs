use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;

/// Hash a password with argon2id and a fresh random salt. Two calls for the
/// same password produce different strings, so stored hashes can only be
/// checked with [`verify_password`], never with equality.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(hash.to_string())
}

/// True iff `password` matches `hash`. A malformed hash counts as a
/// verification failure rather than an error.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_own_hash() {
        let hash = hash_password("weakpassword").unwrap();
        assert!(verify_password("weakpassword", &hash));
    }

    #[test]
    fn rejects_wrong_password() {
        let hash = hash_password("weakpassword").unwrap();
        assert!(!verify_password("otherpassword", &hash));
    }

    #[test]
    fn malformed_hash_is_a_failure_not_an_error() {
        assert!(!verify_password("weakpassword", "not-a-phc-string"));
        assert!(!verify_password("weakpassword", ""));
    }

    #[test]
    fn salting_makes_hashes_differ() {
        let a = hash_password("weakpassword").unwrap();
        let b = hash_password("weakpassword").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("weakpassword", &a));
        assert!(verify_password("weakpassword", &b));
    }
}
