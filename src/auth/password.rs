use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use anyhow::anyhow;
use tracing::error;

/// Derive the stored credential for a new account. Argon2 generates a
/// fresh random salt per call and embeds it in the PHC string, so two
/// sellers with the same password never share a hash.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    match Argon2::default().hash_password(plain.as_bytes(), &salt) {
        Ok(hash) => Ok(hash.to_string()),
        Err(e) => {
            error!(error = %e, "argon2 hash_password error");
            Err(anyhow!(e.to_string()))
        }
    }
}

/// Recompute and compare at login. Ok(false) means a wrong password;
/// Err means the stored hash itself could not be parsed.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELLER_PASSWORD: &str = "grenier-aux-tresors-77";

    #[test]
    fn signup_credential_verifies_at_login() {
        let stored = hash_password(SELLER_PASSWORD).expect("hashing should succeed");
        assert!(verify_password(SELLER_PASSWORD, &stored).expect("verify should succeed"));
    }

    #[test]
    fn any_other_password_is_rejected() {
        let stored = hash_password(SELLER_PASSWORD).expect("hashing should succeed");
        assert!(!verify_password("grenier-aux-tresors-78", &stored).unwrap());
        assert!(!verify_password("", &stored).unwrap());
    }

    #[test]
    fn same_password_hashes_differently_per_account() {
        let a = hash_password(SELLER_PASSWORD).unwrap();
        let b = hash_password(SELLER_PASSWORD).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn corrupted_stored_hash_is_an_error_not_a_match() {
        let err = verify_password(SELLER_PASSWORD, "sha256$deadbeef").unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}
