use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use once_cell::sync::Lazy;

use crate::error::{AppError, AppResult};

/// Stands in for a stored hash when no account matches a login.
static DUMMY_HASH: Lazy<String> =
    Lazy::new(|| hash_password("not-a-real-password").unwrap_or_default());

pub fn hash_password(password: &str) -> AppResult<String> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!(error = %e, "Password hashing failed");
            AppError::internal("password hashing failed")
        })
}

/// `false` for a wrong password and for an unreadable stored hash alike.
pub fn verify_password(password: &str, hashed: &str) -> bool {
    let parsed = match PasswordHash::new(hashed) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is malformed");
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Spends the same argon2 work as a real check and always fails.
pub fn verify_against_dummy(password: &str) -> bool {
    verify_password(password, &DUMMY_HASH);
    false
}
