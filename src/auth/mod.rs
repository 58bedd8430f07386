//! Password hashing and login sessions.

mod session;

pub use session::{create_session, login, prune_expired_sessions, resolve_session, IssuedSession};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

use crate::config::PasswordConfig;
use crate::db::StoreError;

/// Message shown for any failed login, whatever the cause.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Your email or password was incorrect";

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password; deliberately not distinguished
    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn hasher(config: &PasswordConfig) -> Result<Argon2<'static>, argon2::Error> {
    let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password using Argon2id with a fresh random salt
pub fn hash_password(password: &str, config: &PasswordConfig) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = hasher(config).map_err(argon2::password_hash::Error::from)?;
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash
///
/// The parameters embedded in the stored hash are used, not the current
/// configuration.
pub fn verify_password(password: &str, stored: &[u8]) -> bool {
    let Ok(stored) = std::str::from_utf8(stored) else {
        return false;
    };
    let parsed_hash = match PasswordHash::new(stored) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
