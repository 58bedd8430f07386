//! Opaque session tokens mapped to a user email.
//!
//! The client only ever holds the random token; the database stores its
//! SHA-256 so a leaked table cannot be replayed as cookies.

use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::{hash_password, verify_password, AuthError};
use crate::config::AuthConfig;
use crate::db::{repo, DbPool, Session, StoreError, User};

/// Format matching SQLite's `datetime('now')` so expiry can be compared in SQL
const SQLITE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A freshly created session; `token` goes into the session cookie.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub email: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

/// Generate a random token
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// Hash a token for storage
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check credentials and open a session for the user.
///
/// An unknown email and a wrong password both yield
/// `AuthError::InvalidCredentials`.
pub async fn login(
    pool: &DbPool,
    email: &str,
    password: &str,
    config: &AuthConfig,
) -> Result<IssuedSession, AuthError> {
    let user = repo::find_user_by_email(pool, email).await?;

    let user = match user {
        Some(user) if verify_password(password, &user.password) => user,
        Some(_) => {
            debug!("Login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }
        None => {
            // Spend comparable time on unknown emails
            let _ = hash_password(password, &config.password);
            debug!("Login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        }
    };

    let ttl = config
        .session_ttl()
        .ok_or_else(|| StoreError::Validation("Session lifetime is out of range".to_string()))?;

    prune_expired_sessions(pool).await?;
    let session = create_session(pool, &user.email, ttl).await?;

    info!(email = %user.email, "User logged in");
    Ok(session)
}

/// Insert a session for `email` valid for `ttl` from now.
pub async fn create_session(
    pool: &DbPool,
    email: &str,
    ttl: chrono::Duration,
) -> Result<IssuedSession, StoreError> {
    let token = generate_token();
    let token_hash = hash_token(&token);

    let expires_at = chrono::Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| StoreError::Validation("Session lifetime is out of range".to_string()))?;

    let session_id = uuid::Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO sessions (id, user_email, token_hash, expires_at) VALUES (?, ?, ?, ?)")
        .bind(&session_id)
        .bind(email)
        .bind(&token_hash)
        .bind(expires_at.format(SQLITE_DATETIME_FORMAT).to_string())
        .execute(pool)
        .await?;

    Ok(IssuedSession {
        token,
        email: email.to_string(),
        expires_at,
    })
}

/// Look up the user behind a session token, if the session is still valid.
pub async fn resolve_session(pool: &DbPool, token: &str) -> Result<Option<User>, StoreError> {
    let token_hash = hash_token(token);

    let session: Option<Session> = sqlx::query_as(
        "SELECT * FROM sessions WHERE token_hash = ? AND expires_at > datetime('now')",
    )
    .bind(&token_hash)
    .fetch_optional(pool)
    .await?;

    let Some(session) = session else {
        return Ok(None);
    };

    let user = repo::find_user_by_email(pool, &session.user_email).await?;
    if user.is_none() {
        warn!(session_id = %session.id, "Session refers to a missing user");
    }
    Ok(user)
}

/// Delete sessions whose expiry has passed. Returns how many were removed.
pub async fn prune_expired_sessions(pool: &DbPool) -> Result<u64, StoreError> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= datetime('now')")
        .execute(pool)
        .await?;

    if result.rows_affected() > 0 {
        debug!(removed = result.rows_affected(), "Pruned expired sessions");
    }
    Ok(result.rows_affected())
}
