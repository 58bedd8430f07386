//! User and session models.

use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub email: String,
    /// Argon2 PHC string, stored as raw bytes
    pub password: Vec<u8>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: String,
    pub user_email: String,
    pub token_hash: String,
    pub expires_at: String,
    pub created_at: String,
}
