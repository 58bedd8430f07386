//! Data access for users and goals.
//!
//! Every function runs a single read or a single write against the pool, so
//! each write commits on its own.

use tracing::{debug, info};

use super::{DbPool, Goal, GoalChanges, StoreError, User};
use crate::auth;
use crate::config::PasswordConfig;

pub async fn find_user_by_email(pool: &DbPool, email: &str) -> Result<Option<User>, StoreError> {
    let user = sqlx::query_as::<_, User>("SELECT email, password FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Register a new user, hashing the plaintext password.
pub async fn create_user(
    pool: &DbPool,
    email: &str,
    password: &str,
    password_config: &PasswordConfig,
) -> Result<User, StoreError> {
    if find_user_by_email(pool, email).await?.is_some() {
        return Err(StoreError::DuplicateKey);
    }

    let hash = auth::hash_password(password, password_config)
        .map_err(|e| StoreError::Hash(e.to_string()))?;
    let user = User {
        email: email.to_string(),
        password: hash.into_bytes(),
    };

    // The primary key still guards against a concurrent registration
    sqlx::query("INSERT INTO users (email, password) VALUES (?, ?)")
        .bind(&user.email)
        .bind(&user.password)
        .execute(pool)
        .await
        .map_err(StoreError::from_insert)?;

    info!(email = %user.email, "User created");
    Ok(user)
}

pub async fn count_users(pool: &DbPool) -> Result<i64, StoreError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn find_goal_by_id(pool: &DbPool, id: i64) -> Result<Option<Goal>, StoreError> {
    let goal = sqlx::query_as::<_, Goal>(
        "SELECT id, title, completed, author_email FROM goals WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(goal)
}

/// Goals owned by `email`, oldest first.
pub async fn list_goals_for_user(pool: &DbPool, email: &str) -> Result<Vec<Goal>, StoreError> {
    let goals = sqlx::query_as::<_, Goal>(
        "SELECT id, title, completed, author_email FROM goals WHERE author_email = ? ORDER BY id",
    )
    .bind(email)
    .fetch_all(pool)
    .await?;
    Ok(goals)
}

pub async fn create_goal(pool: &DbPool, title: &str, owner_email: &str) -> Result<Goal, StoreError> {
    let title = validate_title(title)?;

    let result = sqlx::query("INSERT INTO goals (title, completed, author_email) VALUES (?, 0, ?)")
        .bind(&title)
        .bind(owner_email)
        .execute(pool)
        .await?;

    let goal = Goal {
        id: result.last_insert_rowid(),
        title,
        completed: false,
        author_email: owner_email.to_string(),
    };

    info!(goal_id = goal.id, author = %goal.author_email, "Goal created");
    Ok(goal)
}

/// Apply `changes` to the goal with the given id and return the new state.
pub async fn update_goal(pool: &DbPool, id: i64, changes: GoalChanges) -> Result<Goal, StoreError> {
    let current = find_goal_by_id(pool, id).await?.ok_or(StoreError::NotFound)?;

    let changes = GoalChanges {
        title: changes.title.as_deref().map(validate_title).transpose()?,
        completed: changes.completed,
    };

    if changes.is_empty() {
        debug!(goal_id = id, "Goal edit without changes");
        return Ok(current);
    }

    let updated = changes.apply(current);

    let result = sqlx::query("UPDATE goals SET title = ?, completed = ? WHERE id = ?")
        .bind(&updated.title)
        .bind(updated.completed)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }

    info!(goal_id = id, completed = updated.completed, "Goal updated");
    Ok(updated)
}

fn validate_title(title: &str) -> Result<String, StoreError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(StoreError::Validation("Goal title must not be empty".to_string()));
    }
    Ok(title.to_string())
}
