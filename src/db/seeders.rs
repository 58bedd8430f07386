//! Database seeders for test data
//!
//! `goaltrack --init` wipes the store and loads a known user with a couple
//! of goals, which is handy for poking at the UI by hand.

use anyhow::{Context, Result};
use tracing::info;

use super::DbPool;
use crate::auth;
use crate::config::PasswordConfig;

pub const TEST_USER_EMAIL: &str = "test@test.test";
pub const TEST_USER_PASSWORD: &str = "test";
const TEST_GOALS: [&str; 2] = ["Test 1", "Test 2"];

/// Replace all data with the test fixture, in a single transaction.
pub async fn seed_test_data(pool: &DbPool, password_config: &PasswordConfig) -> Result<()> {
    info!("Seeding test data...");

    let hash = auth::hash_password(TEST_USER_PASSWORD, password_config)
        .map_err(|e| anyhow::anyhow!("Failed to hash test password: {}", e))?;

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM sessions").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM goals").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM users").execute(&mut *tx).await?;
    // Restart goal ids at 1
    sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'goals'")
        .execute(&mut *tx)
        .await?;

    sqlx::query("INSERT INTO users (email, password) VALUES (?, ?)")
        .bind(TEST_USER_EMAIL)
        .bind(hash.as_bytes())
        .execute(&mut *tx)
        .await?;

    for title in TEST_GOALS {
        sqlx::query("INSERT INTO goals (title, completed, author_email) VALUES (?, 0, ?)")
            .bind(title)
            .bind(TEST_USER_EMAIL)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await.context("Failed to commit test data")?;

    info!(user = TEST_USER_EMAIL, goals = TEST_GOALS.len(), "Test data seeded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db::repo;

    #[tokio::test]
    async fn test_seed_replaces_existing_data() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite:{}?mode=rwc", dir.path().join("seed.db").display()),
            max_connections: 1,
        };
        let pool = crate::db::init(&config).await.unwrap();
        let fast = PasswordConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        };

        repo::create_user(&pool, "old@x.com", "pw", &fast).await.unwrap();
        repo::create_goal(&pool, "Old goal", "old@x.com").await.unwrap();

        seed_test_data(&pool, &fast).await.unwrap();
        seed_test_data(&pool, &fast).await.unwrap();

        assert_eq!(repo::count_users(&pool).await.unwrap(), 1);
        assert!(repo::find_user_by_email(&pool, "old@x.com").await.unwrap().is_none());

        let goals = repo::list_goals_for_user(&pool, TEST_USER_EMAIL).await.unwrap();
        let titles: Vec<&str> = goals.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["Test 1", "Test 2"]);
        assert_eq!(goals[0].id, 1);

        let user = repo::find_user_by_email(&pool, TEST_USER_EMAIL).await.unwrap().unwrap();
        assert!(auth::verify_password(TEST_USER_PASSWORD, &user.password));
    }
}
