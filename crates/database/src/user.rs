//! User records.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::User;

/// Create a user or refresh their display name.
///
/// Scores are never touched: upserting an existing user updates
/// `display_name` and nothing else.
pub async fn upsert_user(pool: &SqlitePool, user_id: &str, display_name: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (user_id, display_name)
        VALUES (?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            display_name = excluded.display_name
        "#,
    )
    .bind(user_id)
    .bind(display_name)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a user by id.
pub async fn get_user(pool: &SqlitePool, user_id: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT user_id, display_name, lifetime_score, created_at
        FROM users
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: user_id.to_string(),
    })
}
