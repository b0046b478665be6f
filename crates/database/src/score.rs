//! Daily and lifetime score ledger.
//!
//! Points live in two places that must never disagree: a per-day counter
//! in `daily_scores` and the running total in `users.lifetime_score`.
//! [`credit`] writes both inside one transaction, so the totals stay
//! equal no matter how calls interleave or where they fail.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::DailyScore;

/// Atomically credit points to a user for a ledger day.
///
/// Increments the user's lifetime total and the day's counter as one
/// transaction, creating the day's row on first credit. Returns the
/// day's total after the credit. Fails with `NotFound`, writing
/// nothing, if the user does not exist.
pub async fn credit(pool: &SqlitePool, user_id: &str, date: NaiveDate, points: i64) -> Result<i64> {
    let mut tx = pool.begin().await?;

    // The lifetime update goes first: it takes the write lock at the
    // start of the transaction and doubles as the existence check.
    let updated = sqlx::query(
        r#"
        UPDATE users
        SET lifetime_score = lifetime_score + ?
        WHERE user_id = ?
        "#,
    )
    .bind(points)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: user_id.to_string(),
        });
    }

    sqlx::query(
        r#"
        INSERT INTO daily_scores (user_id, date, points)
        VALUES (?, ?, ?)
        ON CONFLICT(user_id, date) DO UPDATE SET
            points = points + excluded.points
        "#,
    )
    .bind(user_id)
    .bind(date)
    .bind(points)
    .execute(&mut *tx)
    .await?;

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT points FROM daily_scores
        WHERE user_id = ? AND date = ?
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(total)
}

/// The user's total for one ledger day. Zero when nothing was credited.
pub async fn daily_total(pool: &SqlitePool, user_id: &str, date: NaiveDate) -> Result<i64> {
    let points = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT points FROM daily_scores
        WHERE user_id = ? AND date = ?
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(points.unwrap_or(0))
}

/// The user's all-time total. Zero for a user never seen.
pub async fn lifetime_total(pool: &SqlitePool, user_id: &str) -> Result<i64> {
    let score = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT lifetime_score FROM users
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(score.unwrap_or(0))
}

/// Sum of all daily rows for a user.
///
/// Always equals [`lifetime_total`] for the same user; the pair exists
/// so audits can check exactly that.
pub async fn daily_sum(pool: &SqlitePool, user_id: &str) -> Result<i64> {
    let sum = sqlx::query_scalar::<_, Option<i64>>(
        r#"
        SELECT SUM(points) FROM daily_scores
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(sum.unwrap_or(0))
}

/// The day's ledger row, if any.
pub async fn get_daily_score(
    pool: &SqlitePool,
    user_id: &str,
    date: NaiveDate,
) -> Result<Option<DailyScore>> {
    let row = sqlx::query_as::<_, DailyScore>(
        r#"
        SELECT user_id, date, points
        FROM daily_scores
        WHERE user_id = ? AND date = ?
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
