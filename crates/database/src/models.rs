//! Database models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user known to the engine, identified by their transport id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Opaque, stable transport identifier.
    pub user_id: String,
    /// Display name, refreshed on every upsert.
    pub display_name: String,
    /// Total points ever credited. Never decreases.
    pub lifetime_score: i64,
    /// Creation timestamp.
    pub created_at: String,
}

/// One user's points for one UTC day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DailyScore {
    /// Owning user.
    pub user_id: String,
    /// Ledger day.
    pub date: NaiveDate,
    /// Points credited on that day.
    pub points: i64,
}

/// A question row as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct QuestionRow {
    /// Assigned id.
    pub question_id: i64,
    /// Language, stored as imported.
    pub language: String,
    /// Question text.
    pub prompt: String,
    /// Expected answer.
    pub answer: String,
    /// Optional hint.
    pub hint: Option<String>,
}

impl From<QuestionRow> for quiz_core::Question {
    fn from(row: QuestionRow) -> Self {
        Self {
            question_id: row.question_id,
            language: row.language,
            prompt: row.prompt,
            answer: row.answer,
            hint: row.hint,
        }
    }
}
