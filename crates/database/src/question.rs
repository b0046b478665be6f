//! Question corpus storage and queries.

use async_trait::async_trait;
use quiz_core::{CorpusError, Question, QuestionSource};
use sqlx::SqlitePool;

use crate::models::QuestionRow;
use crate::{Database, Result};

/// Insert a question, returning its assigned id.
pub async fn add_question(
    pool: &SqlitePool,
    language: &str,
    prompt: &str,
    answer: &str,
    hint: Option<&str>,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO questions (language, prompt, answer, hint)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(language)
    .bind(prompt)
    .bind(answer)
    .bind(hint)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Draw a uniformly random question for a language.
///
/// Language matching is case-insensitive. `None` when the language has
/// no questions.
pub async fn random_question(pool: &SqlitePool, language: &str) -> Result<Option<Question>> {
    let row = sqlx::query_as::<_, QuestionRow>(
        r#"
        SELECT question_id, language, prompt, answer, hint
        FROM questions
        WHERE lower(language) = lower(?)
        ORDER BY RANDOM()
        LIMIT 1
        "#,
    )
    .bind(language)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Question::from))
}

/// Fetch a question by id. `None` when the id is unknown.
pub async fn get_question(pool: &SqlitePool, question_id: i64) -> Result<Option<Question>> {
    let row = sqlx::query_as::<_, QuestionRow>(
        r#"
        SELECT question_id, language, prompt, answer, hint
        FROM questions
        WHERE question_id = ?
        "#,
    )
    .bind(question_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Question::from))
}

/// Distinct languages present in the corpus, lower-cased and sorted.
pub async fn languages(pool: &SqlitePool) -> Result<Vec<String>> {
    let languages = sqlx::query_scalar::<_, String>(
        r#"
        SELECT DISTINCT lower(language)
        FROM questions
        ORDER BY lower(language)
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(languages)
}

/// Count all questions.
pub async fn count_questions(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM questions
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Count questions grouped by language.
pub async fn count_by_language(pool: &SqlitePool) -> Result<Vec<(String, i64)>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT lower(language) AS language, COUNT(*) as count
        FROM questions
        GROUP BY lower(language)
        ORDER BY count DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[async_trait]
impl QuestionSource for Database {
    async fn random_question(
        &self,
        language: &str,
    ) -> std::result::Result<Option<Question>, CorpusError> {
        random_question(self.pool(), language)
            .await
            .map_err(|e| CorpusError::Unavailable(e.to_string()))
    }

    async fn lookup(&self, question_id: i64) -> std::result::Result<Option<Question>, CorpusError> {
        get_question(self.pool(), question_id)
            .await
            .map_err(|e| CorpusError::Unavailable(e.to_string()))
    }

    async fn languages(&self) -> std::result::Result<Vec<String>, CorpusError> {
        languages(self.pool())
            .await
            .map_err(|e| CorpusError::Unavailable(e.to_string()))
    }
}
