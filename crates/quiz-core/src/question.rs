//! Question types and corpus access.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Corpus-assigned id, stable for the lifetime of the question.
    pub question_id: i64,
    /// Language the question belongs to. Matched case-insensitively.
    pub language: String,
    /// Text shown to the user.
    pub prompt: String,
    /// Expected answer.
    pub answer: String,
    /// Optional hint.
    pub hint: Option<String>,
}

impl Question {
    /// Check whether an answer attempt is correct.
    ///
    /// Attempts are trimmed and compared case-insensitively against the
    /// expected answer. No fuzzy matching, no partial credit.
    pub fn accepts(&self, attempt: &str) -> bool {
        attempt.trim().to_lowercase() == self.answer.trim().to_lowercase()
    }
}

/// Error from a question corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// The corpus could not be consulted.
    #[error("question corpus unavailable: {0}")]
    Unavailable(String),
}

/// Read-only access to a question corpus.
///
/// `Ok(None)` means the corpus answered and holds nothing matching; it
/// is a normal condition (a language with no questions, a stale id),
/// never a failure. `Err` means the corpus could not be consulted at
/// all. This trait is object-safe and can be used with
/// `Box<dyn QuestionSource>`.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Draw a uniformly random question for a language.
    async fn random_question(&self, language: &str) -> Result<Option<Question>, CorpusError>;

    /// Fetch a question by id.
    async fn lookup(&self, question_id: i64) -> Result<Option<Question>, CorpusError>;

    /// Distinct languages present in the corpus, lower-cased and sorted.
    async fn languages(&self) -> Result<Vec<String>, CorpusError>;
}

/// An in-memory corpus over a fixed set of questions.
///
/// Useful for tests and demos where a database would be overkill.
#[derive(Debug, Clone, Default)]
pub struct StaticCorpus {
    questions: Vec<Question>,
}

impl StaticCorpus {
    /// Create a corpus holding the given questions.
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Number of questions in the corpus.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the corpus holds no questions at all.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[async_trait]
impl QuestionSource for StaticCorpus {
    async fn random_question(&self, language: &str) -> Result<Option<Question>, CorpusError> {
        let matching: Vec<&Question> = self
            .questions
            .iter()
            .filter(|q| q.language.eq_ignore_ascii_case(language))
            .collect();

        Ok(matching
            .choose(&mut rand::thread_rng())
            .map(|q| (*q).clone()))
    }

    async fn lookup(&self, question_id: i64) -> Result<Option<Question>, CorpusError> {
        Ok(self
            .questions
            .iter()
            .find(|q| q.question_id == question_id)
            .cloned())
    }

    async fn languages(&self) -> Result<Vec<String>, CorpusError> {
        let mut languages: Vec<String> = self
            .questions
            .iter()
            .map(|q| q.language.to_lowercase())
            .collect();
        languages.sort();
        languages.dedup();
        Ok(languages)
    }
}
