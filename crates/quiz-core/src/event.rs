//! Inbound events delivered by a chat transport.

use serde::{Deserialize, Serialize};

/// The user an event originates from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    /// Opaque, stable identifier assigned by the transport. The engine
    /// never interprets it.
    pub user_id: String,
    /// Display name as the transport currently knows it. May change
    /// between events; the latest one wins.
    pub display_name: String,
}

impl UserRef {
    /// Create a user reference.
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
        }
    }
}

/// An event attributed to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Who did it.
    pub user: UserRef,
    /// What they did.
    pub kind: EventKind,
}

impl InboundEvent {
    /// Create an event for the given user.
    pub fn new(user: UserRef, kind: EventKind) -> Self {
        Self { user, kind }
    }
}

/// The closed set of things a user can do.
///
/// Transports map their own input formats (commands, button callbacks,
/// free text) into these variants; the engine never sees raw transport
/// payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// First contact or an explicit greeting command.
    Start,

    /// The user picked a question language.
    SelectLanguage {
        /// Language name as captured by the transport. Matched
        /// case-insensitively against the corpus.
        language: String,
    },

    /// The user asked for a question in their selected language.
    RequestQuestion,

    /// The user asked for a hint to the pending question.
    RequestHint,

    /// The user submitted an answer attempt.
    SubmitAnswer {
        /// Raw answer text, untrimmed.
        text: String,
    },

    /// The user asked for their score.
    ScoreQuery,

    /// The user asked to go back to language selection.
    ChangeLanguage,
}

impl EventKind {
    /// Short name for logs and errors.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::SelectLanguage { .. } => "select_language",
            Self::RequestQuestion => "request_question",
            Self::RequestHint => "request_hint",
            Self::SubmitAnswer { .. } => "submit_answer",
            Self::ScoreQuery => "score_query",
            Self::ChangeLanguage => "change_language",
        }
    }
}
