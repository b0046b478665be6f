//! Outbound reply intents returned to the transport.

use serde::{Deserialize, Serialize};

/// A reply intent produced by the engine.
///
/// Replies carry no transport formatting. A console front end prints the
/// choices as a numbered menu; a chat transport renders them as buttons
/// and translates a pressed button back into the matching inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    /// Plain text.
    Text {
        /// Message body.
        message: String,
    },

    /// Text plus a set of suggested next actions.
    TextWithChoices {
        /// Message body.
        message: String,
        /// Actions the transport should offer.
        choices: Vec<Choice>,
    },
}

impl Reply {
    /// Create a plain text reply.
    pub fn text(message: impl Into<String>) -> Self {
        Self::Text {
            message: message.into(),
        }
    }

    /// Create a reply with choices.
    pub fn with_choices(message: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self::TextWithChoices {
            message: message.into(),
            choices,
        }
    }

    /// The text content of the reply.
    pub fn message(&self) -> &str {
        match self {
            Self::Text { message } => message,
            Self::TextWithChoices { message, .. } => message,
        }
    }

    /// The choices attached to the reply, if any.
    pub fn choices(&self) -> &[Choice] {
        match self {
            Self::Text { .. } => &[],
            Self::TextWithChoices { choices, .. } => choices,
        }
    }
}

/// A single selectable choice offered with a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Label the transport should display.
    pub label: String,
    /// What selecting this choice means.
    pub action: ChoiceAction,
}

impl Choice {
    /// Create a choice.
    pub fn new(label: impl Into<String>, action: ChoiceAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// The closed set of actions a choice can stand for.
///
/// Each variant maps onto one inbound event kind, except
/// `ComposeAnswer`, which asks the transport to collect free text from
/// the user and deliver it as a `SubmitAnswer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChoiceAction {
    /// Select the named language.
    SelectLanguage {
        /// Language to select.
        language: String,
    },
    /// Ask for a question.
    RequestQuestion,
    /// Ask for a hint to the pending question.
    RequestHint,
    /// Collect and submit an answer.
    ComposeAnswer,
    /// Ask for the score summary.
    ScoreQuery,
    /// Go back to language selection.
    ChangeLanguage,
}
