//! Per-user conversation state machine.

use thiserror::Error;

/// Why a transition was refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The attempted action is not legal in the current state.
    #[error("cannot {event} while {state}")]
    InvalidTransition {
        /// Name of the state the session was in.
        state: &'static str,
        /// Name of the attempted action.
        event: &'static str,
    },
}

/// Conversation state for one user.
///
/// The variants make illegal combinations unrepresentable: a pending
/// question exists only while an answer is awaited, and only together
/// with the language it was drawn for. Sessions are held in memory
/// only; losing one costs the user a language selection, never points.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No language chosen yet.
    #[default]
    Idle,

    /// A language is chosen and no question is outstanding.
    LanguageSelected {
        /// The chosen language.
        language: String,
    },

    /// A question was served and its answer is outstanding.
    AwaitingAnswer {
        /// The chosen language.
        language: String,
        /// Corpus id of the question awaiting an answer.
        question_id: i64,
    },
}

impl SessionState {
    /// Short state name for errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::LanguageSelected { .. } => "language_selected",
            Self::AwaitingAnswer { .. } => "awaiting_answer",
        }
    }

    /// The selected language, if one is chosen.
    pub fn language(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::LanguageSelected { language } | Self::AwaitingAnswer { language, .. } => {
                Some(language)
            }
        }
    }

    /// The pending question id, if an answer is awaited.
    pub fn pending_question(&self) -> Option<i64> {
        match self {
            Self::AwaitingAnswer { question_id, .. } => Some(*question_id),
            _ => None,
        }
    }

    /// Select a language. Legal from every state.
    ///
    /// Returns the id of the question abandoned by the switch, if one
    /// was pending. Abandoning never scores.
    pub fn select_language(&mut self, language: impl Into<String>) -> Option<i64> {
        let abandoned = self.pending_question();
        *self = Self::LanguageSelected {
            language: language.into(),
        };
        abandoned
    }

    /// Mark a question as served and awaiting its answer.
    ///
    /// Legal once a language is selected. Re-requesting while a question
    /// is already pending abandons the old question unscored and returns
    /// its id. Refused from `Idle`: there is no language to draw from.
    pub fn begin_question(&mut self, question_id: i64) -> Result<Option<i64>, SessionError> {
        match self {
            Self::Idle => Err(SessionError::InvalidTransition {
                state: "idle",
                event: "request_question",
            }),
            Self::LanguageSelected { language } => {
                let language = std::mem::take(language);
                *self = Self::AwaitingAnswer {
                    language,
                    question_id,
                };
                Ok(None)
            }
            Self::AwaitingAnswer {
                language,
                question_id: pending,
            } => {
                let abandoned = *pending;
                let language = std::mem::take(language);
                *self = Self::AwaitingAnswer {
                    language,
                    question_id,
                };
                Ok(Some(abandoned))
            }
        }
    }

    /// The question an answer submission applies to.
    ///
    /// Refused unless an answer is awaited.
    pub fn submission_target(&self) -> Result<i64, SessionError> {
        self.pending_question()
            .ok_or(SessionError::InvalidTransition {
                state: self.name(),
                event: "submit_answer",
            })
    }

    /// The question a hint request applies to.
    ///
    /// Refused unless an answer is awaited.
    pub fn hint_target(&self) -> Result<i64, SessionError> {
        self.pending_question()
            .ok_or(SessionError::InvalidTransition {
                state: self.name(),
                event: "request_hint",
            })
    }

    /// Drop the pending question, keeping the language.
    ///
    /// Used both when an answer attempt resolves the question (right or
    /// wrong) and when an interrupt abandons it. Returns the dropped id;
    /// no-op in states with nothing pending.
    pub fn clear_pending(&mut self) -> Option<i64> {
        match self {
            Self::AwaitingAnswer {
                language,
                question_id,
            } => {
                let dropped = *question_id;
                let language = std::mem::take(language);
                *self = Self::LanguageSelected { language };
                Some(dropped)
            }
            _ => None,
        }
    }

    /// Forget everything and return to `Idle`. Legal from every state.
    pub fn reset(&mut self) {
        *self = Self::Idle;
    }
}
