//! Core types for the Codedrill quiz engine.
//!
//! This crate defines the contracts shared by the rest of the workspace:
//! the inbound event and outbound reply unions a transport exchanges with
//! the engine, the per-user session state machine, and the question
//! corpus abstraction with an in-memory implementation for tests and
//! demos.
//!
//! # Example
//!
//! ```
//! use quiz_core::{SessionState, Question};
//!
//! let mut session = SessionState::Idle;
//! session.select_language("python");
//! session.begin_question(7).unwrap();
//! assert_eq!(session.pending_question(), Some(7));
//!
//! let question = Question {
//!     question_id: 7,
//!     language: "python".to_string(),
//!     prompt: "What does 2 + 2 evaluate to?".to_string(),
//!     answer: "4".to_string(),
//!     hint: None,
//! };
//! assert!(question.accepts("  4 "));
//! ```

pub mod event;
pub mod question;
pub mod reply;
pub mod session;

pub use event::{EventKind, InboundEvent, UserRef};
pub use question::{CorpusError, Question, QuestionSource, StaticCorpus};
pub use reply::{Choice, ChoiceAction, Reply};
pub use session::{SessionError, SessionState};
