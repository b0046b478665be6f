//! Conversation controller for the Codedrill quiz engine.
//!
//! [`QuizEngine`] turns inbound events into session transitions, corpus
//! draws, and ledger writes, and hands back the replies the transport
//! should deliver. Events for one user are handled strictly one at a
//! time; different users proceed concurrently.
//!
//! # Example
//!
//! ```no_run
//! use database::Database;
//! use quiz_core::{EventKind, InboundEvent, UserRef};
//! use quiz_engine::QuizEngine;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:codedrill.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // The database doubles as the question corpus.
//!     let engine = QuizEngine::new(db.clone(), db);
//!
//!     let event = InboundEvent::new(UserRef::new("u1", "Alice"), EventKind::Start);
//!     for reply in engine.handle(event).await? {
//!         println!("{}", reply.message());
//!     }
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod error;
pub mod sessions;

pub use engine::QuizEngine;
pub use error::EngineError;
pub use sessions::SessionMap;
