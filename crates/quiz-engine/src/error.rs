//! Error types for engine operations.

use database::DatabaseError;
use quiz_core::CorpusError;
use thiserror::Error;

/// Errors that escape event handling.
///
/// Everything user-recoverable (wrong state, unknown language, empty
/// corpus) comes back as a reply instead. An `EngineError` means a
/// store could not be consulted even after a retry; the caller should
/// apologize generically and move on.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The score ledger could not be read or written.
    #[error("ledger error: {0}")]
    Ledger(#[from] DatabaseError),

    /// The question corpus could not be consulted.
    #[error("corpus error: {0}")]
    Corpus(#[from] CorpusError),
}
