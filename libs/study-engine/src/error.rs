//! Error handling for the session engine.
//!
//! Only failures the caller can act on surface as errors. The rest of
//! the taxonomy is recovered in place, per the session guarantees:
//! defective content grades as "no match", states referencing missing
//! questions are skipped during queue building, out-of-range review
//! state is clamped on read, and escalation failures fall back to the
//! local grade. Each recovery is logged, never thrown.

use thiserror::Error;

/// Errors surfaced by the session engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("escalation failed: {0}")]
    Escalation(String),

    #[error("no active session")]
    SessionInactive,
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
