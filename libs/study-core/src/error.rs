//! Error types for study-core.

use thiserror::Error;

/// Defects in authored question content.
///
/// The grader never raises these; it treats a defective record as "no
/// match". They exist so callers can diagnose bad content up front.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("question {id} has an empty reference answer")]
    EmptyAnswer { id: String },

    #[error("keyword question {id} has no keyword groups")]
    NoKeywordGroups { id: String },

    #[error("keyword question {id} has an empty group at index {index}")]
    EmptyGroup { id: String, index: usize },
}
