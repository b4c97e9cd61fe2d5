//! Core study scheduling and grading library.
//!
//! Provides:
//! - Text normalization and edit-distance answer matching
//! - Answer grading for boolean, short, keyword, and essay content
//! - Review scheduling strategies (graded and legacy two-outcome)
//! - Adaptive difficulty tracking and selection
//! - Session queue assembly under daily quotas
//!
//! Everything here is pure and synchronous; persistence and session
//! orchestration live in `study-engine`.

pub mod difficulty;
pub mod error;
pub mod grader;
pub mod history;
pub mod queue;
pub mod scheduler;
pub mod text;
pub mod types;

pub use difficulty::{accuracy, decide_shift, record_outcome, select_by_difficulty, ShiftDecision};
pub use error::ContentError;
pub use grader::{grade, parse_keyword_spec, resolve_threshold, GradeOutcome};
pub use history::BoundedLog;
pub use queue::{build_queue, BuiltQueue, Provenance, QueueEntry};
pub use scheduler::{
    get_scheduler, is_due, simulate_due_date, simulate_interval, ReviewScheduler,
};
pub use text::{edit_distance, fuzzy_match, normalize, similarity};
pub use types::{
    Grade, LastResult, PerformanceSample, Question, QuestionContent, ReviewState, StudyConfig,
    ThresholdSpec,
};
