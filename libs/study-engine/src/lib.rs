//! Session engine over the study core.
//!
//! Provides:
//! - The abstract storage collaborator and an in-memory implementation
//! - The session controller (start, submit, grade, stop)
//! - Daily statistics with study-day rollover
//! - Optional escalation to an external essay grader
//!
//! The embedding application owns the tracing subscriber; this crate
//! only emits.

pub mod dates;
pub mod error;
pub mod escalation;
pub mod session;
pub mod stats;
pub mod storage;

pub use error::{EngineError, Result};
pub use escalation::{EssayGrader, EssayVerdict, GradeOrigin};
pub use session::{
    GradedAnswer, SessionController, SessionSnapshot, SessionSummary, StepOutcome,
};
pub use stats::DailyStats;
pub use storage::{MemoryStore, StoredReviewState, StudyStore};
