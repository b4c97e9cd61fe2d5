//! Review scheduling strategies.

pub mod graded;
pub mod legacy;

use chrono::NaiveDate;

use crate::types::{Grade, ReviewState};

/// Trait for review scheduling strategies.
pub trait ReviewScheduler: Send + Sync {
    /// Strategy identifier.
    fn name(&self) -> &'static str;

    /// Fresh state for an unreviewed question.
    fn initial_state(&self, today: NaiveDate) -> ReviewState;

    /// Successor state after grading a review. Pure; the input is not
    /// mutated.
    fn apply(&self, state: &ReviewState, grade: Grade, today: NaiveDate) -> ReviewState;
}

/// Get a strategy by name. New sessions use `graded`; `two_outcome`
/// replays state persisted by the old correct/incorrect flow.
pub fn get_scheduler(name: &str) -> Option<Box<dyn ReviewScheduler>> {
    match name {
        "graded" => Some(Box::new(graded::Graded::default())),
        "two_outcome" => Some(Box::new(legacy::TwoOutcome::default())),
        _ => None,
    }
}

/// Whether a state is eligible for review.
pub fn is_due(state: &ReviewState, today: NaiveDate) -> bool {
    state.due <= today
}

/// Preview the interval a grade would produce, without touching the
/// persisted state.
pub fn simulate_interval(
    scheduler: &dyn ReviewScheduler,
    state: &ReviewState,
    grade: Grade,
    today: NaiveDate,
) -> u32 {
    scheduler.apply(state, grade, today).interval_days
}

/// Preview the due date a grade would produce.
pub fn simulate_due_date(
    scheduler: &dyn ReviewScheduler,
    state: &ReviewState,
    grade: Grade,
    today: NaiveDate,
) -> NaiveDate {
    scheduler.apply(state, grade, today).due
}
