//! Legacy two-outcome scheduling strategy.
//!
//! The old flow recorded only correct/incorrect. State persisted by it
//! replays through this strategy; new sessions use `graded`.

use chrono::{Duration, NaiveDate};

use super::ReviewScheduler;
use crate::types::{Grade, LastResult, ReviewState, EASE_MAX, EASE_MIN};

/// Two-outcome scheduler. Again maps to incorrect, every other grade to
/// correct.
#[derive(Debug, Clone)]
pub struct TwoOutcome {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    pub maximum_ease: f64,
    /// Ease lost on an incorrect answer.
    pub miss_penalty: f64,
    /// Ease gained on a correct answer.
    pub reward: f64,
}

impl Default for TwoOutcome {
    fn default() -> Self {
        Self {
            initial_ease: EASE_MAX,
            minimum_ease: EASE_MIN,
            maximum_ease: EASE_MAX,
            miss_penalty: 0.2,
            reward: 0.13,
        }
    }
}

impl TwoOutcome {
    /// Apply a bare correct/incorrect outcome, the shape the old flow
    /// recorded.
    pub fn apply_correct(
        &self,
        state: &ReviewState,
        correct: bool,
        today: NaiveDate,
    ) -> ReviewState {
        let mut next = state.clone();
        next.count += 1;

        if correct {
            next.interval_days = match state.interval_days {
                0 => 1,
                1 => 3,
                interval => (f64::from(interval) * state.ease).round() as u32,
            };
            next.ease = (state.ease + self.reward).min(self.maximum_ease);
            next.last_result = Some(LastResult::Ok);
        } else {
            next.interval_days = 1;
            next.ease = (state.ease - self.miss_penalty).max(self.minimum_ease);
            next.again_count += 1;
            next.last_result = Some(LastResult::Ng);
        }

        next.due = today + Duration::days(i64::from(next.interval_days));
        next
    }
}

impl ReviewScheduler for TwoOutcome {
    fn name(&self) -> &'static str {
        "two_outcome"
    }

    fn initial_state(&self, today: NaiveDate) -> ReviewState {
        let mut state = ReviewState::new(today);
        state.ease = self.initial_ease;
        state
    }

    fn apply(&self, state: &ReviewState, grade: Grade, today: NaiveDate) -> ReviewState {
        self.apply_correct(state, grade != Grade::Again, today)
    }
}
