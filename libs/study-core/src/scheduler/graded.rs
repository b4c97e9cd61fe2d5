//! Graded (four-grade) scheduling strategy.
//!
//! SM-2 derived with configurable parameters.

use chrono::{Duration, NaiveDate};

use super::ReviewScheduler;
use crate::types::{Grade, LastResult, ReviewState, EASE_MAX, EASE_MIN};

/// Four-grade scheduler with configurable parameters.
#[derive(Debug, Clone)]
pub struct Graded {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    pub maximum_ease: f64,
    /// Ease lost on an Again.
    pub again_penalty: f64,
    /// Ease lost on a Hard.
    pub hard_step: f64,
    /// Ease drift on a Good.
    pub good_step: f64,
    /// Ease gained on an Easy.
    pub easy_step: f64,
    /// Interval multiplier for Hard past the learning steps.
    pub hard_multiplier: f64,
    /// Extra interval multiplier for Easy past the learning steps.
    pub easy_bonus: f64,
    /// First interval after graduating with Hard or Good.
    pub graduating_interval: u32,
    /// First interval after graduating with Easy.
    pub easy_interval: u32,
}

impl Default for Graded {
    fn default() -> Self {
        Self {
            initial_ease: EASE_MAX,
            minimum_ease: EASE_MIN,
            maximum_ease: EASE_MAX,
            again_penalty: 0.8,
            hard_step: 0.15,
            good_step: 0.02,
            easy_step: 0.15,
            hard_multiplier: 1.2,
            easy_bonus: 1.3,
            graduating_interval: 1,
            easy_interval: 4,
        }
    }
}

impl ReviewScheduler for Graded {
    fn name(&self) -> &'static str {
        "graded"
    }

    fn initial_state(&self, today: NaiveDate) -> ReviewState {
        let mut state = ReviewState::new(today);
        state.ease = self.initial_ease;
        state
    }

    fn apply(&self, state: &ReviewState, grade: Grade, today: NaiveDate) -> ReviewState {
        let mut next = state.clone();
        next.count += 1;

        match grade {
            Grade::Again => {
                // Due again the same day.
                next.interval_days = 0;
                next.ease = (state.ease - self.again_penalty).max(self.minimum_ease);
                next.again_count += 1;
                next.last_result = Some(LastResult::Ng);
            }
            Grade::Hard | Grade::Good | Grade::Easy => {
                next.interval_days = self.next_interval(state, grade);
                next.ease = self.next_ease(state.ease, grade);
                next.last_result = Some(LastResult::Ok);
            }
        }

        next.due = today + Duration::days(i64::from(next.interval_days));
        next
    }
}

impl Graded {
    fn next_interval(&self, state: &ReviewState, grade: Grade) -> u32 {
        match state.interval_days {
            0 => {
                if grade == Grade::Easy {
                    self.easy_interval
                } else {
                    self.graduating_interval
                }
            }
            1 => {
                if grade == Grade::Hard {
                    3
                } else {
                    6
                }
            }
            interval => {
                let factor = match grade {
                    Grade::Hard => self.hard_multiplier,
                    Grade::Good => state.ease,
                    Grade::Easy => state.ease * self.easy_bonus,
                    Grade::Again => unreachable!("Again handled in apply"),
                };
                (f64::from(interval) * factor).round() as u32
            }
        }
    }

    fn next_ease(&self, ease: f64, grade: Grade) -> f64 {
        match grade {
            Grade::Hard => (ease - self.hard_step).max(self.minimum_ease),
            Grade::Good => (ease - self.good_step).max(self.minimum_ease),
            Grade::Easy => (ease + self.easy_step).min(self.maximum_ease),
            Grade::Again => unreachable!("Again handled in apply"),
        }
    }
}
