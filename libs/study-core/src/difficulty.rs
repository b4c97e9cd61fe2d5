//! Adaptive difficulty control.
//!
//! Tracks rolling accuracy per item and shifts its 1-5 difficulty level,
//! and selects items near a target level for a session.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    PerformanceSample, Question, QuestionContent, ReviewState, DIFFICULTY_MAX, DIFFICULTY_MIN,
};

/// Accuracy above which an item's difficulty is raised.
const RAISE_AT: f64 = 0.8;
/// Accuracy below which an item's difficulty is lowered.
const LOWER_AT: f64 = 0.5;
/// Recent accuracy considered "challenging but doable".
const ACCURACY_SWEET_SPOT: f64 = 0.65;

/// Why a difficulty evaluation did (or did not) move the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftReason {
    HighAccuracy,
    LowAccuracy,
    Stable,
    AtCeiling,
    AtFloor,
}

impl fmt::Display for ShiftReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::HighAccuracy => "high_accuracy",
            Self::LowAccuracy => "low_accuracy",
            Self::Stable => "stable",
            Self::AtCeiling => "at_ceiling",
            Self::AtFloor => "at_floor",
        };
        f.write_str(text)
    }
}

/// Outcome of a difficulty evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftDecision {
    pub adjust: bool,
    pub new_level: u8,
    pub reason: ShiftReason,
}

/// Rolling accuracy for a state; 0.5 when nothing has been recorded yet
/// (uninformative prior).
pub fn accuracy(state: &ReviewState) -> f64 {
    if state.count == 0 {
        0.5
    } else {
        f64::from(state.correct) / f64::from(state.count)
    }
}

/// Decide whether the difficulty level should move for the given
/// accuracy.
pub fn decide_shift(accuracy: f64, level: u8) -> ShiftDecision {
    if accuracy >= RAISE_AT {
        if level < DIFFICULTY_MAX {
            ShiftDecision {
                adjust: true,
                new_level: level + 1,
                reason: ShiftReason::HighAccuracy,
            }
        } else {
            ShiftDecision {
                adjust: false,
                new_level: level,
                reason: ShiftReason::AtCeiling,
            }
        }
    } else if accuracy <= LOWER_AT {
        if level > DIFFICULTY_MIN {
            ShiftDecision {
                adjust: true,
                new_level: level - 1,
                reason: ShiftReason::LowAccuracy,
            }
        } else {
            ShiftDecision {
                adjust: false,
                new_level: level,
                reason: ShiftReason::AtFloor,
            }
        }
    } else {
        ShiftDecision {
            adjust: false,
            new_level: level,
            reason: ShiftReason::Stable,
        }
    }
}

/// Record a graded outcome on a state whose review counter the
/// scheduler has already advanced: update the correct counter,
/// re-evaluate the difficulty level, and append a performance sample.
pub fn record_outcome(state: &mut ReviewState, was_correct: bool, now: DateTime<Utc>) {
    if was_correct {
        state.correct += 1;
    }

    let decision = decide_shift(accuracy(state), state.difficulty);
    if decision.adjust {
        state.difficulty = decision.new_level;
        state.difficulty_updated_at = Some(now);
    }
    state.difficulty_reason = Some(decision.reason.to_string());

    state.recent_performance.push(PerformanceSample {
        correct: was_correct,
        difficulty: state.difficulty,
        timestamp: now,
    });
}

/// Difficulty assigned to a question: its tracked level when state
/// exists, otherwise a default by content type.
pub fn assigned_level(question: &Question, states: &HashMap<String, ReviewState>) -> u8 {
    if let Some(state) = states.get(&question.id) {
        return state.difficulty;
    }
    match &question.content {
        QuestionContent::Boolean { .. } => 2,
        QuestionContent::Short { synonyms, .. } => {
            if synonyms.len() > 3 {
                4
            } else {
                3
            }
        }
        QuestionContent::Keyword { .. } | QuestionContent::Essay { .. } => 4,
    }
}

/// Select questions within `target ± tolerance`, ordered by closeness
/// to the target level and then by how near their accuracy sits to the
/// sweet spot.
pub fn select_by_difficulty(
    questions: &[Question],
    states: &HashMap<String, ReviewState>,
    target: u8,
    tolerance: u8,
) -> Vec<Question> {
    let mut scored: Vec<(u8, f64, &Question)> = questions
        .iter()
        .filter_map(|question| {
            let level = assigned_level(question, states);
            let distance = level.abs_diff(target);
            if distance > tolerance {
                return None;
            }
            let item_accuracy = states
                .get(&question.id)
                .map(accuracy)
                .unwrap_or(0.5);
            Some((distance, (item_accuracy - ACCURACY_SWEET_SPOT).abs(), question))
        })
        .collect();

    scored.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then(a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    });

    scored.into_iter().map(|(_, _, q)| q.clone()).collect()
}
