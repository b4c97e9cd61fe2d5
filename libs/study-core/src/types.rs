//! Core types for the study engine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::history::BoundedLog;

/// Lower bound for the ease factor.
pub const EASE_MIN: f64 = 1.3;
/// Upper bound for the ease factor.
pub const EASE_MAX: f64 = 2.5;
/// Lowest difficulty level.
pub const DIFFICULTY_MIN: u8 = 1;
/// Highest difficulty level.
pub const DIFFICULTY_MAX: u8 = 5;

/// How many performance samples a review state retains.
pub const PERFORMANCE_WINDOW: usize = 10;

/// Quality grade for a completed review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Again,
    Hard,
    Good,
    Easy,
}

impl Grade {
    /// Convert to numeric value (0-3).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Again => 0,
            Self::Hard => 1,
            Self::Good => 2,
            Self::Easy => 3,
        }
    }

    /// Create from numeric value.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Again),
            1 => Some(Self::Hard),
            2 => Some(Self::Good),
            3 => Some(Self::Easy),
            _ => None,
        }
    }

    /// Map a two-outcome result onto the graded scale.
    /// Incorrect -> Again, correct -> Good
    pub fn from_2point(correct: bool) -> Self {
        if correct { Self::Good } else { Self::Again }
    }

    /// Whether this grade completes the attempt (everything but Again).
    pub fn is_final(self) -> bool {
        !matches!(self, Self::Again)
    }
}

/// Outcome of the most recent completed review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LastResult {
    Ok,
    Ng,
}

/// Explicit keyword threshold as authored in the content editor.
///
/// Either an absolute hit count or a fraction string like `"2/3"`.
/// Resolution against a concrete group count happens in the grader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThresholdSpec {
    Count(i64),
    Fraction(String),
}

/// Type-specific question content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionContent {
    Boolean {
        answer: bool,
    },
    Short {
        answer: String,
        #[serde(default)]
        synonyms: Vec<String>,
        #[serde(default)]
        fuzzy: bool,
    },
    Keyword {
        groups: Vec<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        threshold: Option<ThresholdSpec>,
    },
    Essay {
        reference: String,
    },
}

/// A study item. Authored by the content editor; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub deck_id: String,
    pub prompt: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub content: QuestionContent,
}

impl Question {
    /// The `group:<name>` tag, if any. Items sharing one are queued as
    /// a unit.
    pub fn group_tag(&self) -> Option<&str> {
        self.tags
            .iter()
            .find_map(|tag| tag.strip_prefix("group:"))
            .filter(|name| !name.is_empty())
    }

    /// Check the content record for defects the grader will silently
    /// treat as "no match".
    pub fn validate(&self) -> Result<(), crate::error::ContentError> {
        use crate::error::ContentError;
        match &self.content {
            QuestionContent::Boolean { .. } => Ok(()),
            QuestionContent::Short { answer, .. } => {
                if answer.trim().is_empty() {
                    Err(ContentError::EmptyAnswer {
                        id: self.id.clone(),
                    })
                } else {
                    Ok(())
                }
            }
            QuestionContent::Keyword { groups, .. } => {
                if groups.is_empty() {
                    return Err(ContentError::NoKeywordGroups {
                        id: self.id.clone(),
                    });
                }
                for (index, group) in groups.iter().enumerate() {
                    if group.iter().all(|alt| alt.trim().is_empty()) {
                        return Err(ContentError::EmptyGroup {
                            id: self.id.clone(),
                            index,
                        });
                    }
                }
                Ok(())
            }
            QuestionContent::Essay { reference } => {
                if reference.trim().is_empty() {
                    Err(ContentError::EmptyAnswer {
                        id: self.id.clone(),
                    })
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// One graded attempt retained for difficulty tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub correct: bool,
    pub difficulty: u8,
    pub timestamp: DateTime<Utc>,
}

/// Per-question review state. Created lazily on the first review,
/// mutated only by the scheduler and the difficulty controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    pub ease: f64,
    pub interval_days: u32,
    pub due: NaiveDate,
    pub count: u32,
    pub correct: u32,
    pub again_count: u32,
    pub last_result: Option<LastResult>,
    pub difficulty: u8,
    pub difficulty_updated_at: Option<DateTime<Utc>>,
    pub difficulty_reason: Option<String>,
    pub recent_performance: BoundedLog<PerformanceSample>,
}

impl ReviewState {
    /// Fresh state for an unreviewed question, due immediately.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            ease: EASE_MAX,
            interval_days: 0,
            due: today,
            count: 0,
            correct: 0,
            again_count: 0,
            last_result: None,
            difficulty: 3,
            difficulty_updated_at: None,
            difficulty_reason: None,
            recent_performance: BoundedLog::new(PERFORMANCE_WINDOW),
        }
    }

    /// Repair ease and difficulty that drifted outside their invariant
    /// ranges (historical data may predate enforcement). Returns whether
    /// anything was changed so callers can log the anomaly.
    pub fn clamp_into_bounds(&mut self) -> bool {
        let mut changed = false;
        if !self.ease.is_finite() {
            self.ease = EASE_MAX;
            changed = true;
        } else if !(EASE_MIN..=EASE_MAX).contains(&self.ease) {
            self.ease = self.ease.clamp(EASE_MIN, EASE_MAX);
            changed = true;
        }
        if !(DIFFICULTY_MIN..=DIFFICULTY_MAX).contains(&self.difficulty) {
            self.difficulty = self.difficulty.clamp(DIFFICULTY_MIN, DIFFICULTY_MAX);
            changed = true;
        }
        changed
    }
}

/// Tunable constants for grading and queue assembly.
///
/// Defaults preserve the product heuristics (0.75 keyword ratio, 0.85
/// fuzzy constants) rather than re-deriving them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyConfig {
    /// General fuzzy-match threshold.
    pub fuzzy_threshold: f64,
    /// Threshold for short-answer fuzzy matching.
    pub short_fuzzy_threshold: f64,
    /// Threshold for per-token keyword fuzzy matching.
    pub keyword_fuzzy_threshold: f64,
    /// Default keyword threshold as a fraction of the group count.
    pub keyword_threshold_ratio: f64,
    /// Local essay score at or above which the answer passes.
    pub essay_pass_threshold: f64,
    /// Local essay score at or above which an ambiguous result may be
    /// escalated to the external grader.
    pub essay_escalate_floor: f64,
    /// Ease at or below which a non-due item counts as low-confidence.
    pub low_confidence_ease: f64,
    /// Reviews of due items allowed per study day.
    pub daily_review_limit: u32,
    /// Default queue size for a session.
    pub session_size: usize,
    /// Times an Again-graded item may reappear within one session.
    pub repeat_cap: u32,
    /// Difficulty window for the reorder pass.
    pub difficulty_tolerance: u8,
    /// Hour of day (0-23) when a new study day begins.
    pub daily_reset_hour: u32,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.8,
            short_fuzzy_threshold: 0.85,
            keyword_fuzzy_threshold: 0.85,
            keyword_threshold_ratio: 0.75,
            essay_pass_threshold: 0.8,
            essay_escalate_floor: 0.4,
            low_confidence_ease: 1.5,
            daily_review_limit: 100,
            session_size: 20,
            repeat_cap: 2,
            difficulty_tolerance: 1,
            daily_reset_hour: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn grade_value_round_trip() {
        for value in 0..4 {
            assert_eq!(Grade::from_value(value).unwrap().to_value(), value);
        }
        assert_eq!(Grade::from_value(4), None);
    }

    #[test]
    fn grade_from_2point() {
        assert_eq!(Grade::from_2point(true), Grade::Good);
        assert_eq!(Grade::from_2point(false), Grade::Again);
    }

    #[test]
    fn group_tag_extraction() {
        let question = Question {
            id: "q1".into(),
            deck_id: "d1".into(),
            prompt: "?".into(),
            tags: vec!["network".into(), "group:tcp".into()],
            content: QuestionContent::Boolean { answer: true },
        };
        assert_eq!(question.group_tag(), Some("tcp"));
    }

    #[test]
    fn empty_group_tag_is_ignored() {
        let question = Question {
            id: "q1".into(),
            deck_id: "d1".into(),
            prompt: "?".into(),
            tags: vec!["group:".into()],
            content: QuestionContent::Boolean { answer: true },
        };
        assert_eq!(question.group_tag(), None);
    }

    #[test]
    fn clamp_repairs_out_of_range_ease() {
        let mut state = ReviewState::new(date(2026, 1, 1));
        state.ease = 9.0;
        assert!(state.clamp_into_bounds());
        assert_eq!(state.ease, EASE_MAX);

        state.ease = 0.4;
        assert!(state.clamp_into_bounds());
        assert_eq!(state.ease, EASE_MIN);
    }

    #[test]
    fn clamp_repairs_non_finite_ease() {
        let mut state = ReviewState::new(date(2026, 1, 1));
        state.ease = f64::NAN;
        assert!(state.clamp_into_bounds());
        assert_eq!(state.ease, EASE_MAX);
    }

    #[test]
    fn clamp_repairs_difficulty() {
        let mut state = ReviewState::new(date(2026, 1, 1));
        state.difficulty = 0;
        assert!(state.clamp_into_bounds());
        assert_eq!(state.difficulty, DIFFICULTY_MIN);

        state.difficulty = 7;
        assert!(state.clamp_into_bounds());
        assert_eq!(state.difficulty, DIFFICULTY_MAX);
    }

    #[test]
    fn clamp_leaves_valid_state_alone() {
        let mut state = ReviewState::new(date(2026, 1, 1));
        assert!(!state.clamp_into_bounds());
    }

    #[test]
    fn question_content_serde_tagging() {
        let question = Question {
            id: "q1".into(),
            deck_id: "d1".into(),
            prompt: "Is TCP connection-oriented?".into(),
            tags: vec![],
            content: QuestionContent::Boolean { answer: true },
        };
        let json = serde_json::to_value(&question).unwrap();
        assert_eq!(json["type"], "boolean");
        assert_eq!(json["answer"], true);
    }

    #[test]
    fn threshold_spec_accepts_count_and_fraction() {
        let count: ThresholdSpec = serde_json::from_str("2").unwrap();
        assert_eq!(count, ThresholdSpec::Count(2));
        let fraction: ThresholdSpec = serde_json::from_str("\"2/3\"").unwrap();
        assert_eq!(fraction, ThresholdSpec::Fraction("2/3".into()));
    }
}
