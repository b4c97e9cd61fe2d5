//! Answer grading against a question's declared content.

use serde::{Deserialize, Serialize};

use crate::text::{fuzzy_match, normalize, similarity};
use crate::types::{Question, QuestionContent, StudyConfig, ThresholdSpec};

/// Result of grading one answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeOutcome {
    /// Whether the answer passes.
    pub correct: bool,
    /// Score between 0.0 and 1.0.
    pub score: f64,
    /// Satisfied keyword groups, by their first alternative.
    pub hits: Vec<String>,
    /// Unsatisfied keyword groups, by their first alternative.
    pub misses: Vec<String>,
}

impl GradeOutcome {
    fn binary(correct: bool) -> Self {
        Self {
            correct,
            score: if correct { 1.0 } else { 0.0 },
            hits: Vec::new(),
            misses: Vec::new(),
        }
    }
}

/// Grade a raw answer against a question. Never panics; defective
/// content grades as "no match".
pub fn grade(question: &Question, raw_answer: &str, config: &StudyConfig) -> GradeOutcome {
    match &question.content {
        QuestionContent::Boolean { answer } => grade_boolean(*answer, raw_answer),
        QuestionContent::Short {
            answer,
            synonyms,
            fuzzy,
        } => grade_short(answer, synonyms, *fuzzy, raw_answer, config),
        QuestionContent::Keyword { groups, threshold } => {
            grade_keyword(groups, threshold.as_ref(), raw_answer, config)
        }
        QuestionContent::Essay { reference } => grade_essay_local(reference, raw_answer, config),
    }
}

fn grade_boolean(answer: bool, raw_answer: &str) -> GradeOutcome {
    let input = normalize(raw_answer);
    if input.is_empty() {
        return GradeOutcome::binary(false);
    }
    let expected = if answer { "true" } else { "false" };
    GradeOutcome::binary(input == expected)
}

fn grade_short(
    answer: &str,
    synonyms: &[String],
    fuzzy: bool,
    raw_answer: &str,
    config: &StudyConfig,
) -> GradeOutcome {
    let input = normalize(raw_answer);
    if input.is_empty() {
        return GradeOutcome::binary(false);
    }

    let matches = |target: &str| -> bool {
        let target_norm = normalize(target);
        if target_norm.is_empty() {
            return false;
        }
        if input == target_norm {
            return true;
        }
        fuzzy && fuzzy_match(target, raw_answer, config.short_fuzzy_threshold)
    };

    let correct = matches(answer) || synonyms.iter().any(|synonym| matches(synonym));
    GradeOutcome::binary(correct)
}

fn grade_keyword(
    groups: &[Vec<String>],
    threshold: Option<&ThresholdSpec>,
    raw_answer: &str,
    config: &StudyConfig,
) -> GradeOutcome {
    let input = normalize(raw_answer);
    let tokens: Vec<&str> = input.split_whitespace().collect();

    let mut hits = Vec::new();
    let mut misses = Vec::new();
    let mut group_count = 0usize;

    for group in groups {
        let alternatives: Vec<String> = group
            .iter()
            .map(|alt| normalize(alt))
            .filter(|alt| !alt.is_empty())
            .collect();
        if alternatives.is_empty() {
            // Defective group: nothing could ever satisfy it, so it
            // neither counts toward the total nor toward the threshold.
            continue;
        }
        group_count += 1;
        let label = group
            .iter()
            .find(|alt| !alt.trim().is_empty())
            .map(|alt| alt.trim().to_string())
            .unwrap_or_default();

        let hit = alternatives.iter().any(|alt| {
            input.contains(alt.as_str())
                || tokens
                    .iter()
                    .any(|token| similarity(alt, token) >= config.keyword_fuzzy_threshold)
        });

        if hit {
            hits.push(label);
        } else {
            misses.push(label);
        }
    }

    if group_count == 0 {
        return GradeOutcome {
            correct: false,
            score: 0.0,
            hits,
            misses,
        };
    }

    let required = resolve_threshold(threshold, group_count, config.keyword_threshold_ratio);
    let hit_count = hits.len();
    GradeOutcome {
        correct: hit_count >= required,
        score: hit_count as f64 / group_count as f64,
        hits,
        misses,
    }
}

fn grade_essay_local(reference: &str, raw_answer: &str, config: &StudyConfig) -> GradeOutcome {
    let reference_norm = normalize(reference);
    let input = normalize(raw_answer);
    if reference_norm.is_empty() || input.is_empty() {
        return GradeOutcome::binary(false);
    }
    let score = similarity(&reference_norm, &input);
    GradeOutcome {
        correct: score >= config.essay_pass_threshold,
        score,
        hits: Vec::new(),
        misses: Vec::new(),
    }
}

/// Resolve a keyword threshold spec against a group count.
///
/// An explicit count is clamped to `[1, group_count]`; a fraction
/// `"n/d"` becomes `ceil((n/d) * group_count)`, clamped the same way;
/// anything else falls back to `ceil(default_ratio * group_count)`.
/// A zero group count resolves to zero.
pub fn resolve_threshold(
    spec: Option<&ThresholdSpec>,
    group_count: usize,
    default_ratio: f64,
) -> usize {
    if group_count == 0 {
        return 0;
    }
    let clamp = |raw: f64| -> usize {
        let ceiled = raw.ceil();
        if !ceiled.is_finite() || ceiled < 1.0 {
            1
        } else if ceiled >= group_count as f64 {
            group_count
        } else {
            ceiled as usize
        }
    };
    let default = clamp(default_ratio * group_count as f64);
    match spec {
        Some(ThresholdSpec::Count(n)) => clamp(*n as f64),
        Some(ThresholdSpec::Fraction(text)) => match parse_fraction(text) {
            Some(ratio) => clamp(ratio * group_count as f64),
            None => default,
        },
        None => default,
    }
}

fn parse_fraction(text: &str) -> Option<f64> {
    let (numerator, denominator) = text.trim().split_once('/')?;
    let numerator: f64 = numerator.trim().parse().ok()?;
    let denominator: f64 = denominator.trim().parse().ok()?;
    if denominator <= 0.0 || numerator < 0.0 {
        return None;
    }
    Some(numerator / denominator)
}

/// Normalize a flexible keyword-list input into a plain ordered list.
///
/// The editor historically stored keyword lists three ways: a delimited
/// string (`"a, b; c"`), a JSON-encoded array, or an object-like bag
/// whose values are the keywords. Malformed input degrades to an empty
/// list.
pub fn parse_keyword_spec(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        return match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(value) => keyword_items_from_value(&value),
            Err(_) => Vec::new(),
        };
    }
    trimmed
        .split(|c| c == ',' || c == ';' || c == '\n')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn keyword_items_from_value(value: &serde_json::Value) -> Vec<String> {
    let scalar = |v: &serde_json::Value| -> Option<String> {
        match v {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    };
    match value {
        serde_json::Value::Array(items) => items.iter().filter_map(scalar).collect(),
        serde_json::Value::Object(map) => map.values().filter_map(scalar).collect(),
        _ => Vec::new(),
    }
}

/// Split keyword items into alternative groups. `"process|프로세스"`
/// becomes one group whose alternatives are interchangeable.
pub fn keyword_groups(items: &[String]) -> Vec<Vec<String>> {
    items
        .iter()
        .map(|item| {
            item.split('|')
                .map(str::trim)
                .filter(|alt| !alt.is_empty())
                .map(str::to_string)
                .collect()
        })
        .filter(|group: &Vec<String>| !group.is_empty())
        .collect()
}
