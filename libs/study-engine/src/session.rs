//! Study session orchestration.
//!
//! One controller owns at most one live session. All state transitions
//! are serialized through it; suspension happens only at storage
//! boundaries.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use study_core::difficulty::{self, select_by_difficulty};
use study_core::grader::{self, GradeOutcome};
use study_core::queue::{build_queue, Provenance, QueueEntry};
use study_core::scheduler::{self, graded::Graded, ReviewScheduler};
use study_core::types::{
    Grade, Question, QuestionContent, ReviewState, StudyConfig, DIFFICULTY_MAX, DIFFICULTY_MIN,
};

use crate::dates::study_today;
use crate::error::{EngineError, Result};
use crate::escalation::{EssayGrader, GradeOrigin};
use crate::stats::DailyStats;
use crate::storage::StudyStore;

/// A graded answer, annotated with where the grade came from.
#[derive(Debug, Clone, Serialize)]
pub struct GradedAnswer {
    pub outcome: GradeOutcome,
    pub origin: GradeOrigin,
    /// Rationale attached to an escalated verdict.
    pub rationale: Option<String>,
}

/// What the presentation layer gets back when a session starts.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub deck_id: String,
    pub total: usize,
    pub first: Option<Question>,
    /// The daily review limit kept due items out of the queue.
    pub limit_reached: bool,
    /// Due reviews still allowed today after this queue was admitted.
    pub daily_limit_remaining: u32,
}

/// Totals reported when a session finishes.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub ok: u32,
    pub ng: u32,
    /// Sum of per-attempt scores.
    pub score: f64,
    pub completed: u32,
}

/// Result of grading the current item.
#[derive(Debug, Clone, Serialize)]
pub enum StepOutcome {
    Next(Question),
    Complete(SessionSummary),
}

struct Session {
    id: Uuid,
    deck_id: String,
    queue: Vec<QueueEntry>,
    index: usize,
    ok: u32,
    ng: u32,
    score: f64,
    repeats: HashMap<String, u32>,
    daily_limit_remaining: u32,
    active: bool,
    pending: Option<GradedAnswer>,
}

/// Owns the live session and wires grading, scheduling, and difficulty
/// tracking to the storage collaborator.
pub struct SessionController {
    store: Arc<dyn StudyStore>,
    essay_grader: Option<Arc<dyn EssayGrader>>,
    scheduler: Box<dyn ReviewScheduler>,
    config: StudyConfig,
    session: Option<Session>,
    stats: DailyStats,
}

impl SessionController {
    pub fn new(store: Arc<dyn StudyStore>, config: StudyConfig) -> Self {
        let today = study_today(config.daily_reset_hour);
        Self {
            store,
            essay_grader: None,
            scheduler: Box::new(Graded::default()),
            config,
            session: None,
            stats: DailyStats::new(today),
        }
    }

    /// Replace the scheduling strategy (e.g. `two_outcome` for decks
    /// whose state predates graded reviews).
    pub fn with_scheduler(mut self, scheduler: Box<dyn ReviewScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_essay_grader(mut self, essay_grader: Arc<dyn EssayGrader>) -> Self {
        self.essay_grader = Some(essay_grader);
        self
    }

    pub fn stats(&self) -> DailyStats {
        self.stats
    }

    pub fn is_active(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.active)
    }

    /// Due reviews the live session may still draw on today.
    pub fn daily_limit_remaining(&self) -> Option<u32> {
        self.session
            .as_ref()
            .filter(|s| s.active)
            .map(|s| s.daily_limit_remaining)
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.session
            .as_ref()
            .filter(|s| s.active)
            .and_then(|s| s.queue.get(s.index))
            .map(|entry| &entry.question)
    }

    /// Start a session over a deck. Any in-flight session is discarded.
    pub async fn start_session(&mut self, deck_id: &str, count: usize) -> Result<SessionSnapshot> {
        if let Some(previous) = self.session.take() {
            tracing::debug!(session = %previous.id, "discarding in-flight session");
        }

        let today = study_today(self.config.daily_reset_hour);
        self.stats.roll_over(today);

        let questions = self.store.get_questions(Some(deck_id)).await?;
        let mut states: HashMap<String, ReviewState> = HashMap::new();
        for question in &questions {
            if let Err(defect) = question.validate() {
                tracing::warn!(question = %question.id, %defect, "defective content will grade as no match");
            }
            if let Some(mut state) = self.store.get_review_state(&question.id).await? {
                if state.clamp_into_bounds() {
                    tracing::warn!(question = %question.id, "review state out of bounds, clamped");
                }
                states.insert(question.id.clone(), state);
            }
        }

        let count = if count == 0 {
            self.config.session_size
        } else {
            count
        };
        let built = build_queue(
            &questions,
            &states,
            today,
            count,
            self.stats.reviews_done,
            &self.config,
            &mut rand::thread_rng(),
        );
        if built.limit_reached {
            tracing::info!(deck = deck_id, "daily review limit reached, filling from later tiers");
        }

        let entries = Self::reorder_by_difficulty(built.entries, &states, &self.config);
        let due_admitted = entries
            .iter()
            .filter(|entry| entry.provenance == Provenance::Due)
            .count() as u32;
        let daily_limit_remaining = self
            .config
            .daily_review_limit
            .saturating_sub(self.stats.reviews_done + due_admitted);

        let session = Session {
            id: Uuid::new_v4(),
            deck_id: deck_id.to_string(),
            queue: entries,
            index: 0,
            ok: 0,
            ng: 0,
            score: 0.0,
            repeats: HashMap::new(),
            daily_limit_remaining,
            active: true,
            pending: None,
        };
        tracing::debug!(
            session = %session.id,
            deck = %session.deck_id,
            queued = session.queue.len(),
            "session started"
        );
        let snapshot = SessionSnapshot {
            id: session.id,
            deck_id: session.deck_id.clone(),
            total: session.queue.len(),
            first: session.queue.first().map(|entry| entry.question.clone()),
            limit_reached: built.limit_reached,
            daily_limit_remaining: session.daily_limit_remaining,
        };
        self.session = Some(session);
        Ok(snapshot)
    }

    /// Grade a typed answer for the current question without advancing
    /// the queue. Essay content may be escalated to the external grader
    /// when the local score is ambiguous.
    pub async fn submit_answer(&mut self, raw_answer: &str) -> Result<GradedAnswer> {
        let entry = {
            let Some(session) = self.session.as_ref().filter(|s| s.active) else {
                return Err(EngineError::SessionInactive);
            };
            session
                .queue
                .get(session.index)
                .cloned()
                .ok_or_else(|| EngineError::NotFound("no current question".to_string()))?
        };

        let outcome = grader::grade(&entry.question, raw_answer, &self.config);
        let essay_grader = self.essay_grader.clone();

        let graded = match (&entry.question.content, essay_grader) {
            (QuestionContent::Essay { reference }, Some(essay_grader))
                if self.is_ambiguous(outcome.score) =>
            {
                match essay_grader
                    .grade_essay(&entry.question.prompt, reference, raw_answer)
                    .await
                {
                    Ok(verdict) => GradedAnswer {
                        outcome: GradeOutcome {
                            correct: verdict.score >= self.config.essay_pass_threshold,
                            score: verdict.score.clamp(0.0, 1.0),
                            hits: Vec::new(),
                            misses: Vec::new(),
                        },
                        origin: GradeOrigin::Escalated,
                        rationale: Some(verdict.rationale),
                    },
                    Err(failure) => {
                        tracing::warn!(%failure, "essay escalation failed, keeping local grade");
                        GradedAnswer {
                            outcome,
                            origin: GradeOrigin::LocalFallback,
                            rationale: None,
                        }
                    }
                }
            }
            _ => GradedAnswer {
                outcome,
                origin: GradeOrigin::Local,
                rationale: None,
            },
        };

        // The session may have been stopped while an escalation was in
        // flight; a cancelled session takes no further writes.
        let Some(session) = self.session.as_mut().filter(|s| s.active) else {
            return Err(EngineError::SessionInactive);
        };
        session.pending = Some(graded.clone());
        Ok(graded)
    }

    /// Record the learner's grade for the current question: update the
    /// review state, persist it, and advance the queue. Again-graded
    /// items are re-queued up to the repeat cap; only final grades move
    /// the completion counters and daily stats.
    pub async fn grade_answer(&mut self, grade: Grade) -> Result<StepOutcome> {
        let today = study_today(self.config.daily_reset_hour);

        let (entry, pending, repeats_used) = {
            let Some(session) = self.session.as_mut().filter(|s| s.active) else {
                return Err(EngineError::SessionInactive);
            };
            let entry = session
                .queue
                .get(session.index)
                .cloned()
                .ok_or_else(|| EngineError::NotFound("no current question".to_string()))?;
            let pending = session.pending.take();
            let used = session.repeats.get(&entry.question.id).copied().unwrap_or(0);
            (entry, pending, used)
        };

        // Flip-mode reviews have no typed answer; the grade stands in.
        let was_correct = pending
            .as_ref()
            .map(|p| p.outcome.correct)
            .unwrap_or(grade != Grade::Again);
        let attempt_score = pending
            .as_ref()
            .map(|p| p.outcome.score)
            .unwrap_or(if was_correct { 1.0 } else { 0.0 });

        let mut state = match self.store.get_review_state(&entry.question.id).await? {
            Some(mut state) => {
                if state.clamp_into_bounds() {
                    tracing::warn!(question = %entry.question.id, "review state out of bounds, clamped");
                }
                state
            }
            None => self.scheduler.initial_state(today),
        };
        state = self.scheduler.apply(&state, grade, today);
        if grade.is_final() {
            difficulty::record_outcome(&mut state, was_correct, Utc::now());
        }
        self.store
            .put_review_state(&entry.question.id, state)
            .await?;

        // A stop that landed while persisting must not be overwritten.
        let Some(session) = self.session.as_mut().filter(|s| s.active) else {
            return Err(EngineError::SessionInactive);
        };

        if grade.is_final() {
            if was_correct {
                session.ok += 1;
            } else {
                session.ng += 1;
            }
            session.score += attempt_score;
            self.stats
                .record(today, entry.provenance == Provenance::Due);
        } else if repeats_used < self.config.repeat_cap {
            session.repeats.insert(entry.question.id.clone(), repeats_used + 1);
            session.queue.push(entry);
        }

        session.index += 1;
        if let Some(next) = session.queue.get(session.index) {
            return Ok(StepOutcome::Next(next.question.clone()));
        }

        let summary = SessionSummary {
            ok: session.ok,
            ng: session.ng,
            score: session.score,
            completed: session.ok + session.ng,
        };
        let finished = session.id;
        self.session = None;
        tracing::debug!(session = %finished, ok = summary.ok, ng = summary.ng, "session complete");
        Ok(StepOutcome::Complete(summary))
    }

    /// Preview the due date a grade would produce. No mutation.
    pub fn preview_next_due(&self, state: &ReviewState, grade: Grade) -> NaiveDate {
        let today = study_today(self.config.daily_reset_hour);
        scheduler::simulate_due_date(self.scheduler.as_ref(), state, grade, today)
    }

    /// Cooperative cancel: the live session stops taking writes and its
    /// queue is dropped.
    pub fn stop_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.active = false;
            session.queue.clear();
            tracing::debug!(session = %session.id, "session stopped");
        }
    }

    /// Due items that still have a matching question. Orphaned states
    /// are skipped, not surfaced.
    pub async fn due_count(&self, deck_id: Option<&str>) -> Result<usize> {
        let today = study_today(self.config.daily_reset_hour);
        let questions = self.store.get_questions(deck_id).await?;
        let known: HashSet<&str> = questions.iter().map(|q| q.id.as_str()).collect();

        let mut count = 0;
        for stored in self.store.get_due_review_states(today).await? {
            if known.contains(stored.question_id.as_str()) {
                count += 1;
            } else {
                tracing::debug!(
                    question = %stored.question_id,
                    "due state without matching question, skipped"
                );
            }
        }
        Ok(count)
    }

    fn is_ambiguous(&self, score: f64) -> bool {
        score >= self.config.essay_escalate_floor && score < self.config.essay_pass_threshold
    }

    /// Reorder the assembled queue toward the learner's current level.
    /// Runs after quota admission so it never changes which items were
    /// admitted under a tight limit; an empty result falls back to the
    /// built order.
    fn reorder_by_difficulty(
        entries: Vec<QueueEntry>,
        states: &HashMap<String, ReviewState>,
        config: &StudyConfig,
    ) -> Vec<QueueEntry> {
        if entries.is_empty() {
            return entries;
        }
        let target = Self::learner_level(states);
        let questions: Vec<Question> =
            entries.iter().map(|entry| entry.question.clone()).collect();
        let selected =
            select_by_difficulty(&questions, states, target, config.difficulty_tolerance);
        if selected.is_empty() {
            tracing::debug!("difficulty reorder yielded nothing, keeping built order");
            return entries;
        }
        let mut by_id: HashMap<String, QueueEntry> = entries
            .into_iter()
            .map(|entry| (entry.question.id.clone(), entry))
            .collect();
        selected
            .iter()
            .filter_map(|question| by_id.remove(&question.id))
            .collect()
    }

    /// Rounded mean tracked difficulty across the deck, 3 when nothing
    /// is tracked yet.
    fn learner_level(states: &HashMap<String, ReviewState>) -> u8 {
        if states.is_empty() {
            return 3;
        }
        let sum: u32 = states.values().map(|s| u32::from(s.difficulty)).sum();
        let mean = (sum as f64 / states.len() as f64).round() as u8;
        mean.clamp(DIFFICULTY_MIN, DIFFICULTY_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, content: QuestionContent) -> Question {
        Question {
            id: id.into(),
            deck_id: "d1".into(),
            prompt: "?".into(),
            tags: vec![],
            content,
        }
    }

    fn entry(id: &str, content: QuestionContent) -> QueueEntry {
        QueueEntry {
            question: question(id, content),
            provenance: Provenance::New,
        }
    }

    #[test]
    fn learner_level_defaults_to_three() {
        assert_eq!(SessionController::learner_level(&HashMap::new()), 3);
    }

    #[test]
    fn learner_level_is_rounded_mean() {
        let today = chrono::NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut states = HashMap::new();
        for (id, level) in [("a", 4u8), ("b", 5u8)] {
            let mut state = ReviewState::new(today);
            state.difficulty = level;
            states.insert(id.to_string(), state);
        }
        assert_eq!(SessionController::learner_level(&states), 5);
    }

    #[test]
    fn reorder_falls_back_when_selection_is_empty() {
        let today = chrono::NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        // Tracked level 5 everywhere; a lone boolean item (level 2)
        // falls outside the window, so the reorder comes back empty.
        let mut states = HashMap::new();
        let mut state = ReviewState::new(today);
        state.difficulty = 5;
        states.insert("other".to_string(), state);

        let entries = vec![entry("b", QuestionContent::Boolean { answer: true })];
        let reordered =
            SessionController::reorder_by_difficulty(entries.clone(), &states, &StudyConfig::default());
        assert_eq!(reordered.len(), entries.len());
        assert_eq!(reordered[0].question.id, "b");
    }
}
