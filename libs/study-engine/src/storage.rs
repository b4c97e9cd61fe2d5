//! Abstract storage collaborator.
//!
//! Any persistent store satisfying [`StudyStore`] can back the engine;
//! the field names of the core types define the logical schema an
//! adapter must expose.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use study_core::scheduler::is_due;
use study_core::types::{Question, ReviewState};

use crate::error::Result;

/// A review state paired with the question it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredReviewState {
    pub question_id: String,
    #[serde(flatten)]
    pub state: ReviewState,
}

/// Storage collaborator contract.
#[async_trait]
pub trait StudyStore: Send + Sync {
    /// Questions, optionally restricted to one deck.
    async fn get_questions(&self, deck_id: Option<&str>) -> Result<Vec<Question>>;

    /// Review state for one question, if any exists yet.
    async fn get_review_state(&self, question_id: &str) -> Result<Option<ReviewState>>;

    /// Persist the review state for one question.
    async fn put_review_state(&self, question_id: &str, state: ReviewState) -> Result<()>;

    /// All states due on or before the given date.
    async fn get_due_review_states(&self, as_of: NaiveDate) -> Result<Vec<StoredReviewState>>;
}

/// In-process store. Backs tests and embedders that have not wired a
/// persistent adapter yet.
#[derive(Debug, Default)]
pub struct MemoryStore {
    questions: RwLock<Vec<Question>>,
    states: RwLock<HashMap<String, ReviewState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_question(&self, question: Question) {
        self.questions.write().await.push(question);
    }

    pub async fn insert_questions(&self, questions: impl IntoIterator<Item = Question>) {
        self.questions.write().await.extend(questions);
    }

    pub async fn insert_state(&self, question_id: &str, state: ReviewState) {
        self.states
            .write()
            .await
            .insert(question_id.to_string(), state);
    }
}

#[async_trait]
impl StudyStore for MemoryStore {
    async fn get_questions(&self, deck_id: Option<&str>) -> Result<Vec<Question>> {
        let questions = self.questions.read().await;
        Ok(questions
            .iter()
            .filter(|q| deck_id.map_or(true, |deck| q.deck_id == deck))
            .cloned()
            .collect())
    }

    async fn get_review_state(&self, question_id: &str) -> Result<Option<ReviewState>> {
        Ok(self.states.read().await.get(question_id).cloned())
    }

    async fn put_review_state(&self, question_id: &str, state: ReviewState) -> Result<()> {
        self.states
            .write()
            .await
            .insert(question_id.to_string(), state);
        Ok(())
    }

    async fn get_due_review_states(&self, as_of: NaiveDate) -> Result<Vec<StoredReviewState>> {
        Ok(self
            .states
            .read()
            .await
            .iter()
            .filter(|(_, state)| is_due(state, as_of))
            .map(|(question_id, state)| StoredReviewState {
                question_id: question_id.clone(),
                state: state.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use study_core::types::QuestionContent;

    fn question(id: &str, deck_id: &str) -> Question {
        Question {
            id: id.into(),
            deck_id: deck_id.into(),
            prompt: "?".into(),
            tags: vec![],
            content: QuestionContent::Boolean { answer: true },
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    #[tokio::test]
    async fn deck_filter() {
        let store = MemoryStore::new();
        store.insert_question(question("a", "os")).await;
        store.insert_question(question("b", "db")).await;

        assert_eq!(store.get_questions(Some("os")).await.unwrap().len(), 1);
        assert_eq!(store.get_questions(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn state_round_trip() {
        let store = MemoryStore::new();
        assert!(store.get_review_state("a").await.unwrap().is_none());

        let state = ReviewState::new(today());
        store.put_review_state("a", state.clone()).await.unwrap();
        assert_eq!(store.get_review_state("a").await.unwrap(), Some(state));
    }

    #[tokio::test]
    async fn due_query_filters_by_date() {
        let store = MemoryStore::new();
        let mut due = ReviewState::new(today());
        due.due = today() - Duration::days(1);
        let mut later = ReviewState::new(today());
        later.due = today() + Duration::days(5);

        store.put_review_state("due", due).await.unwrap();
        store.put_review_state("later", later).await.unwrap();

        let found = store.get_due_review_states(today()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].question_id, "due");
    }
}
