//! Question and state fixtures.

use chrono::{Duration, NaiveDate};
use study_core::types::{Question, QuestionContent, ReviewState};

pub const DECK: &str = "os";

pub fn boolean(id: &str, answer: bool) -> Question {
    Question {
        id: id.into(),
        deck_id: DECK.into(),
        prompt: format!("{id}?"),
        tags: vec![],
        content: QuestionContent::Boolean { answer },
    }
}

pub fn short(id: &str, answer: &str, fuzzy: bool) -> Question {
    Question {
        id: id.into(),
        deck_id: DECK.into(),
        prompt: format!("{id}?"),
        tags: vec![],
        content: QuestionContent::Short {
            answer: answer.into(),
            synonyms: vec![],
            fuzzy,
        },
    }
}

pub fn keyword(id: &str, groups: &[&[&str]]) -> Question {
    Question {
        id: id.into(),
        deck_id: DECK.into(),
        prompt: format!("{id}?"),
        tags: vec![],
        content: QuestionContent::Keyword {
            groups: groups
                .iter()
                .map(|group| group.iter().map(|alt| alt.to_string()).collect())
                .collect(),
            threshold: None,
        },
    }
}

pub fn essay(id: &str, reference: &str) -> Question {
    Question {
        id: id.into(),
        deck_id: DECK.into(),
        prompt: format!("{id}?"),
        tags: vec![],
        content: QuestionContent::Essay {
            reference: reference.into(),
        },
    }
}

/// State that became due `days_ago` days before `today`.
pub fn due_state(today: NaiveDate, days_ago: i64) -> ReviewState {
    let mut state = ReviewState::new(today);
    state.due = today - Duration::days(days_ago);
    state.count = 1;
    state
}
