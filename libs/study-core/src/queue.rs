//! Session queue assembly.
//!
//! Classifies the item pool into due/new/low-confidence/rest buckets,
//! groups linked items, and fills a bounded queue under the daily
//! review quota.

use std::collections::HashMap;

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::scheduler::is_due;
use crate::types::{Question, ReviewState, StudyConfig};

/// Why an item was admitted into the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Due,
    New,
    Low,
    Rest,
}

impl Provenance {
    /// Tier order; lower ranks fill first.
    fn rank(self) -> u8 {
        match self {
            Self::Due => 0,
            Self::New => 1,
            Self::Low => 2,
            Self::Rest => 3,
        }
    }

    const TIERS: [Provenance; 4] = [Self::Due, Self::New, Self::Low, Self::Rest];
}

/// A queued question with its provenance tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub question: Question,
    pub provenance: Provenance,
}

/// An assembled study queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltQueue {
    pub entries: Vec<QueueEntry>,
    /// Set when at least one due group was skipped purely because the
    /// daily quota ran out.
    pub limit_reached: bool,
}

/// Classify one item. Buckets are checked in priority order: due, then
/// new, then low-confidence, then rest.
pub fn classify(
    question: &Question,
    states: &HashMap<String, ReviewState>,
    today: NaiveDate,
    low_confidence_ease: f64,
) -> Provenance {
    match states.get(&question.id) {
        Some(state) if is_due(state, today) => Provenance::Due,
        None => Provenance::New,
        Some(state) if state.ease <= low_confidence_ease => Provenance::Low,
        Some(_) => Provenance::Rest,
    }
}

struct CandidateGroup {
    members: Vec<(Question, Provenance)>,
    tier: Provenance,
}

/// Build a bounded study queue from the pool.
///
/// Groups sharing a `group:` tag are admitted all-or-nothing; due
/// members count against the remaining daily quota. Groups are walked
/// tier by tier, shuffled within each tier.
pub fn build_queue<R: Rng>(
    pool: &[Question],
    states: &HashMap<String, ReviewState>,
    today: NaiveDate,
    count: usize,
    reviews_done_today: u32,
    config: &StudyConfig,
    rng: &mut R,
) -> BuiltQueue {
    // Group in pool order so a seeded rng makes the result reproducible.
    let mut groups: Vec<CandidateGroup> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for question in pool {
        let provenance = classify(question, states, today, config.low_confidence_ease);
        let key = question
            .group_tag()
            .map(|name| format!("group:{name}"))
            .unwrap_or_else(|| question.id.clone());

        match index_by_key.get(&key) {
            Some(&at) => {
                let group = &mut groups[at];
                if provenance.rank() < group.tier.rank() {
                    group.tier = provenance;
                }
                group.members.push((question.clone(), provenance));
            }
            None => {
                index_by_key.insert(key, groups.len());
                groups.push(CandidateGroup {
                    members: vec![(question.clone(), provenance)],
                    tier: provenance,
                });
            }
        }
    }

    let mut remaining_capacity = count;
    let mut remaining_quota = config
        .daily_review_limit
        .saturating_sub(reviews_done_today) as usize;
    let mut entries = Vec::new();
    let mut limit_reached = false;

    for tier in Provenance::TIERS {
        let mut tier_groups: Vec<&CandidateGroup> =
            groups.iter().filter(|group| group.tier == tier).collect();
        tier_groups.shuffle(rng);

        for group in tier_groups {
            let size = group.members.len();
            if size > remaining_capacity {
                continue;
            }
            if tier == Provenance::Due {
                let due_members = group
                    .members
                    .iter()
                    .filter(|(_, provenance)| *provenance == Provenance::Due)
                    .count();
                if due_members > remaining_quota {
                    limit_reached = true;
                    continue;
                }
                remaining_quota -= due_members;
            }
            remaining_capacity -= size;
            entries.extend(group.members.iter().map(|(question, provenance)| QueueEntry {
                question: question.clone(),
                provenance: *provenance,
            }));
        }
    }

    BuiltQueue {
        entries,
        limit_reached,
    }
}
