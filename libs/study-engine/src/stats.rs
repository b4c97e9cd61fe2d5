//! Daily review statistics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-day completion counters, reset when the study day rolls over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    /// Completed items that entered the queue as due reviews.
    pub reviews_done: u32,
    /// All completed items, whatever their provenance.
    pub total_done: u32,
}

impl DailyStats {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            reviews_done: 0,
            total_done: 0,
        }
    }

    /// Reset the counters when `today` is a new study day.
    pub fn roll_over(&mut self, today: NaiveDate) {
        if self.date != today {
            *self = Self::new(today);
        }
    }

    /// Count one completed item.
    pub fn record(&mut self, today: NaiveDate, was_due: bool) {
        self.roll_over(today);
        self.total_done += 1;
        if was_due {
            self.reviews_done += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn record_counts_due_separately() {
        let mut stats = DailyStats::new(date(1));
        stats.record(date(1), true);
        stats.record(date(1), false);
        assert_eq!(stats.reviews_done, 1);
        assert_eq!(stats.total_done, 2);
    }

    #[test]
    fn rollover_resets_counters() {
        let mut stats = DailyStats::new(date(1));
        stats.record(date(1), true);
        stats.record(date(2), true);
        assert_eq!(stats.date, date(2));
        assert_eq!(stats.reviews_done, 1);
        assert_eq!(stats.total_done, 1);
    }

    #[test]
    fn same_day_does_not_reset() {
        let mut stats = DailyStats::new(date(1));
        stats.record(date(1), true);
        stats.roll_over(date(1));
        assert_eq!(stats.total_done, 1);
    }
}
