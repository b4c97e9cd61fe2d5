//! Date utilities for daily reset hour handling.

use chrono::{Duration, Local, NaiveDate, Timelike};

/// Get the current study day, adjusted for `daily_reset_hour`.
///
/// Before the reset hour the study day is still "yesterday", so late
/// night reviews count toward the previous day.
pub fn study_today(daily_reset_hour: u32) -> NaiveDate {
    let now = Local::now();
    if now.hour() < daily_reset_hour {
        (now - Duration::days(1)).date_naive()
    } else {
        now.date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midnight_reset_is_plain_today() {
        assert_eq!(study_today(0), Local::now().date_naive());
    }

    #[test]
    fn reset_hour_shifts_by_at_most_one_day() {
        let today = Local::now().date_naive();
        for hour in 0..24 {
            let adjusted = study_today(hour);
            assert!(adjusted == today || adjusted == today - Duration::days(1));
        }
    }
}
