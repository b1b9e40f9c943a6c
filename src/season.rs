//! Month to season bucketing.
//!
//! The buckets are not the meteorological seasons: winter runs December
//! through April, spring is May alone, summer is June through September and
//! fall is October and November.

use crate::types::Season;
use chrono::{Datelike, NaiveDate};

/// Classify a calendar month (1..=12).
///
/// Out-of-range values fall through to `Fall`, the final bucket of the
/// chain; callers only ever pass `NaiveDate::month()`.
pub fn classify(month: u32) -> Season {
    if month == 12 || (1..=4).contains(&month) {
        Season::Winter
    } else if month > 4 && month <= 5 {
        Season::Spring
    } else if (6..=9).contains(&month) {
        Season::Summer
    } else {
        Season::Fall
    }
}

pub fn season_of(date: NaiveDate) -> Season {
    classify(date.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_month_has_its_bucket() {
        let expected = [
            (1, Season::Winter),
            (2, Season::Winter),
            (3, Season::Winter),
            (4, Season::Winter),
            (5, Season::Spring),
            (6, Season::Summer),
            (7, Season::Summer),
            (8, Season::Summer),
            (9, Season::Summer),
            (10, Season::Fall),
            (11, Season::Fall),
            (12, Season::Winter),
        ];
        for (month, season) in expected {
            assert_eq!(classify(month), season, "month {month}");
        }
    }

    #[test]
    fn season_of_uses_the_date_month() {
        let d = NaiveDate::from_ymd_opt(2022, 12, 31).unwrap();
        assert_eq!(season_of(d), Season::Winter);
        let d = NaiveDate::from_ymd_opt(2022, 5, 1).unwrap();
        assert_eq!(season_of(d), Season::Spring);
    }
}
