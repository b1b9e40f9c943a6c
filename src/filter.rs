//! Season, station and date-range predicates.
//!
//! Filters never touch the loaded tables; they return fresh views.

use crate::error::{DashboardError, Result};
use crate::types::{DailyPoint, DailyRecord, DateRange, Season, TripRecord, TypedTrip};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::warn;

pub const DEFAULT_TOP_N: usize = 20;

/// Filter selections for one rendering pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    /// Empty means nothing matches.
    pub seasons: BTreeSet<Season>,
    /// Empty means every station.
    pub stations: BTreeSet<String>,
    pub top_n: usize,
    /// `None` only when the daily table has no dated rows.
    pub date_range: Option<DateRange>,
}

impl FilterConfig {
    /// The selector defaults: every season present in the sample, no station
    /// restriction, top 20, and the full span of the daily table.
    pub fn defaults_for(trips: &[TripRecord], daily: &[DailyRecord]) -> Self {
        let seasons = trips
            .iter()
            .filter_map(TripRecord::typed)
            .map(|t| t.season)
            .collect();
        FilterConfig {
            seasons,
            stations: BTreeSet::new(),
            top_n: DEFAULT_TOP_N,
            date_range: full_date_range(daily),
        }
    }

    pub fn with_seasons(mut self, seasons: impl IntoIterator<Item = Season>) -> Self {
        self.seasons = seasons.into_iter().collect();
        self
    }

    pub fn with_stations<S: Into<String>>(mut self, stations: impl IntoIterator<Item = S>) -> Self {
        self.stations = stations.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    /// Apply user-supplied range ends, filling a missing end from `bounds`
    /// (the span of the daily table).
    ///
    /// With one end given and no bounds to complete it, the range is left
    /// unset so only the daily section comes up empty. A reversed range is
    /// rejected.
    pub fn with_partial_range(
        mut self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        bounds: Option<DateRange>,
    ) -> Result<Self> {
        if from.is_none() && to.is_none() {
            return Ok(self);
        }
        let start = from.or(bounds.map(|b| b.start()));
        let end = to.or(bounds.map(|b| b.end()));
        let (Some(start), Some(end)) = (start, end) else {
            warn!(?from, ?to, "daily table has no dated rows to complete the date range");
            self.date_range = None;
            return Ok(self);
        };
        if start > end {
            return Err(DashboardError::InvalidFilter(format!(
                "start date {start} is after end date {end}"
            )));
        }
        self.date_range = Some(DateRange(start, end));
        Ok(self)
    }
}

/// Earliest and latest dated day, if any.
pub fn full_date_range(daily: &[DailyRecord]) -> Option<DateRange> {
    let mut dates = daily.iter().filter_map(DailyRecord::typed).map(|p| p.date);
    let first = dates.next()?;
    let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    Some(DateRange(min, max))
}

/// Distinct non-null station names, sorted, for the station selector.
pub fn station_choices(trips: &[TripRecord]) -> Vec<String> {
    trips
        .iter()
        .filter_map(TripRecord::start_station_name)
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Selected stations that never appear as a start station in the sample.
pub fn unknown_stations<'a>(selected: &'a BTreeSet<String>, choices: &[String]) -> Vec<&'a str> {
    selected
        .iter()
        .filter(|s| choices.binary_search(*s).is_err())
        .map(String::as_str)
        .collect()
}

/// Keep dated trips whose season is selected and, when any stations are
/// selected, whose start station is one of them. Input order is preserved.
pub fn filter_trips<'a>(
    trips: &'a [TripRecord],
    seasons: &BTreeSet<Season>,
    stations: &BTreeSet<String>,
) -> Vec<&'a TypedTrip> {
    trips
        .iter()
        .filter_map(TripRecord::typed)
        .filter(|t| seasons.contains(&t.season))
        .filter(|t| {
            stations.is_empty()
                || t
                    .start_station_name
                    .as_ref()
                    .is_some_and(|s| stations.contains(s))
        })
        .collect()
}

/// Dated daily points within `range`, inclusive on both ends.
pub fn filter_daily(daily: &[DailyRecord], range: DateRange) -> Vec<DailyPoint> {
    daily
        .iter()
        .filter_map(DailyRecord::typed)
        .filter(|p| range.contains(p.date))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::season::season_of;
    use chrono::Datelike;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn trip(date: NaiveDate, station: Option<&str>) -> TripRecord {
        TripRecord::Typed(TypedTrip {
            date,
            month: date.month(),
            season: season_of(date),
            start_station_name: station.map(str::to_string),
        })
    }

    fn sample() -> Vec<TripRecord> {
        vec![
            trip(d(2022, 1, 10), Some("A")),
            trip(d(2022, 5, 2), Some("B")),
            TripRecord::RawOnly {
                raw_date: None,
                start_station_name: Some("A".to_string()),
            },
            trip(d(2022, 7, 4), None),
            trip(d(2022, 10, 31), Some("A")),
        ]
    }

    fn point(date: NaiveDate, trips: u64, temp: f64) -> DailyRecord {
        DailyRecord::Typed(DailyPoint {
            date,
            trip_count: trips,
            avg_temp: temp,
        })
    }

    #[test]
    fn no_seasons_means_no_trips() {
        let trips = sample();
        let out = filter_trips(&trips, &BTreeSet::new(), &BTreeSet::new());
        assert!(out.is_empty());
    }

    #[test]
    fn all_seasons_keeps_dated_rows_in_order() {
        let trips = sample();
        let all: BTreeSet<Season> = Season::ALL.into_iter().collect();
        let out = filter_trips(&trips, &all, &BTreeSet::new());
        let dates: Vec<NaiveDate> = out.iter().map(|t| t.date).collect();
        assert_eq!(dates, vec![d(2022, 1, 10), d(2022, 5, 2), d(2022, 7, 4), d(2022, 10, 31)]);
    }

    #[test]
    fn station_filter_drops_null_stations() {
        let trips = sample();
        let all: BTreeSet<Season> = Season::ALL.into_iter().collect();
        let stations: BTreeSet<String> = ["A".to_string()].into_iter().collect();
        let out = filter_trips(&trips, &all, &stations);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|t| t.start_station_name.as_deref() == Some("A")));
    }

    #[test]
    fn season_and_station_combine() {
        let trips = sample();
        let winter: BTreeSet<Season> = [Season::Winter].into_iter().collect();
        let stations: BTreeSet<String> = ["A".to_string()].into_iter().collect();
        let out = filter_trips(&trips, &winter, &stations);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].date, d(2022, 1, 10));
    }

    #[test]
    fn daily_range_is_inclusive_and_idempotent() {
        let daily = vec![
            point(d(2022, 3, 3), 30, 8.0),
            point(d(2022, 3, 1), 10, 5.0),
            DailyRecord::RawOnly {
                raw_date: Some("??".to_string()),
                trip_count: 99,
                avg_temp: 1.0,
            },
            point(d(2022, 3, 2), 20, 6.0),
            point(d(2022, 3, 4), 40, 9.0),
        ];
        let range = DateRange(d(2022, 3, 2), d(2022, 3, 3));
        let once = filter_daily(&daily, range);
        assert_eq!(once.len(), 2);

        let again: Vec<DailyRecord> = once.iter().cloned().map(DailyRecord::Typed).collect();
        assert_eq!(filter_daily(&again, range), once);
    }

    #[test]
    fn defaults_cover_data() {
        let trips = sample();
        let daily = vec![point(d(2022, 2, 1), 1, 0.0), point(d(2022, 1, 1), 1, 0.0)];
        let cfg = FilterConfig::defaults_for(&trips, &daily);
        assert_eq!(
            cfg.seasons.into_iter().collect::<Vec<_>>(),
            vec![Season::Fall, Season::Spring, Season::Summer, Season::Winter]
        );
        assert!(cfg.stations.is_empty());
        assert_eq!(cfg.top_n, DEFAULT_TOP_N);
        assert_eq!(cfg.date_range, Some(DateRange(d(2022, 1, 1), d(2022, 2, 1))));

        assert_eq!(full_date_range(&[]), None);
    }

    #[test]
    fn station_choices_are_distinct_and_sorted() {
        let trips = sample();
        assert_eq!(station_choices(&trips), vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn unknown_stations_are_reported() {
        let choices = station_choices(&sample());
        let selected: BTreeSet<String> = ["A".to_string(), "Nope".to_string()].into_iter().collect();
        assert_eq!(unknown_stations(&selected, &choices), vec!["Nope"]);
        assert!(unknown_stations(&BTreeSet::new(), &choices).is_empty());
    }

    #[test]
    fn partial_range_is_completed_from_bounds() {
        let bounds = Some(DateRange(d(2022, 1, 1), d(2022, 12, 31)));
        let cfg = FilterConfig::defaults_for(&[], &[])
            .with_partial_range(Some(d(2022, 6, 1)), None, bounds)
            .unwrap();
        assert_eq!(cfg.date_range, Some(DateRange(d(2022, 6, 1), d(2022, 12, 31))));

        let cfg = FilterConfig::defaults_for(&[], &[])
            .with_partial_range(None, Some(d(2022, 2, 1)), bounds)
            .unwrap();
        assert_eq!(cfg.date_range, Some(DateRange(d(2022, 1, 1), d(2022, 2, 1))));
    }

    #[test]
    fn partial_range_without_daily_data_is_left_unset() {
        let cfg = FilterConfig::defaults_for(&sample(), &[])
            .with_partial_range(Some(d(2022, 6, 1)), None, None)
            .unwrap();
        assert_eq!(cfg.date_range, None);
        assert_eq!(cfg.seasons.len(), 4);

        let both = FilterConfig::defaults_for(&[], &[])
            .with_partial_range(Some(d(2022, 6, 1)), Some(d(2022, 6, 30)), None)
            .unwrap();
        assert_eq!(both.date_range, Some(DateRange(d(2022, 6, 1), d(2022, 6, 30))));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let err = FilterConfig::defaults_for(&[], &[])
            .with_partial_range(Some(d(2022, 6, 30)), Some(d(2022, 6, 1)), None)
            .unwrap_err();
        assert!(matches!(err, DashboardError::InvalidFilter(_)), "{err:?}");
    }
}
