//! One dashboard pass: load, filter, aggregate.
//!
//! Every page goes through [`Pipeline`]; page code only chooses filters and
//! renders what comes back.

use crate::error::DashboardError;
use crate::filter::{
    filter_daily, filter_trips, full_date_range, station_choices, unknown_stations, FilterConfig,
};
use crate::insights::{correlation_insight, station_insight};
use crate::loader::RecordStore;
use crate::reports::{
    correlate, daily_series, rank_stations, season_breakdown, top_station_totals,
    PRECOMPUTED_TOP_N,
};
use crate::types::{
    Correlation, DailyPoint, DailyRecord, DateRange, SeasonCount, StationTotal, SummaryStats,
};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Outcome of one page section.
#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    Ready(T),
    /// Inputs loaded fine but nothing matches the filters.
    NoData,
    /// A required input file is absent. Shown as a notice.
    Missing(String),
    /// A required input could not be parsed.
    Failed(String),
}

impl<T> Section<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(v) => Some(v),
            _ => None,
        }
    }

    fn from_error(section: &str, err: &DashboardError) -> Self {
        warn!(section, error = %err, "section unavailable");
        match err {
            DashboardError::NotFound { .. } => Section::Missing(err.to_string()),
            _ => Section::Failed(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationsView {
    pub top_n: usize,
    pub filtered_trips: usize,
    pub ranked: Vec<StationTotal>,
    pub seasons: Vec<SeasonCount>,
    pub insight: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherView {
    pub range: DateRange,
    pub series: Vec<DailyPoint>,
    pub correlation: Correlation,
    pub insight: String,
}

/// Pre-rendered flow map. Only its presence and size are inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowMap {
    Available { path: PathBuf, size_bytes: u64 },
    Missing { path: PathBuf },
}

impl FlowMap {
    pub fn locate(path: &Path) -> Self {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => FlowMap::Available {
                path: path.to_path_buf(),
                size_bytes: meta.len(),
            },
            _ => {
                warn!(path = %path.display(), "flow map not found");
                FlowMap::Missing {
                    path: path.to_path_buf(),
                }
            }
        }
    }
}

pub struct Pipeline<'a> {
    store: &'a RecordStore,
}

impl<'a> Pipeline<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Pipeline { store }
    }

    /// Selector defaults derived from whatever loaded successfully.
    pub fn default_filters(&self) -> FilterConfig {
        let trips = self.store.trips().map(|t| t.rows.as_slice()).unwrap_or(&[]);
        let daily = self.store.daily().map(|t| t.rows.as_slice()).unwrap_or(&[]);
        FilterConfig::defaults_for(trips, daily)
    }

    /// Most popular start stations under the season/station filters.
    pub fn stations(&self, filters: &FilterConfig) -> Section<StationsView> {
        let table = match self.store.trips() {
            Ok(t) => t,
            Err(e) => return Section::from_error("stations", e),
        };
        let filtered = filter_trips(&table.rows, &filters.seasons, &filters.stations);
        debug!(
            seasons = filters.seasons.len(),
            stations = filters.stations.len(),
            matched = filtered.len(),
            "filtered trips"
        );
        if filtered.is_empty() {
            return Section::NoData;
        }
        let ranked = rank_stations(&filtered, filters.top_n);
        let insight = station_insight(&ranked);
        Section::Ready(StationsView {
            top_n: filters.top_n,
            filtered_trips: filtered.len(),
            seasons: season_breakdown(&filtered),
            ranked,
            insight,
        })
    }

    /// Daily trips vs temperature inside the selected date range.
    pub fn weather(&self, filters: &FilterConfig) -> Section<WeatherView> {
        let table = match self.store.daily() {
            Ok(t) => t,
            Err(e) => return Section::from_error("weather", e),
        };
        let Some(range) = filters.date_range else {
            return Section::NoData;
        };
        let series = daily_series(filter_daily(&table.rows, range));
        if series.is_empty() {
            return Section::NoData;
        }
        let correlation = correlate(&series);
        debug!(points = series.len(), ?correlation, "daily series ready");
        Section::Ready(WeatherView {
            range,
            insight: correlation_insight(range, correlation),
            series,
            correlation,
        })
    }

    /// Top stations straight from the pre-aggregated extract.
    pub fn precomputed_top_stations(&self) -> Section<Vec<StationTotal>> {
        match self.store.station_totals() {
            Ok(t) if t.is_empty() => Section::NoData,
            Ok(t) => Section::Ready(top_station_totals(&t.rows, PRECOMPUTED_TOP_N)),
            Err(e) => Section::from_error("top stations", e),
        }
    }

    /// Every dated day, sorted, without a range restriction.
    pub fn full_daily_series(&self) -> Section<Vec<DailyPoint>> {
        match self.store.daily() {
            Ok(t) => {
                let points: Vec<DailyPoint> = t.rows.iter().filter_map(DailyRecord::typed).cloned().collect();
                if points.is_empty() {
                    Section::NoData
                } else {
                    Section::Ready(daily_series(points))
                }
            }
            Err(e) => Section::from_error("daily series", e),
        }
    }

    pub fn flow_map(&self) -> FlowMap {
        FlowMap::locate(&self.store.config().map_path)
    }

    /// Headline numbers for export.
    pub fn summary(&self, filters: &FilterConfig) -> SummaryStats {
        let stations = self.stations(filters);
        let weather = self.weather(filters);
        let (filtered_trips, ranked_stations) = stations
            .ready()
            .map(|v| (v.filtered_trips, v.ranked.len()))
            .unwrap_or((0, 0));
        SummaryStats {
            seasons: filters.seasons.iter().copied().collect(),
            stations: filters.stations.iter().cloned().collect(),
            top_n: filters.top_n,
            date_range: filters.date_range,
            filtered_trips,
            ranked_stations,
            daily_points: weather.ready().map(|v| v.series.len()).unwrap_or(0),
            correlation: weather.ready().and_then(|v| v.correlation.value()),
        }
    }

    /// Start stations on offer, or `None` when the trip sample is unavailable.
    pub fn station_choices(&self) -> Option<Vec<String>> {
        self.store.trips().ok().map(|t| station_choices(&t.rows))
    }

    /// Selected stations absent from the trip sample. Empty when the sample
    /// could not be loaded, since there is nothing to check against.
    pub fn unknown_stations(&self, filters: &FilterConfig) -> Vec<String> {
        match self.station_choices() {
            Some(choices) => unknown_stations(&filters.stations, &choices)
                .into_iter()
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Span of the daily table, for range validation at the boundary.
    pub fn daily_bounds(&self) -> Option<DateRange> {
        self.store.daily().ok().and_then(|t| full_date_range(&t.rows))
    }
}
