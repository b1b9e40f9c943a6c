use crate::types::{
    Correlation, DailyPoint, Season, SeasonCount, StationTotal, TypedTrip, UndefinedReason,
};
use std::collections::HashMap;

/// Rows shown by the single-page overview's bar chart.
pub const PRECOMPUTED_TOP_N: usize = 20;

/// Fewer points than this and the coefficient is suppressed, even though
/// two points would technically produce one.
pub const MIN_CORRELATION_POINTS: usize = 3;

/// Busiest first; equal counts fall back to station name ascending.
fn sort_ranked(rows: &mut [StationTotal]) {
    rows.sort_by(|a, b| {
        b.trip_count
            .cmp(&a.trip_count)
            .then_with(|| a.station.cmp(&b.station))
    });
}

/// Count filtered trips per start station and keep the `top_n` busiest.
///
/// Trips without a start station are not counted. Only stations present in
/// `trips` can appear.
pub fn rank_stations(trips: &[&TypedTrip], top_n: usize) -> Vec<StationTotal> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for t in trips {
        if let Some(station) = t.start_station_name.as_deref() {
            *counts.entry(station).or_default() += 1;
        }
    }
    let mut rows: Vec<StationTotal> = counts
        .into_iter()
        .map(|(station, trip_count)| StationTotal {
            station: station.to_string(),
            trip_count,
        })
        .collect();
    sort_ranked(&mut rows);
    rows.truncate(top_n);
    rows
}

/// Re-rank the pre-aggregated station table. Duplicate station names are
/// merged by summing their counts.
pub fn top_station_totals(table: &[StationTotal], top_n: usize) -> Vec<StationTotal> {
    let mut merged: HashMap<&str, u64> = HashMap::new();
    for row in table {
        *merged.entry(row.station.as_str()).or_default() += row.trip_count;
    }
    let mut rows: Vec<StationTotal> = merged
        .into_iter()
        .map(|(station, trip_count)| StationTotal {
            station: station.to_string(),
            trip_count,
        })
        .collect();
    sort_ranked(&mut rows);
    rows.truncate(top_n);
    rows
}

/// Daily points ordered along the date axis.
pub fn daily_series(mut points: Vec<DailyPoint>) -> Vec<DailyPoint> {
    points.sort_by_key(|p| p.date);
    points
}

/// Trips per season over the filtered sample, seasons without trips omitted.
pub fn season_breakdown(trips: &[&TypedTrip]) -> Vec<SeasonCount> {
    let mut counts: HashMap<Season, u64> = HashMap::new();
    for t in trips {
        *counts.entry(t.season).or_default() += 1;
    }
    Season::ALL
        .iter()
        .filter_map(|s| {
            counts.get(s).map(|&trip_count| SeasonCount {
                season: *s,
                trip_count,
            })
        })
        .collect()
}

/// Pearson correlation between daily trip count and average temperature.
pub fn correlate(points: &[DailyPoint]) -> Correlation {
    let n = points.len();
    if n < MIN_CORRELATION_POINTS {
        return Correlation::Undefined(UndefinedReason::TooFewPoints { found: n });
    }
    let xs: Vec<f64> = points.iter().map(|p| p.trip_count as f64).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.avg_temp).collect();
    if is_constant(&xs) || is_constant(&ys) {
        return Correlation::Undefined(UndefinedReason::ZeroVariance);
    }

    let mean_x = mean(&xs);
    let mean_y = mean(&ys);
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(&ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let denom = (sxx * syy).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return Correlation::Undefined(UndefinedReason::ZeroVariance);
    }
    Correlation::Value((sxy / denom).clamp(-1.0, 1.0))
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
