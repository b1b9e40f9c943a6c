//! Narrative blocks shown under each chart.

use crate::types::{Correlation, DateRange, StationTotal};
use crate::util::{format_int, format_number};

pub const NO_TRIPS_WARNING: &str = "No trips for these filters. Try selecting more seasons or stations.";
pub const WIDER_RANGE_CAPTION: &str = "Select a wider date range to view trip and temperature trends.";

pub const INTRO: &str = "\
Objective
As the lead analyst for New York City's Citi Bike program, the goal is to help the
business strategy and operations teams understand user behaviour, diagnose
distribution issues, and identify opportunities to improve bike availability across
the network.

This dashboard provides a descriptive analysis of 2022 ride data to uncover:
  - Where demand is highest
  - How seasonality affects ridership
  - How weather influences daily trips
  - How bikes move across the city
  - Which operational improvements would have the greatest impact

Context
Citi Bike ridership has grown rapidly since 2013, with even higher demand following
the Covid-19 pandemic. This growing demand has exposed key distribution challenges:
  - popular stations running out of available bikes
  - other stations filling up with docked bikes
  - customers unable to return or find a bike at peak times

Dashboard structure
  1. Most Popular Stations: the busiest start stations and high-demand clusters.
  2. Trips vs Temperature: how weather correlates with daily ridership.
  3. Trip Flow Map: ride movement across New York City.
  4. Recommendations: actions to reduce shortages and balance the fleet.

Use the filter flags (season, station, top-n, date range) to narrow each page.";

pub const RECOMMENDATIONS: &str = "\
Based on the analysis in this dashboard, the following actions are recommended
for Citi Bike in New York City:

  1. Prioritise bike availability at the busiest start stations.
     Ensure regular rebalancing and enough docking capacity at these locations,
     especially during peak seasons.

  2. Plan operations around seasonal demand.
     Trip volume increases in warmer months. Increase staffing, maintenance
     capacity and bike availability ahead of these seasons to minimise shortages.

  3. Leverage weather patterns for forecasting and promotions.
     Use temperature-based forecasts to anticipate demand and run targeted
     promotions on days with warmer weather.

  4. Target casual riders during peak tourist periods.
     Consider short-term passes, discounts or partnerships to convert casual
     riders into repeat customers.";

/// Verbal strength of a coefficient, e.g. "very strong positive".
///
/// | abs(r)   | Strength    |
/// |----------|-------------|
/// | >= 0.8   | very strong |
/// | >= 0.6   | strong      |
/// | >= 0.4   | moderate    |
/// | >= 0.2   | weak        |
/// | < 0.2    | negligible  |
pub fn describe_strength(r: f64) -> String {
    let strength = match r.abs() {
        m if m >= 0.8 => "very strong",
        m if m >= 0.6 => "strong",
        m if m >= 0.4 => "moderate",
        m if m >= 0.2 => "weak",
        _ => return "negligible".into(),
    };
    let direction = if r > 0.0 { "positive" } else { "negative" };
    format!("{strength} {direction}")
}

/// Insight naming the busiest station of the current ranking.
pub fn station_insight(ranked: &[StationTotal]) -> Option<String> {
    let top = ranked.first()?;
    let mut text = format!(
        "Insight: Demand is highly concentrated around a small group of core stations.\n\
         The busiest location, {} ({} trips), outperforms all others, indicating a \
         persistent supply-demand imbalance at this site.",
        top.station,
        format_int(top.trip_count)
    );
    if ranked.len() > 1 {
        let others: Vec<&str> = ranked.iter().skip(1).take(2).map(|r| r.station.as_str()).collect();
        text.push_str(&format!(
            "\n\nHigh-demand stations ({}, {}) likely require more frequent rebalancing, \
             increased docking capacity and priority placement of e-bikes.",
            top.station,
            others.join(", ")
        ));
    }
    Some(text)
}

/// Insight for the trips-vs-temperature chart, or the caption asking for a
/// wider range when the coefficient is undefined.
pub fn correlation_insight(range: DateRange, correlation: Correlation) -> String {
    match correlation {
        Correlation::Value(r) => format!(
            "Insight: Between {range}, the correlation between daily temperature and trip \
             volume is {}, a {} relationship.\n\
             Warmer days drive more rides and should guide staffing, bike distribution \
             and seasonal promotions.",
            format_number(r, 2),
            describe_strength(r)
        ),
        Correlation::Undefined(_) => WIDER_RANGE_CAPTION.to_string(),
    }
}
