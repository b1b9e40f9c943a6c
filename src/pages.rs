//! Terminal renderings of the dashboard pages.
//!
//! Each page picks its filters and formats pipeline output; none of them
//! filter or aggregate on their own.

use crate::filter::FilterConfig;
use crate::insights::{INTRO, NO_TRIPS_WARNING, RECOMMENDATIONS};
use crate::output::table_rows;
use crate::pipeline::{FlowMap, Pipeline, Section};
use crate::util::{format_int, format_megabytes};
use clap::ValueEnum;
use std::fmt::Write;

pub const TITLE: &str = "Citi Bike 2022 Dashboard";

/// Rows of the daily series printed in the terminal preview.
const DAILY_PREVIEW_ROWS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Page {
    /// Single-page view: top 20 extract, full daily series and the map
    Overview,
    Intro,
    /// Daily trips vs average temperature
    Weather,
    /// Most popular start stations
    Stations,
    /// Flow map
    Map,
    Recommendations,
}

fn heading(out: &mut String, text: &str) {
    let _ = writeln!(out, "\n{text}\n{}", "-".repeat(text.chars().count()));
}

/// Shared wording for sections that cannot render.
fn unavailable<T>(out: &mut String, section: &Section<T>, no_data: &str) {
    let _ = match section {
        Section::Ready(_) => Ok(()),
        Section::NoData => writeln!(out, "{no_data}"),
        Section::Missing(msg) => writeln!(out, "Notice: {msg}"),
        Section::Failed(msg) => writeln!(out, "Error: {msg}"),
    };
}

pub fn render(page: Page, pipeline: &Pipeline<'_>, filters: &FilterConfig) -> String {
    match page {
        Page::Overview => overview(pipeline),
        Page::Intro => intro(),
        Page::Weather => weather(pipeline, filters),
        Page::Stations => stations(pipeline, filters),
        Page::Map => map(pipeline),
        Page::Recommendations => recommendations(),
    }
}

pub fn overview(pipeline: &Pipeline<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{TITLE}");
    let _ = writeln!(
        out,
        "This dashboard explores 2022 Citi Bike usage patterns: the most popular start \
         stations, seasonal ride trends, and temperature effects on ridership in New York City."
    );

    heading(&mut out, "Top 20 Start Stations by Trips (2022)");
    let top = pipeline.precomputed_top_stations();
    match &top {
        Section::Ready(rows) => {
            let _ = writeln!(out, "{}", table_rows(rows, rows.len()));
        }
        other => unavailable(&mut out, other, "No station totals available."),
    }

    heading(&mut out, "Daily Trips vs Average Temperature (Dual Axis)");
    let daily = pipeline.full_daily_series();
    match &daily {
        Section::Ready(series) => {
            let _ = writeln!(out, "{}", table_rows(series, DAILY_PREVIEW_ROWS));
            if series.len() > DAILY_PREVIEW_ROWS {
                let _ = writeln!(out, "({} days in total)", format_int(series.len()));
            }
        }
        other => unavailable(&mut out, other, "No daily data available."),
    }

    out.push_str(&map(pipeline));
    out
}

pub fn intro() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Citi Bike 2022 Strategy Dashboard\n");
    let _ = writeln!(out, "{INTRO}");
    out
}

pub fn stations(pipeline: &Pipeline<'_>, filters: &FilterConfig) -> String {
    let mut out = String::new();
    heading(&mut out, "Top Start Stations by Trips (sampled 2022 data)");
    let section = pipeline.stations(filters);
    let Section::Ready(view) = &section else {
        unavailable(&mut out, &section, NO_TRIPS_WARNING);
        return out;
    };

    let _ = writeln!(
        out,
        "Top {} Start Stations by Trips ({} matching trips)\n",
        view.top_n,
        format_int(view.filtered_trips)
    );
    let _ = writeln!(out, "{}\n", table_rows(&view.ranked, view.ranked.len()));
    let _ = writeln!(out, "Trips by season\n{}\n", table_rows(&view.seasons, view.seasons.len()));
    if let Some(insight) = &view.insight {
        let _ = writeln!(out, "{insight}");
    }
    out
}

pub fn weather(pipeline: &Pipeline<'_>, filters: &FilterConfig) -> String {
    let mut out = String::new();
    heading(&mut out, "Daily Trips vs Average Temperature (Dual Axis)");
    let section = pipeline.weather(filters);
    let Section::Ready(view) = &section else {
        unavailable(&mut out, &section, "No days fall inside the selected date range.");
        return out;
    };

    let _ = writeln!(out, "{}", table_rows(&view.series, DAILY_PREVIEW_ROWS));
    if view.series.len() > DAILY_PREVIEW_ROWS {
        let _ = writeln!(out, "({} days in range)", format_int(view.series.len()));
    }
    let _ = writeln!(out, "\n{}", view.insight);
    out
}

pub fn map(pipeline: &Pipeline<'_>) -> String {
    let mut out = String::new();
    heading(&mut out, "Citi Bike Flow Map (Kepler.gl)");
    let _ = match pipeline.flow_map() {
        FlowMap::Available { path, size_bytes } => writeln!(
            out,
            "Loading map: {} ({})\nOpen {} in a browser to explore trip flows.",
            path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
            format_megabytes(size_bytes),
            path.display()
        ),
        FlowMap::Missing { path } => {
            writeln!(out, "Map file not found: expected at {}", path.display())
        }
    };
    out
}

pub fn recommendations() -> String {
    let mut out = String::new();
    heading(&mut out, "Recommendations");
    let _ = writeln!(out, "{RECOMMENDATIONS}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataConfig;
    use crate::loader::RecordStore;
    use std::env;
    use std::fs;

    #[test]
    fn pages_render_notices_when_data_is_missing() {
        let dir = env::temp_dir().join(format!("citibike_pages_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let store = RecordStore::new(DataConfig::in_dir(&dir));
        let pipeline = Pipeline::new(&store);
        let filters = pipeline.default_filters();

        let text = render(Page::Stations, &pipeline, &filters);
        assert!(text.contains("Notice: Input not found"), "{text}");

        let text = render(Page::Overview, &pipeline, &filters);
        assert!(text.contains("Map file not found"), "{text}");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn static_pages_have_content() {
        assert!(intro().contains("Objective"));
        assert!(recommendations().contains("Prioritise bike availability"));
    }
}
