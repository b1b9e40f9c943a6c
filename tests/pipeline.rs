use chrono::NaiveDate;
use citibike_dashboard::config::DataConfig;
use citibike_dashboard::filter::filter_daily;
use citibike_dashboard::loader::RecordStore;
use citibike_dashboard::output::write_json;
use citibike_dashboard::pages::{render, Page};
use citibike_dashboard::pipeline::{Pipeline, Section};
use citibike_dashboard::reports::daily_series;
use citibike_dashboard::types::{DateRange, Season, StationTotal};
use std::env;
use std::fs;
use std::path::PathBuf;

fn fixture_dir(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("citibike_it_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();

    fs::write(
        dir.join("citibike_sample.csv"),
        "ride_id,date,start_station_name,end_station_name\n\
         r1,2022-01-15 07:30:00,W 21 St & 6 Ave,Broadway & W 25 St\n\
         r2,2022-06-03 17:02:11,W 21 St & 6 Ave,West St & Chambers St\n\
         r3,2022-06-04 09:12:40,West St & Chambers St,W 21 St & 6 Ave\n\
         r4,2022-07-20 12:00:00,W 21 St & 6 Ave,\n\
         r5,2022-08-09 18:45:00,Broadway & W 25 St,W 21 St & 6 Ave\n\
         r6,2022-10-02 08:00:00,Broadway & W 25 St,8 Ave & W 31 St\n\
         r7,not-a-date,W 21 St & 6 Ave,8 Ave & W 31 St\n\
         r8,2022-05-11 10:10:10,,8 Ave & W 31 St\n",
    )
    .unwrap();

    fs::write(
        dir.join("daily_trips_vs_temp_2022.csv"),
        "date,trip_count,avg_temp\n\
         2022-04-05,41000,12.4\n\
         2022-04-01,20000,4.1\n\
         2022-04-03,30500,8.0\n\
         2022-04-02,26000,6.2\n\
         2022-04-04,36000,10.9\n",
    )
    .unwrap();

    fs::write(
        dir.join("top20_stations.csv"),
        "station,trip_count\n\
         West St & Chambers St,10233\n\
         W 21 St & 6 Ave,12950\n\
         Broadway & W 25 St,10233\n",
    )
    .unwrap();
    dir
}

fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, m, day).unwrap()
}

#[test]
fn test_monotonic_week_is_strongly_correlated() {
    let dir = fixture_dir("corr");
    let store = RecordStore::new(DataConfig::in_dir(&dir));
    let pipeline = Pipeline::new(&store);
    let filters = pipeline.default_filters();
    assert_eq!(filters.date_range, Some(DateRange(d(4, 1), d(4, 5))));

    let section = pipeline.weather(&filters);
    let view = section.ready().expect("weather view");
    let dates: Vec<NaiveDate> = view.series.iter().map(|p| p.date).collect();
    assert_eq!(dates, vec![d(4, 1), d(4, 2), d(4, 3), d(4, 4), d(4, 5)]);

    let r = view.correlation.value().expect("defined correlation");
    assert!(r > 0.9 && r <= 1.0, "{r}");
    assert!(view.insight.contains("very strong positive"));
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_narrow_range_suppresses_correlation() {
    let dir = fixture_dir("narrow");
    let store = RecordStore::new(DataConfig::in_dir(&dir));
    let pipeline = Pipeline::new(&store);
    let filters = pipeline.default_filters().with_date_range(DateRange(d(4, 2), d(4, 3)));

    let section = pipeline.weather(&filters);
    let view = section.ready().unwrap();
    assert_eq!(view.series.len(), 2);
    assert!(view.correlation.is_undefined());

    let daily = store.daily().unwrap();
    let once = filter_daily(&daily.rows, DateRange(d(4, 2), d(4, 3)));
    assert_eq!(daily_series(once), view.series);
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_station_ranking_under_filters() {
    let dir = fixture_dir("rank");
    let store = RecordStore::new(DataConfig::in_dir(&dir));
    let pipeline = Pipeline::new(&store);

    let all = pipeline.default_filters().with_top_n(5);
    let view = pipeline.stations(&all);
    let view = view.ready().unwrap();
    // r7 is undated; r8 counts toward the filter but has no station to rank.
    assert_eq!(view.filtered_trips, 7);
    assert_eq!(
        view.ranked,
        vec![
            StationTotal { station: "W 21 St & 6 Ave".into(), trip_count: 3 },
            StationTotal { station: "Broadway & W 25 St".into(), trip_count: 2 },
            StationTotal { station: "West St & Chambers St".into(), trip_count: 1 },
        ]
    );

    let summer = pipeline.default_filters().with_seasons([Season::Summer]);
    let view = pipeline.stations(&summer);
    let view = view.ready().unwrap();
    assert_eq!(view.ranked[0].station, "W 21 St & 6 Ave");
    assert_eq!(view.ranked[0].trip_count, 2);

    let nowhere = pipeline
        .default_filters()
        .with_seasons([Season::Fall])
        .with_stations(["West St & Chambers St"]);
    assert_eq!(pipeline.stations(&nowhere), Section::NoData);
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_overview_and_export() {
    let dir = fixture_dir("overview");
    let store = RecordStore::new(DataConfig::in_dir(&dir));
    let pipeline = Pipeline::new(&store);
    let filters = pipeline.default_filters();

    let top = pipeline.precomputed_top_stations();
    let top = top.ready().unwrap();
    let names: Vec<&str> = top.iter().map(|r| r.station.as_str()).collect();
    assert_eq!(names, vec!["W 21 St & 6 Ave", "Broadway & W 25 St", "West St & Chambers St"]);

    let text = render(Page::Overview, &pipeline, &filters);
    assert!(text.contains("Top 20 Start Stations by Trips (2022)"));
    assert!(text.contains("Map file not found"));

    let summary = pipeline.summary(&filters);
    assert_eq!(summary.daily_points, 5);
    assert_eq!(summary.ranked_stations, 3);
    let out = dir.join("summary.json");
    write_json(&out, &summary).unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["top_n"], 20);
    assert!(json["correlation"].as_f64().unwrap() > 0.9);
    fs::remove_dir_all(&dir).unwrap();
}
