use crate::config::DataConfig;
use crate::error::{DashboardError, Result};
use crate::season::season_of;
use crate::types::{
    DailyPoint, DailyRecord, RawDailyRow, RawStationRow, RawTripRow, StationTotal, TripRecord,
    TypedTrip,
};
use crate::util::{clean_text, parse_date_safe, parse_f64_safe, parse_u64_safe};
use chrono::Datelike;
use csv::{Reader, ReaderBuilder, Trim};
use once_cell::unsync::OnceCell;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};

pub const TRIP_COLUMNS: [&str; 2] = ["date", "start_station_name"];
pub const DAILY_COLUMNS: [&str; 3] = ["date", "trip_count", "avg_temp"];
pub const STATION_COLUMNS: [&str; 2] = ["station", "trip_count"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    /// Rows kept without a usable date.
    pub undated_rows: usize,
}

/// A loaded, immutable table.
#[derive(Debug, Clone)]
pub struct Table<T> {
    pub rows: Vec<T>,
    pub report: LoadReport,
}

impl<T> Table<T> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read-side CSV failures: I/O problems stay I/O, anything else means the
/// content could not be decoded.
fn read_error(name: &str, context: &str, err: csv::Error) -> DashboardError {
    if matches!(err.kind(), csv::ErrorKind::Io(_)) {
        if let csv::ErrorKind::Io(io) = err.into_kind() {
            return DashboardError::Io(io);
        }
        unreachable!("kind checked above");
    }
    DashboardError::parse(name, format!("{context}: {err}"))
}

/// Open `path` and make sure every required column is present.
fn open_checked(path: &Path, required: &[&str]) -> Result<Reader<File>> {
    if !path.exists() {
        return Err(DashboardError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let name = source_name(path);
    let file = File::open(path)?;
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(file);
    let headers = rdr
        .headers()
        .map_err(|e| read_error(&name, "unreadable header", e))?
        .clone();
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(DashboardError::parse(
            &name,
            format!("missing required column(s): {}", missing.join(", ")),
        ));
    }
    Ok(rdr)
}

/// Deserialize every row, failing the table on the first undecodable one.
/// Rows are read as bytes so that text fields can choose how strictly to
/// decode; line numbers in messages count the header as line 1.
fn read_rows<R: DeserializeOwned>(path: &Path, rdr: &mut Reader<File>) -> Result<Vec<R>> {
    let name = source_name(path);
    let headers = rdr
        .byte_headers()
        .map_err(|e| read_error(&name, "unreadable header", e))?
        .clone();
    rdr.byte_records()
        .enumerate()
        .map(|(idx, record)| {
            let line = format!("line {}", idx + 2);
            let record = record.map_err(|e| read_error(&name, &line, e))?;
            record
                .deserialize::<R>(Some(&headers))
                .map_err(|e| DashboardError::parse(&name, format!("{line}: {e}")))
        })
        .collect()
}

pub fn load_trips(path: &Path) -> Result<Table<TripRecord>> {
    let mut rdr = open_checked(path, &TRIP_COLUMNS)?;
    let raw: Vec<RawTripRow> = read_rows(path, &mut rdr)?;
    let total_rows = raw.len();
    let mut undated_rows = 0usize;

    let rows: Vec<TripRecord> = raw
        .into_iter()
        .map(|row| {
            let start_station_name = clean_text(row.start_station_name);
            match parse_date_safe(row.date.as_deref()) {
                Some(date) => TripRecord::Typed(TypedTrip {
                    date,
                    month: date.month(),
                    season: season_of(date),
                    start_station_name,
                }),
                None => {
                    undated_rows += 1;
                    TripRecord::RawOnly {
                        raw_date: row.date,
                        start_station_name,
                    }
                }
            }
        })
        .collect();

    if undated_rows > 0 {
        warn!(source = %path.display(), undated_rows, "trip rows without a parseable date");
    }
    info!(source = %path.display(), total_rows, "loaded trip sample");
    Ok(Table {
        rows,
        report: LoadReport {
            total_rows,
            undated_rows,
        },
    })
}

pub fn load_daily(path: &Path) -> Result<Table<DailyRecord>> {
    let mut rdr = open_checked(path, &DAILY_COLUMNS)?;
    let raw: Vec<RawDailyRow> = read_rows(path, &mut rdr)?;
    let name = source_name(path);
    let total_rows = raw.len();
    let mut undated_rows = 0usize;
    let mut rows = Vec::with_capacity(total_rows);

    for (idx, row) in raw.into_iter().enumerate() {
        let line = idx + 2;
        let trip_count = parse_u64_safe(row.trip_count.as_deref()).ok_or_else(|| {
            DashboardError::parse(
                &name,
                format!("line {line}: bad trip_count {:?}", row.trip_count.as_deref().unwrap_or("")),
            )
        })?;
        let avg_temp = parse_f64_safe(row.avg_temp.as_deref()).ok_or_else(|| {
            DashboardError::parse(
                &name,
                format!("line {line}: bad avg_temp {:?}", row.avg_temp.as_deref().unwrap_or("")),
            )
        })?;
        match parse_date_safe(row.date.as_deref()) {
            Some(date) => rows.push(DailyRecord::Typed(DailyPoint {
                date,
                trip_count,
                avg_temp,
            })),
            None => {
                undated_rows += 1;
                debug!(line, raw_date = ?row.date, "daily row without a parseable date");
                rows.push(DailyRecord::RawOnly {
                    raw_date: row.date,
                    trip_count,
                    avg_temp,
                });
            }
        }
    }

    info!(source = %path.display(), total_rows, undated_rows, "loaded daily trips vs temperature");
    Ok(Table {
        rows,
        report: LoadReport {
            total_rows,
            undated_rows,
        },
    })
}

pub fn load_station_totals(path: &Path) -> Result<Table<StationTotal>> {
    let mut rdr = open_checked(path, &STATION_COLUMNS)?;
    let raw: Vec<RawStationRow> = read_rows(path, &mut rdr)?;
    let name = source_name(path);
    let total_rows = raw.len();
    let mut rows = Vec::with_capacity(total_rows);

    for (idx, row) in raw.into_iter().enumerate() {
        let line = idx + 2;
        let station = clean_text(row.station)
            .ok_or_else(|| DashboardError::parse(&name, format!("line {line}: empty station")))?;
        let trip_count = parse_u64_safe(row.trip_count.as_deref()).ok_or_else(|| {
            DashboardError::parse(
                &name,
                format!("line {line}: bad trip_count {:?}", row.trip_count.as_deref().unwrap_or("")),
            )
        })?;
        rows.push(StationTotal {
            station,
            trip_count,
        });
    }

    info!(source = %path.display(), total_rows, "loaded station totals");
    Ok(Table {
        rows,
        report: LoadReport {
            total_rows,
            undated_rows: 0,
        },
    })
}

/// Lazily loads each source at most once for the lifetime of the store.
///
/// One store backs one rendering pass; failures are cached as well so a
/// missing file is only checked once.
pub struct RecordStore {
    config: DataConfig,
    trips: OnceCell<Result<Table<TripRecord>>>,
    daily: OnceCell<Result<Table<DailyRecord>>>,
    stations: OnceCell<Result<Table<StationTotal>>>,
}

impl RecordStore {
    pub fn new(config: DataConfig) -> Self {
        RecordStore {
            config,
            trips: OnceCell::new(),
            daily: OnceCell::new(),
            stations: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    pub fn trips(&self) -> std::result::Result<&Table<TripRecord>, &DashboardError> {
        self.trips
            .get_or_init(|| load_trips(&self.config.trips_path()))
            .as_ref()
    }

    pub fn daily(&self) -> std::result::Result<&Table<DailyRecord>, &DashboardError> {
        self.daily
            .get_or_init(|| load_daily(&self.config.daily_path()))
            .as_ref()
    }

    pub fn station_totals(&self) -> std::result::Result<&Table<StationTotal>, &DashboardError> {
        self.stations
            .get_or_init(|| load_station_totals(&self.config.stations_path()))
            .as_ref()
    }
}
