use chrono::NaiveDate;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

// ---------------------------------------------------------------------------
// Raw CSV rows. Every field is optional text so that a bad value can be
// reported (or absorbed, for dates) instead of failing the whole reader.
// ---------------------------------------------------------------------------

/// Decode a text cell without rejecting invalid UTF-8; bad bytes become
/// U+FFFD and the value is left for the date parser to reject.
fn lossy_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LossyText;

    impl<'de> Visitor<'de> for LossyText {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a text cell")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok((!v.is_empty()).then(|| v.to_string()))
        }

        fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
            Ok((!v.is_empty()).then(|| String::from_utf8_lossy(v).into_owned()))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_bytes(LossyText)
}

#[derive(Debug, Deserialize)]
pub struct RawTripRow {
    #[serde(rename = "date", default, deserialize_with = "lossy_text")]
    pub date: Option<String>,
    #[serde(rename = "start_station_name")]
    pub start_station_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawDailyRow {
    #[serde(rename = "date", default, deserialize_with = "lossy_text")]
    pub date: Option<String>,
    #[serde(rename = "trip_count")]
    pub trip_count: Option<String>,
    #[serde(rename = "avg_temp")]
    pub avg_temp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawStationRow {
    #[serde(rename = "station")]
    pub station: Option<String>,
    #[serde(rename = "trip_count")]
    pub trip_count: Option<String>,
}

// ---------------------------------------------------------------------------
// Seasons and date ranges
// ---------------------------------------------------------------------------

/// Season label derived from a trip's month. Ordering follows the display
/// order used by the season selector (alphabetical, as the labels sort).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Fall,
    Spring,
    Summer,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Fall, Season::Spring, Season::Summer, Season::Winter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Fall => "fall",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Winter => "winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fall" | "autumn" => Ok(Season::Fall),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "winter" => Ok(Season::Winter),
            other => Err(format!("unknown season '{other}'")),
        }
    }
}

/// Inclusive range of calendar dates.
#[derive(Clone, Eq, PartialEq, Copy, Debug, Serialize)]
pub struct DateRange(pub NaiveDate, pub NaiveDate);

impl DateRange {
    pub fn start(&self) -> NaiveDate {
        self.0
    }

    pub fn end(&self) -> NaiveDate {
        self.1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0 <= date && date <= self.1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} and {}", self.0, self.1)
    }
}

// ---------------------------------------------------------------------------
// Loaded records
// ---------------------------------------------------------------------------

/// Trip with a parsed date and its derived month/season.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedTrip {
    pub date: NaiveDate,
    pub month: u32,
    pub season: Season,
    pub start_station_name: Option<String>,
}

/// One row of the trip sample. Rows whose date could not be parsed are kept
/// as `RawOnly` and skipped by every date or season computation.
#[derive(Debug, Clone, PartialEq)]
pub enum TripRecord {
    Typed(TypedTrip),
    RawOnly {
        raw_date: Option<String>,
        start_station_name: Option<String>,
    },
}

impl TripRecord {
    pub fn typed(&self) -> Option<&TypedTrip> {
        match self {
            TripRecord::Typed(t) => Some(t),
            TripRecord::RawOnly { .. } => None,
        }
    }

    pub fn start_station_name(&self) -> Option<&str> {
        match self {
            TripRecord::Typed(t) => t.start_station_name.as_deref(),
            TripRecord::RawOnly {
                start_station_name, ..
            } => start_station_name.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct DailyPoint {
    #[serde(rename = "date")]
    #[tabled(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "trip_count")]
    #[tabled(rename = "Trips")]
    pub trip_count: u64,
    #[serde(rename = "avg_temp")]
    #[tabled(rename = "Avg Temp (°C)")]
    pub avg_temp: f64,
}

/// One row of the daily trips-vs-temperature table.
#[derive(Debug, Clone, PartialEq)]
pub enum DailyRecord {
    Typed(DailyPoint),
    RawOnly {
        raw_date: Option<String>,
        trip_count: u64,
        avg_temp: f64,
    },
}

impl DailyRecord {
    pub fn typed(&self) -> Option<&DailyPoint> {
        match self {
            DailyRecord::Typed(p) => Some(p),
            DailyRecord::RawOnly { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct StationTotal {
    #[serde(rename = "station")]
    #[tabled(rename = "Start Station")]
    pub station: String,
    #[serde(rename = "trip_count")]
    #[tabled(rename = "Number of Trips")]
    pub trip_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct SeasonCount {
    #[tabled(rename = "Season")]
    pub season: Season,
    #[tabled(rename = "Trips")]
    pub trip_count: u64,
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UndefinedReason {
    TooFewPoints { found: usize },
    ZeroVariance,
}

/// Pearson coefficient, or the reason it could not be shown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Correlation {
    Value(f64),
    Undefined(UndefinedReason),
}

impl Correlation {
    pub fn value(&self) -> Option<f64> {
        match self {
            Correlation::Value(v) => Some(*v),
            Correlation::Undefined(_) => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Correlation::Undefined(_))
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub seasons: Vec<Season>,
    pub stations: Vec<String>,
    pub top_n: usize,
    pub date_range: Option<DateRange>,
    pub filtered_trips: usize,
    pub ranked_stations: usize,
    pub daily_points: usize,
    pub correlation: Option<f64>,
}
