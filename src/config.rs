//! Where the dashboard finds its inputs.
//!
//! Precedence is CLI flag, then environment (`CITIBIKE_DATA_DIR`,
//! `CITIBIKE_MAP_PATH`), then the project layout defaults below.

use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "CITIBIKE_DATA_DIR";
pub const MAP_PATH_ENV: &str = "CITIBIKE_MAP_PATH";

pub const DEFAULT_DATA_DIR: &str = "02 Data";
pub const DEFAULT_MAP_PATH: &str = "04 Analysis & Visualisations/kepler.gl.html";
pub const TRIPS_FILE: &str = "citibike_sample.csv";
pub const DAILY_FILE: &str = "daily_trips_vs_temp_2022.csv";
pub const STATIONS_FILE: &str = "top20_stations.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataConfig {
    pub data_dir: PathBuf,
    pub trips_file: String,
    pub daily_file: String,
    pub stations_file: String,
    pub map_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            trips_file: TRIPS_FILE.to_string(),
            daily_file: DAILY_FILE.to_string(),
            stations_file: STATIONS_FILE.to_string(),
            map_path: PathBuf::from(DEFAULT_MAP_PATH),
        }
    }
}

impl DataConfig {
    /// Resolve locations from explicit overrides, falling back to the
    /// environment and then to defaults.
    pub fn resolve(data_dir: Option<PathBuf>, map_path: Option<PathBuf>) -> Self {
        let defaults = DataConfig::default();
        let data_dir = data_dir
            .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
            .unwrap_or(defaults.data_dir);
        let map_path = map_path
            .or_else(|| std::env::var_os(MAP_PATH_ENV).map(PathBuf::from))
            .unwrap_or(defaults.map_path);
        DataConfig {
            data_dir,
            map_path,
            ..defaults
        }
    }

    /// Config rooted at `dir` with the map expected alongside the CSVs.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        DataConfig {
            data_dir: dir.to_path_buf(),
            map_path: dir.join("kepler.gl.html"),
            ..DataConfig::default()
        }
    }

    pub fn trips_path(&self) -> PathBuf {
        self.data_dir.join(&self.trips_file)
    }

    pub fn daily_path(&self) -> PathBuf {
        self.data_dir.join(&self.daily_file)
    }

    pub fn stations_path(&self) -> PathBuf {
        self.data_dir.join(&self.stations_file)
    }
}
