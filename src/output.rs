use crate::error::Result;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    info!(path = %path.display(), rows = rows.len(), "wrote CSV");
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    info!(path = %path.display(), "wrote JSON");
    Ok(())
}

/// Markdown table of at most `max_rows` rows, or `(no rows)`.
pub fn table_rows<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StationTotal;
    use std::env;
    use std::fs;

    fn rows() -> Vec<StationTotal> {
        vec![
            StationTotal { station: "W 21 St & 6 Ave".into(), trip_count: 1204 },
            StationTotal { station: "West St & Chambers St".into(), trip_count: 987 },
        ]
    }

    #[test]
    fn table_is_truncated() {
        let text = table_rows(&rows(), 1);
        assert!(text.contains("Start Station"));
        assert!(text.contains("W 21 St & 6 Ave"));
        assert!(!text.contains("Chambers"));
        assert_eq!(table_rows::<StationTotal>(&[], 5), "(no rows)");
    }

    #[test]
    fn csv_uses_source_column_names() {
        let path = env::temp_dir().join(format!("citibike_out_{}.csv", std::process::id()));
        write_csv(&path, &rows()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("station,trip_count\n"), "{content}");
        assert!(content.contains("W 21 St & 6 Ave,1204"));
        fs::remove_file(&path).unwrap();
    }
}
