use chrono::Utc;
use std::fmt::Write as _;

use crate::error::Result;
use crate::models::{FieldValue, StoredObservation, FIELD_NAMES, NUMERIC_FIELDS};
use crate::utils::constants::SQL_EXPORT_TABLE;
use crate::utils::timestamp::format_canonical;
use crate::writers::RecordWriter;

/// A replayable SQL script: `CREATE TABLE IF NOT EXISTS` plus one `INSERT` per row.
pub struct SqlWriter {
    table_name: String,
}

impl SqlWriter {
    pub fn new() -> Self {
        Self {
            table_name: SQL_EXPORT_TABLE.to_string(),
        }
    }

    fn column_type(column: &str) -> &'static str {
        if column == "id" {
            "INTEGER PRIMARY KEY"
        } else if NUMERIC_FIELDS.contains(&column) {
            "REAL"
        } else {
            "TEXT"
        }
    }

    fn literal(value: &FieldValue) -> String {
        match value {
            FieldValue::Null => "NULL".to_string(),
            FieldValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
            other => other.to_string(),
        }
    }
}

impl Default for SqlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordWriter for SqlWriter {
    fn render(&self, records: &[StoredObservation]) -> Result<Vec<u8>> {
        let mut out = String::new();

        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "-- Weather data export generated at {}",
            format_canonical(&Utc::now())
        );
        let _ = writeln!(out, "-- Total records: {}\n", records.len());

        let _ = writeln!(out, "CREATE TABLE IF NOT EXISTS {} (", self.table_name);
        let definitions = FIELD_NAMES
            .iter()
            .map(|column| format!("  {} {}", column, Self::column_type(column)))
            .collect::<Vec<_>>()
            .join(",\n");
        out.push_str(&definitions);
        out.push_str("\n);\n\n");

        let columns = FIELD_NAMES.join(", ");
        for record in records {
            let values = record
                .field_values()
                .iter()
                .map(Self::literal)
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(
                out,
                "INSERT INTO {} ({}) VALUES ({});",
                self.table_name, columns, values
            );
        }

        Ok(out.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writers::test_support::sample_records;
    use rusqlite::Connection;

    #[test]
    fn test_sql_script_shape() {
        let bytes = SqlWriter::new().render(&sample_records()).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("-- Weather data export generated at "));
        assert!(text.contains("-- Total records: 2"));
        assert!(text.contains("CREATE TABLE IF NOT EXISTS weather_data_export ("));
        assert!(text.contains("  id INTEGER PRIMARY KEY,"));
        assert!(text.contains("  sunshine REAL,"));
        assert!(text.contains("  created_at TEXT\n);"));
        assert!(text.contains("'King''s Lynn'"));
        assert!(text.contains("NULL"));
        assert_eq!(text.matches("INSERT INTO weather_data_export").count(), 2);
    }

    #[test]
    fn test_sql_script_replays_into_sqlite() {
        let bytes = SqlWriter::new().render(&sample_records()).unwrap();
        let script = String::from_utf8(bytes).unwrap();

        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(&script).unwrap();

        let (count, name): (i64, String) = conn
            .query_row(
                "SELECT COUNT(*), MAX(region_name) FROM weather_data_export",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(name, "London");

        let dewpoint: Option<f64> = conn
            .query_row(
                "SELECT dewpoint FROM weather_data_export WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(dewpoint, None);
    }
}
