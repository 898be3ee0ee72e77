use rusqlite::{Connection, ErrorCode};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::error::Result;
use crate::utils::constants::OBSERVATION_TABLE;

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS weather_data (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        region_code TEXT NOT NULL,
        region_name TEXT NOT NULL,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        timestamp TEXT NOT NULL,
        temperature REAL,
        dewpoint REAL,
        humidity REAL,
        precipitation REAL,
        pressure REAL,
        wind_speed REAL,
        wind_direction REAL,
        cloud_cover REAL,
        snow_depth REAL,
        wind_gust REAL,
        sunshine REAL,
        created_at TEXT NOT NULL,
        UNIQUE(region_code, timestamp)
    );

    CREATE INDEX IF NOT EXISTS idx_weather_data_timestamp ON weather_data(timestamp);
";

/// Optional columns introduced after the first release; appended to older stores.
pub const ADDED_COLUMNS: [(&str, &str); 4] = [
    ("cloud_cover", "REAL"),
    ("snow_depth", "REAL"),
    ("wind_gust", "REAL"),
    ("sunshine", "REAL"),
];

/// Columns read back from the table, matching `FIELD_NAMES`.
pub const SELECT_COLUMNS: &str = "id, region_code, region_name, latitude, longitude, timestamp, \
     temperature, dewpoint, humidity, precipitation, pressure, wind_speed, wind_direction, \
     cloud_cover, snow_depth, wind_gust, sunshine, created_at";

/// Create the observation table if missing and bring older layouts forward.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLE)?;

    let existing = table_columns(conn)?;
    for (column, column_type) in ADDED_COLUMNS {
        if existing.contains(column) {
            continue;
        }
        add_column(conn, column, column_type)?;
    }

    debug!("Observation schema is current");
    Ok(())
}

/// Names of the columns currently present in the observation table.
pub fn table_columns(conn: &Connection) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", OBSERVATION_TABLE))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<HashSet<_>, _>>()?;
    Ok(columns)
}

fn add_column(conn: &Connection, column: &str, column_type: &str) -> Result<()> {
    let sql = format!(
        "ALTER TABLE {} ADD COLUMN {} {}",
        OBSERVATION_TABLE, column, column_type
    );

    match conn.execute(&sql, []) {
        Ok(_) => {
            info!(column, "Added column to existing observation table");
            Ok(())
        }
        // Another process may have migrated between our check and the ALTER.
        Err(rusqlite::Error::SqliteFailure(err, Some(msg)))
            if err.code == ErrorCode::Unknown && msg.contains("duplicate column name") =>
        {
            debug!(column, "Column already present");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
