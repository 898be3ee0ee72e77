use chrono::{DateTime, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{ffi, params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{Metric, ObservationReading, StoredObservation};
use crate::storage::query::{
    round2, MetricSeries, MetricStats, ObservationQuery, RegionSummary, SaveOutcome, SeriesPoint,
    StoreHealth,
};
use crate::storage::schema::{ensure_schema, SELECT_COLUMNS};
use crate::utils::constants::{BUSY_TIMEOUT_MS, OBSERVATION_TABLE};
use crate::utils::timestamp::{format_canonical, parse_timestamp};

/// Handle to the on-disk observation store.
///
/// Holds only the path; every operation opens its own short-lived connection.
#[derive(Debug, Clone)]
pub struct WeatherDatabase {
    path: PathBuf,
}

impl WeatherDatabase {
    /// Open or create the store at `path` and bring its schema up to date.
    pub fn initialize(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Self { path };
        let conn = db.connect()?;
        ensure_schema(&conn)?;

        info!("Database initialized at {}", db.path.display());
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;
        Ok(conn)
    }

    pub fn exists(&self, region_code: &str, timestamp: &DateTime<Utc>) -> Result<bool> {
        let conn = self.connect()?;
        Self::exists_on(&conn, region_code, timestamp)
    }

    fn exists_on(conn: &Connection, region_code: &str, timestamp: &DateTime<Utc>) -> Result<bool> {
        let found = conn
            .query_row(
                "SELECT 1 FROM weather_data WHERE region_code = ?1 AND timestamp = ?2",
                params![region_code, format_canonical(timestamp)],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Insert one reading unless a row for the same region and hour is already stored.
    pub fn save(
        &self,
        region_code: &str,
        region_name: &str,
        latitude: f64,
        longitude: f64,
        reading: &ObservationReading,
    ) -> Result<SaveOutcome> {
        let reading = reading.sanitized();
        let Some(timestamp) = reading.timestamp else {
            warn!(region_code, "Rejected observation without timestamp");
            return Ok(SaveOutcome::Rejected);
        };

        let conn = self.connect()?;
        if Self::exists_on(&conn, region_code, &timestamp)? {
            debug!(region_code, %timestamp, "Observation already stored");
            return Ok(SaveOutcome::Skipped);
        }

        let inserted = conn.execute(
            "INSERT INTO weather_data (
                region_code, region_name, latitude, longitude, timestamp,
                temperature, dewpoint, humidity, precipitation, pressure,
                wind_speed, wind_direction, cloud_cover, snow_depth, wind_gust,
                sunshine, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                region_code,
                region_name,
                latitude,
                longitude,
                format_canonical(&timestamp),
                reading.temperature,
                reading.dewpoint,
                reading.humidity,
                reading.precipitation,
                reading.pressure,
                reading.wind_speed,
                reading.wind_direction,
                reading.cloud_cover,
                reading.snow_depth,
                reading.wind_gust,
                reading.sunshine,
                format_canonical(&Utc::now()),
            ],
        );

        match inserted {
            Ok(_) => {
                debug!(region_code, %timestamp, "Saved observation");
                Ok(SaveOutcome::Saved)
            }
            // Lost a race with another writer between the existence check and the insert.
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                debug!(region_code, %timestamp, "Concurrent insert won, skipping");
                Ok(SaveOutcome::Skipped)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Row with the greatest timestamp for a region.
    pub fn latest_for(&self, region_code: &str) -> Result<Option<StoredObservation>> {
        let conn = self.connect()?;
        let sql = format!(
            "SELECT {} FROM {} WHERE region_code = ?1 ORDER BY timestamp DESC LIMIT 1",
            SELECT_COLUMNS, OBSERVATION_TABLE
        );
        let row = conn
            .query_row(&sql, params![region_code], map_observation)
            .optional()?;
        Ok(row)
    }

    /// Filtered read, newest first.
    pub fn query(&self, query: &ObservationQuery) -> Result<Vec<StoredObservation>> {
        let mut sql = format!("SELECT {} FROM {} WHERE 1=1", SELECT_COLUMNS, OBSERVATION_TABLE);
        let mut values: Vec<Value> = Vec::new();

        if let Some(region) = &query.region_code {
            sql.push_str(" AND region_code = ?");
            values.push(Value::Text(region.clone()));
        }
        if let Some(start) = &query.start {
            sql.push_str(" AND timestamp >= ?");
            values.push(Value::Text(format_canonical(start)));
        }
        if let Some(end) = &query.end {
            sql.push_str(" AND timestamp <= ?");
            values.push(Value::Text(format_canonical(end)));
        }

        sql.push_str(" ORDER BY timestamp DESC, region_code ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            values.push(Value::Integer(limit as i64));
        }

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), map_observation)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!("Query returned {} observations", rows.len());
        Ok(rows)
    }

    /// Observations since `since` for the given regions (all when empty), newest first.
    pub fn recent_observations(
        &self,
        regions: &[String],
        since: &DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<StoredObservation>> {
        let mut sql = format!(
            "SELECT {} FROM {} WHERE timestamp >= ?",
            SELECT_COLUMNS, OBSERVATION_TABLE
        );
        let mut values = vec![Value::Text(format_canonical(since))];
        push_region_filter(&mut sql, &mut values, regions);
        sql.push_str(" ORDER BY timestamp DESC, region_code ASC LIMIT ?");
        values.push(Value::Integer(limit as i64));

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), map_observation)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Time-ascending non-null values of `metric` per region since `since`.
    ///
    /// Requested regions keep their order and appear even when they have no points;
    /// with no regions requested every region with data is returned in code order.
    pub fn metric_series(
        &self,
        metric: Metric,
        regions: &[String],
        since: &DateTime<Utc>,
    ) -> Result<MetricSeries> {
        let column = metric.column();
        let mut sql = format!(
            "SELECT region_code, timestamp, {column} FROM {OBSERVATION_TABLE} \
             WHERE timestamp >= ? AND {column} IS NOT NULL"
        );
        let mut values = vec![Value::Text(format_canonical(since))];
        push_region_filter(&mut sql, &mut values, regions);
        sql.push_str(" ORDER BY region_code, timestamp ASC");

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), |row| {
                let code: String = row.get(0)?;
                let raw: String = row.get(1)?;
                let value: f64 = row.get(2)?;
                Ok((code, stored_instant(1, &raw)?, value))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut series: Vec<(String, Vec<SeriesPoint>)> =
            regions.iter().map(|code| (code.clone(), Vec::new())).collect();

        for (code, timestamp, value) in rows {
            let point = SeriesPoint { timestamp, value };
            match series.iter_mut().find(|(c, _)| *c == code) {
                Some((_, points)) => points.push(point),
                None => series.push((code, vec![point])),
            }
        }

        Ok(MetricSeries { series })
    }

    /// One line per stored region: name, coordinates, last update and row count.
    pub fn region_summaries(&self) -> Result<Vec<RegionSummary>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT region_code, region_name, latitude, longitude,
                    MAX(timestamp) AS last_update, COUNT(*) AS data_points
             FROM weather_data
             GROUP BY region_code
             ORDER BY region_code",
        )?;

        let summaries = stmt
            .query_map([], |row| {
                Ok(RegionSummary {
                    code: row.get(0)?,
                    name: row.get(1)?,
                    latitude: row.get(2)?,
                    longitude: row.get(3)?,
                    last_update: row.get(4)?,
                    data_points: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(summaries)
    }

    /// Min, max and average (two decimals) of `metric` per region since `since`.
    pub fn metric_stats(
        &self,
        metric: Metric,
        regions: &[String],
        since: &DateTime<Utc>,
    ) -> Result<Vec<MetricStats>> {
        let column = metric.column();
        let mut sql = format!(
            "SELECT region_code, MIN({column}), MAX({column}), AVG({column}), COUNT({column}) \
             FROM {OBSERVATION_TABLE} WHERE timestamp >= ? AND {column} IS NOT NULL"
        );
        let mut values = vec![Value::Text(format_canonical(since))];
        push_region_filter(&mut sql, &mut values, regions);
        sql.push_str(" GROUP BY region_code ORDER BY region_code");

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&sql)?;
        let stats = stmt
            .query_map(params_from_iter(values), |row| {
                Ok(MetricStats {
                    region_code: row.get(0)?,
                    min: row.get::<_, Option<f64>>(1)?.map(round2),
                    max: row.get::<_, Option<f64>>(2)?.map(round2),
                    avg: row.get::<_, Option<f64>>(3)?.map(round2),
                    count: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(stats)
    }

    pub fn health(&self) -> Result<StoreHealth> {
        let conn = self.connect()?;
        let health = conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT region_code), MAX(timestamp) FROM weather_data",
            [],
            |row| {
                Ok(StoreHealth {
                    total_records: row.get(0)?,
                    regions_count: row.get(1)?,
                    last_update: row.get(2)?,
                })
            },
        )?;
        Ok(health)
    }

    /// Distinct region codes with at least one stored row.
    pub fn available_regions(&self) -> Result<Vec<String>> {
        let conn = self.connect()?;
        let mut stmt =
            conn.prepare("SELECT DISTINCT region_code FROM weather_data ORDER BY region_code")?;
        let codes = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(codes)
    }

    /// Keep the requested regions that have stored data, in request order.
    pub fn validate_regions(&self, regions: &[String]) -> Result<Vec<String>> {
        let available = self.available_regions()?;
        let (present, missing): (Vec<String>, Vec<String>) = regions
            .iter()
            .cloned()
            .partition(|code| available.contains(code));

        if !missing.is_empty() {
            warn!("Regions without stored data: {}", missing.join(", "));
        }
        Ok(present)
    }
}

fn push_region_filter(sql: &mut String, values: &mut Vec<Value>, regions: &[String]) {
    if regions.is_empty() {
        return;
    }
    let placeholders = vec!["?"; regions.len()].join(",");
    sql.push_str(&format!(" AND region_code IN ({})", placeholders));
    values.extend(regions.iter().map(|code| Value::Text(code.clone())));
}

fn stored_instant(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    parse_timestamp(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn map_observation(row: &Row<'_>) -> rusqlite::Result<StoredObservation> {
    let timestamp: String = row.get("timestamp")?;
    let created_at: String = row.get("created_at")?;

    Ok(StoredObservation {
        id: row.get("id")?,
        region_code: row.get("region_code")?,
        region_name: row.get("region_name")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        timestamp: stored_instant(5, &timestamp)?,
        temperature: row.get("temperature")?,
        dewpoint: row.get("dewpoint")?,
        humidity: row.get("humidity")?,
        precipitation: row.get("precipitation")?,
        pressure: row.get("pressure")?,
        wind_speed: row.get("wind_speed")?,
        wind_direction: row.get("wind_direction")?,
        cloud_cover: row.get("cloud_cover")?,
        snow_depth: row.get("snow_depth")?,
        wind_gust: row.get("wind_gust")?,
        sunshine: row.get("sunshine")?,
        created_at: stored_instant(17, &created_at)?,
    })
}
