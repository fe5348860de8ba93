//! SQLite program store.
//!
//! Persistent backend using SQLite. Times of day and durations are stored
//! in their HH:MM:SS wire format; the unique index on `start_time` enforces
//! the one-program-per-start-time invariant.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use super::{NewProgram, ProgramStore, StoreError};
use crate::core::program::{
    format_duration_hms, parse_duration_hms, parse_time_of_day, Program, TIME_FORMAT,
};
use crate::core::season::{SeasonDates, SeasonTable};
use crate::core::types::ProgramId;

/// SQLite store backend.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and apply the schema.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path_str = path.as_ref().to_string_lossy();
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path_str))
            .map_err(|e| StoreError::Other(e.to_string()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Other(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Create an in-memory database (useful for testing).
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::Other(e.to_string()))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Other(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        let schema = include_str!("../../migrations/001_initial_schema.sql");
        sqlx::raw_sql(schema)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Other(format!("migration failed: {}", e)))?;
        Ok(())
    }

    /// Seed the season table from configuration defaults.
    ///
    /// Existing rows win, so boundary dates edited in the database survive a
    /// restart with different defaults.
    pub async fn seed_seasons(&self, seasons: &SeasonTable) -> Result<(), StoreError> {
        for (name, dates) in [("summer", seasons.summer), ("winter", seasons.winter)] {
            sqlx::query(
                r#"
                INSERT OR IGNORE INTO seasons (season, start_month, start_day, peak_month, peak_day)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(name)
            .bind(dates.start.0 as i64)
            .bind(dates.start.1 as i64)
            .bind(dates.peak.0 as i64)
            .bind(dates.peak.1 as i64)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Other(e.to_string()))?;
        }
        Ok(())
    }

    /// Close the connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn row_to_program(row: (i64, i64, String, String, String)) -> Result<Program, StoreError> {
    Ok(Program {
        id: ProgramId::new(row.0),
        speed: row.1 as u32,
        start: parse_time_of_day(&row.2).map_err(|e| StoreError::Other(e.to_string()))?,
        summer_duration: parse_duration_hms(&row.3)
            .map_err(|e| StoreError::Other(e.to_string()))?,
        winter_duration: parse_duration_hms(&row.4)
            .map_err(|e| StoreError::Other(e.to_string()))?,
    })
}

#[async_trait]
impl ProgramStore for SqliteStore {
    async fn add_program(&self, new: NewProgram) -> Result<Program, StoreError> {
        let start = new.start.format(TIME_FORMAT).to_string();
        let result = sqlx::query(
            r#"
            INSERT INTO programs (speed, start_time, summer_duration, winter_duration)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(new.speed as i64)
        .bind(&start)
        .bind(format_duration_hms(new.summer_duration))
        .bind(format_duration_hms(new.winter_duration))
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(Program {
                id: ProgramId::new(done.last_insert_rowid()),
                speed: new.speed,
                start: new.start,
                summer_duration: new.summer_duration,
                winter_duration: new.winter_duration,
            }),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::DuplicateStart(start))
            }
            Err(e) => Err(StoreError::Other(e.to_string())),
        }
    }

    async fn get_program(&self, id: ProgramId) -> Result<Program, StoreError> {
        let row: (i64, i64, String, String, String) = sqlx::query_as(
            "SELECT id, speed, start_time, summer_duration, winter_duration FROM programs WHERE id = ?",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Other(e.to_string()))?
        .ok_or_else(|| StoreError::NotFound(format!("program: {id}")))?;

        row_to_program(row)
    }

    async fn list_programs(&self) -> Result<Vec<Program>, StoreError> {
        let rows: Vec<(i64, i64, String, String, String)> = sqlx::query_as(
            "SELECT id, speed, start_time, summer_duration, winter_duration FROM programs ORDER BY start_time",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Other(e.to_string()))?;

        rows.into_iter().map(row_to_program).collect()
    }

    async fn update_program(&self, program: Program) -> Result<(), StoreError> {
        let start = program.start.format(TIME_FORMAT).to_string();
        let result = sqlx::query(
            r#"
            UPDATE programs
            SET speed = ?, start_time = ?, summer_duration = ?, winter_duration = ?
            WHERE id = ?
            "#,
        )
        .bind(program.speed as i64)
        .bind(&start)
        .bind(format_duration_hms(program.summer_duration))
        .bind(format_duration_hms(program.winter_duration))
        .bind(program.id.as_i64())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => {
                Err(StoreError::NotFound(format!("program: {}", program.id)))
            }
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::DuplicateStart(start))
            }
            Err(e) => Err(StoreError::Other(e.to_string())),
        }
    }

    async fn delete_program(&self, id: ProgramId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM programs WHERE id = ?")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Other(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("program: {id}")));
        }
        Ok(())
    }

    async fn season_table(&self) -> Result<SeasonTable, StoreError> {
        let rows: Vec<(String, i64, i64, i64, i64)> = sqlx::query_as(
            "SELECT season, start_month, start_day, peak_month, peak_day FROM seasons",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Other(e.to_string()))?;

        let mut table = SeasonTable::default();
        for (name, start_month, start_day, peak_month, peak_day) in rows {
            let dates = SeasonDates {
                start: (start_month as u32, start_day as u32),
                peak: (peak_month as u32, peak_day as u32),
            };
            match name.as_str() {
                "summer" => table.summer = dates,
                "winter" => table.winter = dates,
                other => tracing::warn!(season = other, "ignoring unknown season row"),
            }
        }
        Ok(table)
    }
}
