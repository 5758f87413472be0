use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::Connection;

use crate::catalog::migrations::MIGRATIONS;
use crate::catalog::models::{HistoryRecord, WallpaperEntry};
use crate::catalog::queries;
use crate::engine::apply::ApplyReport;
use crate::infra::error::AppError;

#[derive(Debug, Clone)]
pub struct HistoryDb {
    path: PathBuf,
}

impl HistoryDb {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn initialize(&self) -> Result<(), AppError> {
        if self.path.as_os_str().is_empty() {
            return Err(AppError::InvalidInput(
                "history path must not be empty".to_string(),
            ));
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|error| {
                    AppError::Io(format!("failed to create history directory: {error}"))
                })?;
            }
        }

        let conn = self.open_connection()?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        for migration in MIGRATIONS {
            conn.execute_batch(migration)?;
        }

        Ok(())
    }

    pub fn record_application(
        &self,
        entry: &WallpaperEntry,
        report: &ApplyReport,
    ) -> Result<i64, AppError> {
        let conn = self.open_connection()?;
        let id = queries::insert_application(
            &conn,
            &entry.path.to_string_lossy(),
            &entry.name,
            now_timestamp(),
            &report.to_json()?,
        )?;
        log::debug!("recorded application #{id} for {}", entry.name);
        Ok(id)
    }

    pub fn recent_applications(&self, limit: usize) -> Result<Vec<HistoryRecord>, AppError> {
        let conn = self.open_connection()?;
        Ok(queries::recent_applications(&conn, limit)?)
    }

    pub fn last_applied_name(&self) -> Result<Option<String>, AppError> {
        let conn = self.open_connection()?;
        Ok(queries::last_applied_name(&conn)?)
    }

    fn open_connection(&self) -> Result<Connection, AppError> {
        Connection::open(&self.path).map_err(|error| {
            AppError::Persistence(format!("failed to open sqlite connection: {error}"))
        })
    }
}

fn now_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| i64::try_from(duration.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}
