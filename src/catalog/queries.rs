use rusqlite::{params, Connection, Result};

use crate::catalog::models::HistoryRecord;

pub fn insert_application(
    conn: &Connection,
    wallpaper_path: &str,
    name: &str,
    applied_at: i64,
    report_json: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO applications (wallpaper_path, name, applied_at, report_json)
         VALUES (?1, ?2, ?3, ?4)",
        params![wallpaper_path, name, applied_at, report_json],
    )?;

    Ok(conn.last_insert_rowid())
}

pub fn recent_applications(conn: &Connection, limit: usize) -> Result<Vec<HistoryRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, wallpaper_path, name, applied_at, report_json
         FROM applications
         ORDER BY applied_at DESC, id DESC
         LIMIT ?1",
    )?;

    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = stmt.query_map(params![limit], |row| {
        Ok(HistoryRecord {
            id: row.get(0)?,
            wallpaper_path: row.get(1)?,
            name: row.get(2)?,
            applied_at: row.get(3)?,
            report_json: row.get(4)?,
        })
    })?;

    rows.collect()
}

pub fn last_applied_name(conn: &Connection) -> Result<Option<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM applications
         ORDER BY applied_at DESC, id DESC
         LIMIT 1",
    )?;

    let mut rows = stmt.query([])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(row.get(0)?));
    }

    Ok(None)
}
