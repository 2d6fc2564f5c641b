//! Job repository — row-level reads on the `jobs` table.
//!
//! Mutations go through the ingest writer (insert-only dedup) and the batch
//! writer (transactional status updates); this module only reads.

use rusqlite::{params, Row};

use crate::cursor::CursorPosition;

use super::{Database, DatabaseError};

/// A raw job row from the database.
#[derive(Debug, Clone)]
pub struct JobRow {
    pub id: i64,
    pub url: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub status: String,
    pub captured_at: String,
    pub updated_at: Option<String>,
    pub resume_pdf_path: Option<String>,
    pub resume_written_at: Option<String>,
    pub run_id: Option<String>,
    pub attempt_count: i64,
    pub last_error: Option<String>,
}

impl JobRow {
    pub(crate) fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            url: row.get("url")?,
            title: row.get("title")?,
            company: row.get("company")?,
            status: row.get("status")?,
            captured_at: row.get("captured_at")?,
            updated_at: row.get("updated_at")?,
            resume_pdf_path: row.get("resume_pdf_path")?,
            resume_written_at: row.get("resume_written_at")?,
            run_id: row.get("run_id")?,
            attempt_count: row.get("attempt_count")?,
            last_error: row.get("last_error")?,
        })
    }
}

/// Finds a job by its ID.
pub fn find_by_id(db: &Database, id: i64) -> Result<Option<JobRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM jobs WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], JobRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Fetches up to `fetch_limit` rows with `status = 'new'`, ordered by
/// `(captured_at DESC, id DESC)`. The cursor, when present, is a strict
/// "before" boundary on that same ordering.
///
/// Callers fetch one row more than the page size to probe for a next page.
pub fn list_new_before(
    db: &Database,
    before: Option<&CursorPosition>,
    fetch_limit: u32,
) -> Result<Vec<JobRow>, DatabaseError> {
    db.with_conn(|conn| match before {
        Some(position) => {
            let mut stmt = conn.prepare(
                "SELECT * FROM jobs
                 WHERE status = 'new'
                   AND (captured_at < ?1 OR (captured_at = ?1 AND id < ?2))
                 ORDER BY captured_at DESC, id DESC
                 LIMIT ?3",
            )?;
            let rows = stmt
                .query_map(
                    params![position.captured_at, position.id, fetch_limit],
                    JobRow::from_row,
                )?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT * FROM jobs
                 WHERE status = 'new'
                 ORDER BY captured_at DESC, id DESC
                 LIMIT ?1",
            )?;
            let rows = stmt
                .query_map(params![fetch_limit], JobRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        }
    })
}

/// Counts jobs with the given status.
pub fn count_by_status(db: &Database, status: &str) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM jobs WHERE status = ?1",
            params![status],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}
