//! Ingest writer — idempotent, insert-only batch inserts for scraped jobs.
//!
//! Dedup is keyed on the unique `url` column: a conflicting insert leaves the
//! existing row completely untouched, with no partial merge of fields.

use chrono::Utc;
use rusqlite::params;

use crate::status::JobStatus;

use super::{Database, DatabaseError};

/// A raw scraped job record, as handed over by the provider boundary.
#[derive(Debug, Clone)]
pub struct IngestRecord {
    pub url: String,
    pub title: Option<String>,
    pub company: Option<String>,
}

/// Counts reported back from one ingest batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOutcome {
    pub inserted_count: u64,
    pub duplicate_count: u64,
}

/// Inserts a batch of records with `INSERT ... ON CONFLICT(url) DO NOTHING`
/// semantics. All rows share one `captured_at` timestamp and the given
/// `run_id`. An empty batch is a valid no-op.
///
/// The status is a closed enum, so an invalid status value cannot reach the
/// storage layer; callers parsing wire input validate once before this call.
pub fn insert_batch(
    db: &Database,
    records: &[IngestRecord],
    status: JobStatus,
    run_id: &str,
) -> Result<IngestOutcome, DatabaseError> {
    if records.is_empty() {
        return Ok(IngestOutcome {
            inserted_count: 0,
            duplicate_count: 0,
        });
    }

    let captured_at = Utc::now().to_rfc3339();

    db.with_conn(|conn| {
        let tx = conn.unchecked_transaction()?;
        let mut inserted = 0u64;
        let mut duplicates = 0u64;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO jobs (url, title, company, status, captured_at, run_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(url) DO NOTHING",
            )?;

            for record in records {
                let changed = stmt.execute(params![
                    record.url,
                    record.title,
                    record.company,
                    status.as_str(),
                    captured_at,
                    run_id,
                ])?;
                if changed == 0 {
                    duplicates += 1;
                } else {
                    inserted += 1;
                }
            }
        }

        tx.commit()?;

        log::debug!(
            "Ingest run {}: {} inserted, {} duplicates",
            run_id,
            inserted,
            duplicates
        );

        Ok(IngestOutcome {
            inserted_count: inserted,
            duplicate_count: duplicates,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::job_repo;

    fn test_db() -> Database {
        Database::open_in_memory().expect("Failed to create test database")
    }

    fn record(url: &str, title: &str) -> IngestRecord {
        IngestRecord {
            url: url.to_string(),
            title: Some(title.to_string()),
            company: Some("Acme".to_string()),
        }
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let db = test_db();
        let outcome = insert_batch(&db, &[], JobStatus::New, "run-1").unwrap();
        assert_eq!(outcome.inserted_count, 0);
        assert_eq!(outcome.duplicate_count, 0);
    }

    #[test]
    fn test_insert_batch() {
        let db = test_db();
        let records = vec![
            record("https://example.com/j/1", "Engineer"),
            record("https://example.com/j/2", "Analyst"),
        ];
        let outcome = insert_batch(&db, &records, JobStatus::New, "run-1").unwrap();
        assert_eq!(outcome.inserted_count, 2);
        assert_eq!(outcome.duplicate_count, 0);

        assert_eq!(job_repo::count_by_status(&db, "new").unwrap(), 2);
    }

    #[test]
    fn test_reingest_is_idempotent() {
        let db = test_db();
        let records = vec![
            record("https://example.com/j/1", "Engineer"),
            record("https://example.com/j/2", "Analyst"),
        ];
        insert_batch(&db, &records, JobStatus::New, "run-1").unwrap();

        let outcome = insert_batch(&db, &records, JobStatus::New, "run-2").unwrap();
        assert_eq!(outcome.inserted_count, 0);
        assert_eq!(outcome.duplicate_count, records.len() as u64);
    }

    #[test]
    fn test_conflict_leaves_existing_row_untouched() {
        let db = test_db();
        insert_batch(
            &db,
            &[record("https://example.com/j/1", "Engineer")],
            JobStatus::New,
            "run-1",
        )
        .unwrap();

        let before = job_repo::find_by_id(&db, 1).unwrap().unwrap();

        // Same URL, different fields: nothing may merge.
        let changed = IngestRecord {
            url: "https://example.com/j/1".to_string(),
            title: Some("Principal Engineer".to_string()),
            company: Some("Other Corp".to_string()),
        };
        insert_batch(&db, &[changed], JobStatus::Shortlist, "run-2").unwrap();

        let after = job_repo::find_by_id(&db, 1).unwrap().unwrap();
        assert_eq!(after.title, before.title);
        assert_eq!(after.company, before.company);
        assert_eq!(after.status, before.status);
        assert_eq!(after.captured_at, before.captured_at);
        assert_eq!(after.run_id, before.run_id);
    }

    #[test]
    fn test_batch_shares_one_timestamp_and_run_id() {
        let db = test_db();
        let records = vec![
            record("https://example.com/j/1", "Engineer"),
            record("https://example.com/j/2", "Analyst"),
            record("https://example.com/j/3", "Designer"),
        ];
        insert_batch(&db, &records, JobStatus::New, "run-7").unwrap();

        let rows = job_repo::list_new_before(&db, None, 10).unwrap();
        assert_eq!(rows.len(), 3);
        let first_captured = &rows[0].captured_at;
        assert!(rows.iter().all(|r| &r.captured_at == first_captured));
        assert!(rows.iter().all(|r| r.run_id.as_deref() == Some("run-7")));
    }
}
