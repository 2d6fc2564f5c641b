//! Batch writer — transactional multi-row status updates, plus the
//! finalize/fallback pair used by the tracker-update flow.
//!
//! A batch is all-or-nothing: if any item fails validation or existence the
//! whole transaction rolls back and the caller receives an itemized report.
//! Sequential calls reuse the same underlying connection, so a finalize
//! write can be chained with a compensating fallback write without
//! reopening anything.

use std::collections::HashSet;

use chrono::Utc;
use rusqlite::params;

use crate::status::JobStatus;

use super::job_repo::JobRow;
use super::{migrations, Database, DatabaseError};

/// Maximum number of items accepted in one batch call.
pub const MAX_BATCH_SIZE: usize = 100;

/// One requested status change, as received from the wire.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub id: i64,
    pub status: String,
}

/// Outcome for a single submitted item.
#[derive(Debug, Clone)]
pub struct BatchItemResult {
    pub id: i64,
    pub ok: bool,
    pub reason: Option<String>,
}

/// Itemized report for one batch call.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub updated_count: u64,
    pub failed_count: u64,
    pub results: Vec<BatchItemResult>,
}

/// Applies a batch of status updates in one transaction.
///
/// Preflight: the `jobs` table must expose the `updated_at` audit column;
/// absence is a fatal schema error, not a per-item failure. The batch is
/// rejected outright (before touching storage) when it exceeds
/// [`MAX_BATCH_SIZE`] or contains duplicate ids.
///
/// Every updated row shares one wall-clock timestamp, so a batch is
/// identifiable as a single unit after the fact.
pub fn apply_batch(db: &Database, updates: &[StatusUpdate]) -> Result<BatchOutcome, DatabaseError> {
    if updates.len() > MAX_BATCH_SIZE {
        return Err(DatabaseError::BatchRejected {
            reason: format!(
                "batch size {} exceeds maximum of {}",
                updates.len(),
                MAX_BATCH_SIZE
            ),
        });
    }

    let mut seen = HashSet::new();
    for update in updates {
        if !seen.insert(update.id) {
            return Err(DatabaseError::BatchRejected {
                reason: format!("duplicate id {} in batch", update.id),
            });
        }
    }

    db.with_conn(|conn| {
        if !migrations::column_exists(conn, "jobs", "updated_at")? {
            return Err(DatabaseError::SchemaPreflight {
                table: "jobs",
                column: "updated_at",
            });
        }

        let tx = conn.unchecked_transaction()?;

        // Validate everything before writing anything.
        let mut failures: Vec<(i64, String)> = Vec::new();
        for update in updates {
            if JobStatus::parse(&update.status).is_none() {
                failures.push((update.id, format!("invalid status '{}'", update.status)));
                continue;
            }
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM jobs WHERE id = ?1)",
                params![update.id],
                |r| r.get(0),
            )?;
            if !exists {
                failures.push((update.id, format!("no job with id {}", update.id)));
            }
        }

        if !failures.is_empty() {
            drop(tx); // Rolls back.

            let results = updates
                .iter()
                .map(|update| {
                    let reason = failures
                        .iter()
                        .find(|(id, _)| *id == update.id)
                        .map(|(_, reason)| reason.clone())
                        .unwrap_or_else(|| "rolled back: batch contained failing items".to_string());
                    BatchItemResult {
                        id: update.id,
                        ok: false,
                        reason: Some(reason),
                    }
                })
                .collect();

            log::warn!(
                "Batch of {} rolled back: {} failing items",
                updates.len(),
                failures.len()
            );

            return Ok(BatchOutcome {
                updated_count: 0,
                failed_count: updates.len() as u64,
                results,
            });
        }

        // One shared timestamp for the whole batch.
        let updated_at = Utc::now().to_rfc3339();
        for update in updates {
            tx.execute(
                "UPDATE jobs SET status = ?2, updated_at = ?3 WHERE id = ?1",
                params![update.id, update.status, updated_at],
            )?;
        }
        tx.commit()?;

        let results = updates
            .iter()
            .map(|update| BatchItemResult {
                id: update.id,
                ok: true,
                reason: None,
            })
            .collect();

        Ok(BatchOutcome {
            updated_count: updates.len() as u64,
            failed_count: 0,
            results,
        })
    })
}

/// Finalizes a single job after its guardrails and policy checks passed:
/// sets the new status, bumps `attempt_count`, clears `last_error`, and —
/// when resume artifacts are involved — records the artifact reference.
pub fn finalize(
    db: &Database,
    id: i64,
    status: JobStatus,
    resume_pdf_path: Option<&str>,
) -> Result<(), DatabaseError> {
    let now = Utc::now().to_rfc3339();
    db.with_conn(|conn| {
        let tx = conn.unchecked_transaction()?;
        match resume_pdf_path {
            Some(pdf) => {
                tx.execute(
                    "UPDATE jobs SET status = ?2, updated_at = ?3,
                            resume_pdf_path = ?4, resume_written_at = ?3,
                            attempt_count = attempt_count + 1, last_error = NULL
                     WHERE id = ?1",
                    params![id, status.as_str(), now, pdf],
                )?;
            }
            None => {
                tx.execute(
                    "UPDATE jobs SET status = ?2, updated_at = ?3,
                            attempt_count = attempt_count + 1, last_error = NULL
                     WHERE id = ?1",
                    params![id, status.as_str(), now],
                )?;
            }
        }
        tx.commit()?;
        Ok(())
    })
}

/// Compensating write for a finalize whose tracker rewrite failed: restores
/// the pre-finalize status and artifact fields and records the error.
/// `attempt_count` is monotonic and keeps the finalize increment.
pub fn fallback(db: &Database, previous: &JobRow, error: &str) -> Result<(), DatabaseError> {
    let now = Utc::now().to_rfc3339();
    db.with_conn(|conn| {
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE jobs SET status = ?2, updated_at = ?3,
                    resume_pdf_path = ?4, resume_written_at = ?5, last_error = ?6
             WHERE id = ?1",
            params![
                previous.id,
                previous.status,
                now,
                previous.resume_pdf_path,
                previous.resume_written_at,
                error,
            ],
        )?;
        tx.commit()?;
        Ok(())
    })
}
