//! Lifecycle orchestrator.
//!
//! Composes the stores, the transition policy and the guardrails into the
//! externally exposed operations: paginated read, batch status update,
//! single tracker status update, and batch ingest.
//!
//! The database row and the tracker file are two independent atomic units —
//! there is no cross-store transaction. A finalize writes the row first,
//! then rewrites the tracker; if the tracker write fails the orchestrator
//! issues a compensating fallback write that returns the row to its
//! previous, retryable milestone with the failure recorded in `last_error`.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::cursor;
use crate::db::batch::{self, BatchOutcome, StatusUpdate};
use crate::db::ingest::{self, IngestOutcome, IngestRecord};
use crate::db::job_repo::{self, JobRow};
use crate::db::Database;
use crate::error::{JobtrailError, Result, TrackerError};
use crate::guardrail;
use crate::policy;
use crate::sanitize;
use crate::status::{JobStatus, TrackerStatus};
use crate::tracker;

/// One page of the `status = new` scan.
#[derive(Debug)]
pub struct JobPage {
    pub jobs: Vec<JobRow>,
    pub has_more: bool,
    /// Present only when `has_more` is true; built from the last returned row.
    pub next_cursor: Option<String>,
}

/// Outcome of a single tracker status update.
///
/// `Blocked` covers both policy refusals and guardrail failures — it is a
/// structured outcome, distinct from a validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerUpdateOutcome {
    Applied {
        job_id: i64,
        status: JobStatus,
        warnings: Vec<String>,
    },
    Noop {
        job_id: i64,
        status: JobStatus,
    },
    Blocked {
        job_id: i64,
        reason: String,
    },
}

/// Entry point for hosts. Owns the database handle; the tracker files are
/// addressed by path per call.
pub struct Lifecycle {
    db: Database,
    config: Config,
}

impl Lifecycle {
    /// Opens the configured database (bootstrapping the schema) and returns
    /// a ready orchestrator.
    pub fn new(config: Config) -> Result<Self> {
        let db = Database::open(&config.database_path)?;
        Ok(Self { db, config })
    }

    /// Wraps an already-open database. Used by tests and by hosts that
    /// manage the connection themselves.
    pub fn with_database(db: Database, config: Config) -> Self {
        Self { db, config }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Fetches one page of jobs awaiting triage, newest first.
    ///
    /// The cursor, when present, is the opaque token from a previous page's
    /// `next_cursor`; `None` means the first page.
    pub fn list_new_jobs(&self, limit: u32, cursor: Option<&str>) -> Result<JobPage> {
        if limit == 0 {
            return Err(JobtrailError::Validation {
                message: "limit must be at least 1".to_string(),
            });
        }

        let position = cursor.map(cursor::decode).transpose()?;

        // Probe one row past the page to learn whether more exist.
        let mut rows = job_repo::list_new_before(&self.db, position.as_ref(), limit.saturating_add(1))?;
        let has_more = rows.len() > limit as usize;
        rows.truncate(limit as usize);

        let next_cursor = if has_more {
            rows.last()
                .map(|row| cursor::encode(&row.captured_at, row.id))
        } else {
            None
        };

        Ok(JobPage {
            jobs: rows,
            has_more,
            next_cursor,
        })
    }

    /// Applies a batch of status updates transactionally. Per-item failures
    /// are collected into the returned report, never raised.
    pub fn update_statuses(&self, updates: &[StatusUpdate]) -> Result<BatchOutcome> {
        Ok(batch::apply_batch(&self.db, updates)?)
    }

    /// Ingests freshly scraped records. The status is validated once before
    /// any row is attempted; duplicates (by URL) leave existing rows
    /// untouched.
    pub fn ingest(
        &self,
        records: &[IngestRecord],
        status: &str,
        run_id: Option<&str>,
    ) -> Result<IngestOutcome> {
        let status = JobStatus::parse(status).ok_or_else(|| JobtrailError::Validation {
            message: format!("invalid status '{}'", status),
        })?;

        let run_id = run_id
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Ok(ingest::insert_batch(&self.db, records, status, &run_id)?)
    }

    /// Updates a job's status through its tracker file: decides the
    /// transition, runs the resume guardrails when entering
    /// "Resume Written", finalizes the database row, then rewrites the
    /// tracker frontmatter projection.
    pub fn update_tracker_status(
        &self,
        tracker_path: &Path,
        target: JobStatus,
        force: bool,
    ) -> Result<TrackerUpdateOutcome> {
        self.apply_tracker_transition(tracker_path, target, force, tracker::update_status)
    }

    fn apply_tracker_transition<W>(
        &self,
        tracker_path: &Path,
        target: JobStatus,
        force: bool,
        write_projection: W,
    ) -> Result<TrackerUpdateOutcome>
    where
        W: FnOnce(&Path, TrackerStatus) -> std::result::Result<(), TrackerError>,
    {
        let _span = tracing::info_span!(
            "tracker_update",
            file = %sanitize::redact_path(tracker_path),
            target = %target,
            force,
        )
        .entered();

        let doc = tracker::load(tracker_path)?;

        let job_id = doc.job_db_id().ok_or_else(|| JobtrailError::Validation {
            message: format!(
                "tracker '{}' has no job_db_id",
                sanitize::redact_path(tracker_path)
            ),
        })?;

        let row = job_repo::find_by_id(&self.db, job_id)?.ok_or_else(|| {
            JobtrailError::NotFound {
                what: format!("job {}", job_id),
            }
        })?;

        let current = JobStatus::parse(&row.status).ok_or_else(|| JobtrailError::Internal {
            message: format!("job {} has unknown status '{}'", job_id, row.status),
        })?;

        let decision = policy::decide(current, target, force);

        if decision.is_noop {
            return Ok(TrackerUpdateOutcome::Noop {
                job_id,
                status: current,
            });
        }
        if !decision.allowed {
            return Ok(TrackerUpdateOutcome::Blocked {
                job_id,
                reason: decision
                    .reason
                    .unwrap_or_else(|| "transition not permitted".to_string()),
            });
        }

        let projection = target
            .tracker_projection()
            .ok_or_else(|| JobtrailError::Validation {
                message: format!("status '{}' has no tracker representation", target),
            })?;

        // The artifact gate applies to exactly one milestone.
        let mut resume_pdf: Option<String> = None;
        if target == JobStatus::ResumeWritten {
            let reference = match doc.resume_path() {
                Some(reference) => reference,
                None => {
                    return Ok(TrackerUpdateOutcome::Blocked {
                        job_id,
                        reason: format!(
                            "tracker '{}' has no resume_path",
                            sanitize::redact_path(tracker_path)
                        ),
                    })
                }
            };
            let pdf_path = tracker::resolve_resume_path(tracker_path, &reference);
            let source_path = guardrail::source_path_for(&pdf_path);
            let verdict = guardrail::validate_resume_artifacts(&pdf_path, &source_path);
            if !verdict.ok {
                return Ok(TrackerUpdateOutcome::Blocked {
                    job_id,
                    reason: verdict
                        .reason
                        .unwrap_or_else(|| "resume artifacts incomplete".to_string()),
                });
            }
            resume_pdf = Some(pdf_path.to_string_lossy().into_owned());
        }

        for warning in &decision.warnings {
            log::warn!("Job {}: {}", job_id, warning);
        }

        let previous = row.clone();
        batch::finalize(&self.db, job_id, target, resume_pdf.as_deref())?;

        if let Err(write_err) = write_projection(tracker_path, projection) {
            let recorded = format!(
                "tracker write failed for '{}'",
                sanitize::redact_path(tracker_path)
            );
            match batch::fallback(&self.db, &previous, &recorded) {
                Ok(()) => log::warn!(
                    "Job {} rolled back to '{}' after tracker write failure",
                    job_id,
                    previous.status
                ),
                Err(fallback_err) => log::error!(
                    "Compensating fallback for job {} failed: {}",
                    job_id,
                    fallback_err
                ),
            }
            return Err(write_err.into());
        }

        log::info!("Job {} -> {}", job_id, target);

        Ok(TrackerUpdateOutcome::Applied {
            job_id,
            status: target,
            warnings: decision.warnings,
        })
    }

    /// Creates the tracker file for a job in the configured trackers
    /// directory and returns its path. The job must already be at a
    /// milestone with a tracker representation.
    pub fn create_tracker(&self, job_id: i64) -> Result<PathBuf> {
        let trackers_dir =
            self.config
                .trackers_dir
                .as_ref()
                .ok_or_else(|| JobtrailError::Validation {
                    message: "trackers_dir is not configured".to_string(),
                })?;

        let row = job_repo::find_by_id(&self.db, job_id)?.ok_or_else(|| {
            JobtrailError::NotFound {
                what: format!("job {}", job_id),
            }
        })?;

        let status = JobStatus::parse(&row.status).ok_or_else(|| JobtrailError::Internal {
            message: format!("job {} has unknown status '{}'", job_id, row.status),
        })?;

        let projection = status
            .tracker_projection()
            .ok_or_else(|| JobtrailError::Validation {
                message: format!("job {} in status '{}' has no tracker representation", job_id, status),
            })?;

        std::fs::create_dir_all(trackers_dir).map_err(|e| {
            JobtrailError::Tracker(TrackerError::Write {
                path: trackers_dir.clone(),
                source: e,
            })
        })?;

        let path = trackers_dir.join(tracker_file_name(&row));
        tracker::create(&path, row.id, projection, &row.url, &row.captured_at)?;

        log::info!("Created tracker for job {} at {}", job_id, path.display());

        Ok(path)
    }
}

fn tracker_file_name(row: &JobRow) -> String {
    let base = match (row.company.as_deref(), row.title.as_deref()) {
        (Some(company), Some(title)) => format!("{} {}", company, title),
        (Some(company), None) => company.to_string(),
        (None, Some(title)) => title.to_string(),
        (None, None) => String::new(),
    };
    let slug = slugify(&base);
    if slug.is_empty() {
        format!("job-{}.md", row.id)
    } else {
        format!("{}.md", slug)
    }
}

fn slugify(s: &str) -> String {
    let mut slug = String::new();
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
