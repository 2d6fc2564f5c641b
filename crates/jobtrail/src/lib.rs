pub mod config;
pub mod cursor;
pub mod db;
pub mod error;
pub mod guardrail;
pub mod lifecycle;
pub mod logging;
pub mod policy;
pub mod sanitize;
pub mod status;
pub mod tracker;

pub use config::{load_config, Config};
pub use cursor::{CursorError, CursorPosition};
pub use db::batch::{BatchItemResult, BatchOutcome, StatusUpdate, MAX_BATCH_SIZE};
pub use db::ingest::{IngestOutcome, IngestRecord};
pub use db::job_repo::JobRow;
pub use db::Database;
pub use error::{ConfigError, ErrorCategory, JobtrailError, Result, TrackerError};
pub use guardrail::{validate_resume_artifacts, GuardrailVerdict};
pub use lifecycle::{JobPage, Lifecycle, TrackerUpdateOutcome};
pub use logging::init_logging;
pub use policy::{decide, TransitionDecision};
pub use status::{JobStatus, TrackerStatus};
pub use tracker::TrackerDoc;
