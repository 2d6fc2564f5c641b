//! Tracker document store.
//!
//! One Markdown file per job: a YAML frontmatter block (delimited by a
//! leading and matching `---` line) holding structured fields, then a
//! free-text body. The frontmatter `status` is a display projection of the
//! job record's milestone — it is rewritten by the orchestrator and never
//! authored independently. Everything else in the file, including the body
//! bytes, survives every status update unmodified.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::error::TrackerError;
use crate::status::TrackerStatus;

pub mod atomic;

pub use atomic::write_atomic;

/// A parsed tracker file: ordered frontmatter map plus the raw body.
///
/// The mapping preserves insertion order, so re-serialization keeps every
/// key where the human left it.
#[derive(Debug, Clone)]
pub struct TrackerDoc {
    pub frontmatter: Mapping,
    pub body: String,
}

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

impl TrackerDoc {
    /// Splits `content` into frontmatter and body and parses the
    /// frontmatter as a YAML map. The body is captured verbatim, byte for
    /// byte, starting right after the closing delimiter line.
    pub fn parse(path: &Path, content: &str) -> Result<Self, TrackerError> {
        let malformed = |reason: &str| TrackerError::Malformed {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let rest = content
            .strip_prefix("---\n")
            .ok_or_else(|| malformed("missing leading '---' delimiter"))?;

        let (yaml, body) = if let Some(index) = rest.find("\n---\n") {
            (&rest[..index + 1], &rest[index + 5..])
        } else if let Some(stripped) = rest.strip_suffix("\n---") {
            (stripped, "")
        } else {
            return Err(malformed("missing closing '---' delimiter"));
        };

        let frontmatter: Mapping = serde_yaml::from_str(yaml)
            .map_err(|e| malformed(&format!("frontmatter is not a map: {}", e)))?;

        Ok(Self {
            frontmatter,
            body: body.to_string(),
        })
    }

    /// Re-assembles the file: frontmatter re-serialized in order, body
    /// appended exactly as read.
    pub fn render(&self) -> Result<String, serde_yaml::Error> {
        let yaml = serde_yaml::to_string(&self.frontmatter)?;
        Ok(format!("---\n{}---\n{}", yaml, self.body))
    }

    /// The `job_db_id` foreign reference to the job record, if present.
    pub fn job_db_id(&self) -> Option<i64> {
        self.frontmatter.get(&key("job_db_id")).and_then(Value::as_i64)
    }

    /// The raw `status` string, exactly as stored in the file.
    pub fn status_raw(&self) -> Option<&str> {
        self.frontmatter.get(&key("status")).and_then(Value::as_str)
    }

    /// The parsed tracker status. `None` when absent or outside the
    /// closed set.
    pub fn status(&self) -> Option<TrackerStatus> {
        self.status_raw().and_then(TrackerStatus::parse)
    }

    /// The `resume_path` reference with any `[[...]]` wrapping removed.
    /// Both forms resolve to the same filesystem path.
    pub fn resume_path(&self) -> Option<String> {
        let raw = self
            .frontmatter
            .get(&key("resume_path"))
            .and_then(Value::as_str)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let unwrapped = trimmed
            .strip_prefix("[[")
            .and_then(|s| s.strip_suffix("]]"))
            .unwrap_or(trimmed);
        Some(unwrapped.to_string())
    }

    /// Overwrites only the `status` key, leaving its position (or appending
    /// when the file never had one).
    pub fn set_status(&mut self, status: TrackerStatus) {
        self.frontmatter
            .insert(key("status"), Value::String(status.as_str().to_string()));
    }
}

/// Resolves a `resume_path` reference against the tracker's directory.
/// Absolute references are used as-is.
pub fn resolve_resume_path(tracker_path: &Path, reference: &str) -> PathBuf {
    let reference = Path::new(reference);
    if reference.is_absolute() {
        return reference.to_path_buf();
    }
    match tracker_path.parent() {
        Some(parent) => parent.join(reference),
        None => reference.to_path_buf(),
    }
}

/// Reads and parses a tracker file.
pub fn load(path: &Path) -> Result<TrackerDoc, TrackerError> {
    let content = std::fs::read_to_string(path).map_err(|e| TrackerError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    TrackerDoc::parse(path, &content)
}

/// Rewrites only the frontmatter `status` of the tracker at `path`.
///
/// The write is atomic: on any failure the file on disk is byte-identical
/// to its pre-call state.
pub fn update_status(path: &Path, status: TrackerStatus) -> Result<(), TrackerError> {
    let mut doc = load(path)?;
    doc.set_status(status);
    let rendered = doc.render().map_err(|e| TrackerError::Malformed {
        path: path.to_path_buf(),
        reason: format!("frontmatter re-serialization failed: {}", e),
    })?;
    write_atomic(path, rendered.as_bytes())?;
    log::debug!("Tracker {} -> {}", path.display(), status);
    Ok(())
}

/// Creates a new tracker file for a job. Refuses to overwrite an existing
/// file — trackers are created once and never recreated by this subsystem.
pub fn create(
    path: &Path,
    job_db_id: i64,
    status: TrackerStatus,
    url: &str,
    captured_at: &str,
) -> Result<(), TrackerError> {
    if std::fs::symlink_metadata(path).is_ok() {
        return Err(TrackerError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }

    let mut frontmatter = Mapping::new();
    frontmatter.insert(key("job_db_id"), Value::Number(job_db_id.into()));
    frontmatter.insert(key("status"), Value::String(status.as_str().to_string()));
    frontmatter.insert(key("url"), Value::String(url.to_string()));
    frontmatter.insert(key("captured"), Value::String(captured_at.to_string()));
    frontmatter.insert(key("resume_path"), Value::String(String::new()));

    let doc = TrackerDoc {
        frontmatter,
        body: "\n## Notes\n".to_string(),
    };
    let rendered = doc.render().map_err(|e| TrackerError::Malformed {
        path: path.to_path_buf(),
        reason: format!("frontmatter serialization failed: {}", e),
    })?;
    write_atomic(path, rendered.as_bytes())
}
