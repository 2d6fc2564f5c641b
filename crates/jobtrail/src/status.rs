//! Closed status types for job records and tracker documents.
//!
//! The database milestone (`JobStatus`, lowercase on the wire) is the source
//! of truth. The tracker frontmatter carries a capitalized projection
//! (`TrackerStatus`) that is a superset: `Interview` and `Offer` only exist
//! in tracker files edited by a human after application.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical job milestone stored in the `jobs` table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    New,
    Shortlist,
    Reviewed,
    Reject,
    ResumeWritten,
    Applied,
    Ghosted,
}

impl JobStatus {
    /// All persistable statuses, in lifecycle order.
    pub const ALL: &'static [JobStatus] = &[
        JobStatus::New,
        JobStatus::Shortlist,
        JobStatus::Reviewed,
        JobStatus::Reject,
        JobStatus::ResumeWritten,
        JobStatus::Applied,
        JobStatus::Ghosted,
    ];

    /// The lowercase wire/database form.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::New => "new",
            JobStatus::Shortlist => "shortlist",
            JobStatus::Reviewed => "reviewed",
            JobStatus::Reject => "reject",
            JobStatus::ResumeWritten => "resume_written",
            JobStatus::Applied => "applied",
            JobStatus::Ghosted => "ghosted",
        }
    }

    /// Parses the lowercase database form. Returns `None` for anything
    /// outside the closed set — callers treat that as a validation failure.
    pub fn parse(s: &str) -> Option<JobStatus> {
        match s {
            "new" => Some(JobStatus::New),
            "shortlist" => Some(JobStatus::Shortlist),
            "reviewed" => Some(JobStatus::Reviewed),
            "reject" => Some(JobStatus::Reject),
            "resume_written" => Some(JobStatus::ResumeWritten),
            "applied" => Some(JobStatus::Applied),
            "ghosted" => Some(JobStatus::Ghosted),
            _ => None,
        }
    }

    /// Terminal outcomes are reachable from any milestone and never leave.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Reject | JobStatus::Ghosted)
    }

    /// The tracker frontmatter projection, if one exists. `new` and
    /// `shortlist` predate tracker creation and have none.
    pub fn tracker_projection(&self) -> Option<TrackerStatus> {
        match self {
            JobStatus::New | JobStatus::Shortlist => None,
            JobStatus::Reviewed => Some(TrackerStatus::Reviewed),
            JobStatus::Reject => Some(TrackerStatus::Rejected),
            JobStatus::ResumeWritten => Some(TrackerStatus::ResumeWritten),
            JobStatus::Applied => Some(TrackerStatus::Applied),
            JobStatus::Ghosted => Some(TrackerStatus::Ghosted),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-facing status written into tracker frontmatter.
///
/// `Interview` and `Offer` are accepted when reading a tracker (a human may
/// have advanced the file by hand) but are never written by this crate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TrackerStatus {
    Reviewed,
    #[serde(rename = "Resume Written")]
    ResumeWritten,
    Applied,
    Interview,
    Offer,
    Rejected,
    Ghosted,
}

impl TrackerStatus {
    /// The capitalized frontmatter form.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackerStatus::Reviewed => "Reviewed",
            TrackerStatus::ResumeWritten => "Resume Written",
            TrackerStatus::Applied => "Applied",
            TrackerStatus::Interview => "Interview",
            TrackerStatus::Offer => "Offer",
            TrackerStatus::Rejected => "Rejected",
            TrackerStatus::Ghosted => "Ghosted",
        }
    }

    /// Parses the capitalized frontmatter form.
    pub fn parse(s: &str) -> Option<TrackerStatus> {
        match s {
            "Reviewed" => Some(TrackerStatus::Reviewed),
            "Resume Written" => Some(TrackerStatus::ResumeWritten),
            "Applied" => Some(TrackerStatus::Applied),
            "Interview" => Some(TrackerStatus::Interview),
            "Offer" => Some(TrackerStatus::Offer),
            "Rejected" => Some(TrackerStatus::Rejected),
            "Ghosted" => Some(TrackerStatus::Ghosted),
            _ => None,
        }
    }
}

impl fmt::Display for TrackerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
