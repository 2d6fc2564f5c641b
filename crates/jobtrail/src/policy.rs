//! Status transition policy.
//!
//! A pure decision function with no side effects. Callers apply the verdict;
//! nothing here touches the database or the tracker file.

use crate::status::JobStatus;

/// Fixed forward edges of the lifecycle. Everything else is either a noop,
/// a terminal outcome, or requires `force`.
const FORWARD_EDGES: &[(JobStatus, JobStatus)] = &[
    (JobStatus::Reviewed, JobStatus::ResumeWritten),
    (JobStatus::ResumeWritten, JobStatus::Applied),
];

/// Verdict for a requested status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionDecision {
    /// Whether the transition may be applied.
    pub allowed: bool,
    /// Target equals current — no write should occur.
    pub is_noop: bool,
    /// Non-fatal notes, e.g. a forced policy bypass.
    pub warnings: Vec<String>,
    /// Why a transition was refused. Empty when allowed.
    pub reason: Option<String>,
}

impl TransitionDecision {
    fn allowed() -> Self {
        Self {
            allowed: true,
            is_noop: false,
            warnings: Vec::new(),
            reason: None,
        }
    }

    fn noop() -> Self {
        Self {
            allowed: true,
            is_noop: true,
            warnings: Vec::new(),
            reason: None,
        }
    }

    fn blocked(reason: String) -> Self {
        Self {
            allowed: false,
            is_noop: false,
            warnings: Vec::new(),
            reason: Some(reason),
        }
    }
}

/// Decides whether `current -> target` is permitted.
///
/// Same inputs always yield the same verdict:
/// - `target == current` is an allowed noop,
/// - the fixed forward edges are allowed,
/// - terminal outcomes (`reject`, `ghosted`) are allowed from any state,
/// - everything else is blocked unless `force`, which allows the transition
///   but attaches a warning describing the bypass.
pub fn decide(current: JobStatus, target: JobStatus, force: bool) -> TransitionDecision {
    if target == current {
        return TransitionDecision::noop();
    }

    if FORWARD_EDGES.contains(&(current, target)) {
        return TransitionDecision::allowed();
    }

    if target.is_terminal() {
        return TransitionDecision::allowed();
    }

    if force {
        let mut decision = TransitionDecision::allowed();
        decision.warnings.push(format!(
            "forced transition {} -> {} bypasses the lifecycle policy",
            current, target
        ));
        return decision;
    }

    TransitionDecision::blocked(format!(
        "transition {} -> {} is not permitted without force",
        current, target
    ))
}
