//! Guardrail validation for resume artifacts.
//!
//! Entry into "Resume Written" is gated on a finished PDF and its companion
//! LaTeX source. Checks run in a strict order and short-circuit: the verdict
//! carries the first failing reason only, never an aggregate. Reasons are
//! sanitized — they name files, not directories.

use std::path::{Path, PathBuf};

use crate::sanitize;

/// Draft markers that block the transition wherever they appear in the
/// source, comments included. The scan is case-sensitive: a lowercase
/// "todo" in prose is not a draft marker.
pub const PLACEHOLDER_TOKENS: &[&str] = &[
    "TODO",
    "FIXME",
    "XXX",
    "TBD",
    "PLACEHOLDER",
    "CHANGEME",
    "Lorem ipsum",
];

/// Result of a guardrail evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardrailVerdict {
    pub ok: bool,
    /// First failing reason; `None` when the artifacts pass.
    pub reason: Option<String>,
}

impl GuardrailVerdict {
    fn pass() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    fn blocked(reason: String) -> Self {
        Self {
            ok: false,
            reason: Some(reason),
        }
    }
}

/// Derives the companion LaTeX source path: same directory, same stem,
/// `.tex` extension.
pub fn source_path_for(pdf_path: &Path) -> PathBuf {
    pdf_path.with_extension("tex")
}

/// Validates that the resume artifacts are complete.
///
/// Order matters and is observable: the PDF is checked before the source
/// file is ever inspected.
pub fn validate_resume_artifacts(pdf_path: &Path, source_path: &Path) -> GuardrailVerdict {
    let pdf_name = sanitize::redact_path(pdf_path);

    let pdf_meta = match std::fs::metadata(pdf_path) {
        Ok(meta) => meta,
        Err(_) => return GuardrailVerdict::blocked(format!("resume PDF '{}' not found", pdf_name)),
    };
    if !pdf_meta.is_file() {
        return GuardrailVerdict::blocked(format!(
            "resume PDF '{}' is not a regular file",
            pdf_name
        ));
    }
    if pdf_meta.len() == 0 {
        return GuardrailVerdict::blocked(format!("resume PDF '{}' is empty", pdf_name));
    }

    let source_name = sanitize::redact_path(source_path);

    let source_meta = match std::fs::metadata(source_path) {
        Ok(meta) => meta,
        Err(_) => {
            return GuardrailVerdict::blocked(format!(
                "resume source '{}' not found",
                source_name
            ))
        }
    };
    if !source_meta.is_file() {
        return GuardrailVerdict::blocked(format!(
            "resume source '{}' is not a regular file",
            source_name
        ));
    }

    // A zero-byte source is acceptable; unresolved draft markers are not.
    let source_text = match std::fs::read_to_string(source_path) {
        Ok(text) => text,
        Err(_) => {
            return GuardrailVerdict::blocked(format!(
                "resume source '{}' is not readable",
                source_name
            ))
        }
    };
    for token in PLACEHOLDER_TOKENS {
        if source_text.contains(token) {
            return GuardrailVerdict::blocked(format!(
                "resume source '{}' contains placeholder '{}'",
                source_name, token
            ));
        }
    }

    GuardrailVerdict::pass()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn artifacts(dir: &TempDir, pdf: &[u8], tex: Option<&str>) -> (PathBuf, PathBuf) {
        let pdf_path = dir.path().join("acme.pdf");
        std::fs::write(&pdf_path, pdf).unwrap();
        let tex_path = dir.path().join("acme.tex");
        if let Some(content) = tex {
            std::fs::write(&tex_path, content).unwrap();
        }
        (pdf_path, tex_path)
    }

    #[test]
    fn test_valid_artifacts_pass() {
        let dir = TempDir::new().unwrap();
        let (pdf, tex) = artifacts(&dir, b"%PDF-1.5", Some("\\documentclass{article}"));
        let verdict = validate_resume_artifacts(&pdf, &tex);
        assert!(verdict.ok);
        assert!(verdict.reason.is_none());
    }

    #[test]
    fn test_missing_pdf_reported_before_source() {
        let dir = TempDir::new().unwrap();
        // Neither file exists; only the PDF may be mentioned.
        let verdict = validate_resume_artifacts(
            &dir.path().join("acme.pdf"),
            &dir.path().join("acme.tex"),
        );
        assert!(!verdict.ok);
        let reason = verdict.reason.unwrap();
        assert!(reason.contains("PDF"));
        assert!(reason.contains("acme.pdf"));
        assert!(!reason.contains("acme.tex"));
    }

    #[test]
    fn test_empty_pdf_blocked() {
        let dir = TempDir::new().unwrap();
        let (pdf, tex) = artifacts(&dir, b"", Some("\\documentclass{article}"));
        let verdict = validate_resume_artifacts(&pdf, &tex);
        assert!(!verdict.ok);
        assert!(verdict.reason.unwrap().contains("empty"));
    }

    #[test]
    fn test_missing_source_blocked() {
        let dir = TempDir::new().unwrap();
        let (pdf, tex) = artifacts(&dir, b"%PDF-1.5", None);
        let verdict = validate_resume_artifacts(&pdf, &tex);
        assert!(!verdict.ok);
        assert!(verdict.reason.unwrap().contains("acme.tex"));
    }

    #[test]
    fn test_zero_byte_source_is_acceptable() {
        let dir = TempDir::new().unwrap();
        let (pdf, tex) = artifacts(&dir, b"%PDF-1.5", Some(""));
        let verdict = validate_resume_artifacts(&pdf, &tex);
        assert!(verdict.ok);
    }

    #[test]
    fn test_placeholder_blocks_even_in_comments() {
        let dir = TempDir::new().unwrap();
        let (pdf, tex) = artifacts(
            &dir,
            b"%PDF-1.5",
            Some("\\documentclass{article}\n% TODO tighten summary\n"),
        );
        let verdict = validate_resume_artifacts(&pdf, &tex);
        assert!(!verdict.ok);
        assert!(verdict.reason.unwrap().contains("TODO"));
    }

    #[test]
    fn test_placeholder_scan_is_case_sensitive() {
        let dir = TempDir::new().unwrap();
        let (pdf, tex) = artifacts(
            &dir,
            b"%PDF-1.5",
            Some("worked on todo-list tooling at Acme"),
        );
        let verdict = validate_resume_artifacts(&pdf, &tex);
        assert!(verdict.ok);
    }

    #[test]
    fn test_reason_carries_basename_only() {
        let dir = TempDir::new().unwrap();
        let verdict = validate_resume_artifacts(
            &dir.path().join("acme.pdf"),
            &dir.path().join("acme.tex"),
        );
        let reason = verdict.reason.unwrap();
        assert!(!reason.contains(dir.path().to_str().unwrap()));
    }

    #[test]
    fn test_source_path_for() {
        assert_eq!(
            source_path_for(Path::new("/vault/resumes/acme.pdf")),
            PathBuf::from("/vault/resumes/acme.tex")
        );
    }
}
