//! Helpers for sanitizing error text before it reaches a caller.
//!
//! Outcomes and per-item failure reasons may be surfaced to remote clients —
//! these functions ensure no absolute filesystem path or raw SQL statement
//! leaks out of the crate boundary.

use std::path::Path;

/// Returns only the filename component of a path (no directory).
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// SQL keywords that mark the start of statement text inside a storage
/// engine message.
const SQL_MARKERS: &[&str] = &[
    "SELECT ", "INSERT ", "UPDATE ", "DELETE ", "CREATE ", "PRAGMA ", "ALTER ",
];

/// Truncates a storage-engine message at the first embedded SQL statement.
///
/// rusqlite failure messages can echo the offending statement; the query text
/// identifies schema internals and must not reach callers.
pub fn scrub_sql(message: &str) -> String {
    let cut = SQL_MARKERS
        .iter()
        .filter_map(|marker| message.find(marker))
        .min();

    match cut {
        Some(index) => {
            let head = message[..index].trim_end_matches([' ', ':', '"', '\'']);
            if head.is_empty() {
                "storage error".to_string()
            } else {
                head.to_string()
            }
        }
        None => message.to_string(),
    }
}
