//! Opaque keyset pagination cursor.
//!
//! A cursor names the last row of a page as a `(captured_at, id)` boundary.
//! The token is URL-safe unpadded base64 over a small JSON payload. Callers
//! must treat it as unparseable and pass it back unmodified; `None` always
//! means "first page".

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Serialize;
use thiserror::Error;

/// Keyset boundary for the `status = new` scan, ordered by
/// `(captured_at DESC, id DESC)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPosition {
    /// RFC 3339 ingestion timestamp of the boundary row.
    pub captured_at: String,
    /// Row id of the boundary row.
    pub id: i64,
}

/// Why a cursor token failed to decode. Each variant is a distinct
/// human-readable reason category; none of these is a crash.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CursorError {
    #[error("cursor is not valid base64")]
    BadEncoding,

    #[error("cursor payload is not a JSON object")]
    BadStructure,

    #[error("cursor payload is missing field '{0}'")]
    MissingField(&'static str),

    #[error("cursor field '{0}' has the wrong type")]
    WrongType(&'static str),
}

#[derive(Serialize)]
struct Payload<'a> {
    captured_at: &'a str,
    id: i64,
}

/// Encodes a `(captured_at, id)` pair into an opaque token.
///
/// Deterministic: the payload has a fixed field order, so equal inputs
/// always produce equal tokens, and distinct pairs never collide.
pub fn encode(captured_at: &str, id: i64) -> String {
    let payload = Payload { captured_at, id };
    // Serializing a two-field struct to JSON cannot fail.
    let json = serde_json::to_vec(&payload).expect("cursor payload serialization");
    URL_SAFE_NO_PAD.encode(json)
}

/// Decodes a token back into its boundary position.
pub fn decode(token: &str) -> Result<CursorPosition, CursorError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| CursorError::BadEncoding)?;

    let value: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|_| CursorError::BadStructure)?;
    let object = value.as_object().ok_or(CursorError::BadStructure)?;

    let captured_at = match object.get("captured_at") {
        None => return Err(CursorError::MissingField("captured_at")),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(_) => return Err(CursorError::WrongType("captured_at")),
    };

    let id = match object.get("id") {
        None => return Err(CursorError::MissingField("id")),
        Some(v) => v.as_i64().ok_or(CursorError::WrongType("id"))?,
    };

    Ok(CursorPosition { captured_at, id })
}
