/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for content parsing.
//!
//! Reading content never fails; only decoding an edit payload or a whole
//! content document can.

use thiserror::Error;

/// Errors that can occur while decoding content.
#[derive(Debug, Error)]
pub enum ContentError {
    /// An edit payload did not match any known content shape.
    #[error("Unrecognized content edit for '{eid}': {message}")]
    UnrecognizedEdit { eid: String, message: String },

    /// The content document was not a JSON object.
    #[error("Content data must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    /// The content document was not valid JSON.
    #[error("Invalid content JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for content operations.
pub type ContentResult<T> = Result<T, ContentError>;

/// Name of a JSON value's type, for error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
