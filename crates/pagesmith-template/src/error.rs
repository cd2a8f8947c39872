/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for template parsing, loading and export.

use thiserror::Error;

use crate::manifest::SlotKind;

/// Errors in template syntax.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// Error parsing the template syntax.
    #[error("Parse error at line {line}, column {column}: {message}")]
    ParseError {
        message: String,
        line: usize,
        column: usize,
    },
}

/// Result type for template syntax operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors loading a template definition (manifest + body).
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// The manifest is not valid YAML or has the wrong shape.
    #[error("Invalid manifest for template '{id}': {source}")]
    Manifest {
        id: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The template body does not parse.
    #[error("Template '{id}': {source}")]
    Syntax {
        id: String,
        #[source]
        source: TemplateError,
    },

    /// The manifest id differs from the id it was loaded under.
    #[error("Manifest id '{found}' does not match template '{expected}'")]
    IdMismatch { expected: String, found: String },

    /// The manifest lists a slot twice.
    #[error("Template '{id}' declares slot '{eid}' more than once")]
    DuplicateSlot { id: String, eid: String },

    /// The manifest lists a theme twice.
    #[error("Template '{id}' declares theme '{theme}' more than once")]
    DuplicateTheme { id: String, theme: String },

    /// `default_theme` names a theme the manifest does not declare.
    #[error("Template '{id}' has default theme '{theme}', which is not declared")]
    UnknownTheme { id: String, theme: String },

    /// The body reads a slot the manifest does not declare.
    #[error("Template '{id}' uses undeclared slot '{eid}' at line {line}, column {column}")]
    UnknownSlot {
        id: String,
        eid: String,
        line: usize,
        column: usize,
    },

    /// The body reads a slot through the wrong accessor.
    #[error(
        "Template '{id}' reads slot '{eid}' as {found} at line {line}, but the manifest declares it as {expected}"
    )]
    SlotKindMismatch {
        id: String,
        eid: String,
        expected: SlotKind,
        found: SlotKind,
        line: usize,
    },

    /// A template source could not be read.
    #[error("Failed to read template '{id}': {source}")]
    Io {
        id: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the export pipeline.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The requested template id is not registered.
    #[error("Export failed: unknown template '{id}'")]
    TemplateNotFound { id: String },

    /// The document shell failed to compile.
    #[error("Document shell: {0}")]
    Shell(#[from] TemplateError),

    /// Writing the exported file failed.
    #[error("Failed to save export: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;
