/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for project services and sharing.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from a project service. These are terminal for the user action
/// that triggered them.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No user is signed in.
    #[error("User not authenticated")]
    NotAuthenticated,

    /// No project with this id is visible to the current user.
    #[error("Project '{id}' not found")]
    NotFound { id: String },

    /// The project store could not be read or written.
    #[error("Project store {}: {source}", path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The project store is not valid JSON.
    #[error("Project store {} is malformed: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from custom URL and share link operations.
#[derive(Debug, Error)]
pub enum ShareError {
    /// The slug contains characters outside `[a-zA-Z0-9_-]`.
    #[error("Invalid custom URL '{slug}': use only letters, numbers, hyphens, and underscores")]
    InvalidSlug { slug: String },

    /// Another project or link already uses the slug.
    #[error("The custom URL '{slug}' is already taken. Please choose a different one.")]
    SlugTaken { slug: String },

    /// Nothing is published under the slug.
    #[error("Nothing is shared at '{slug}'")]
    NotFound { slug: String },

    /// The share link is past its expiry date.
    #[error("The link '{slug}' has expired")]
    LinkExpired { slug: String },

    /// The share link has used up its views.
    #[error("The link '{slug}' has reached its view limit")]
    ViewLimitReached { slug: String },

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Result type for share operations.
pub type ShareResult<T> = Result<T, ShareError>;
