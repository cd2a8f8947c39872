/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Projects, persistence and sharing for Pagesmith.
//!
//! - [`Project`]: a template id plus the user's content map.
//! - [`ProjectService`] / [`AuthService`]: async persistence seams, with an
//!   in-memory implementation and one backed by a JSON file.
//! - [`EditSession`]: routes `on_content_change` edits into an open project
//!   and saves them through a service.
//! - [`set_custom_url`] / [`share_url`]: custom URL validation and share
//!   links of the form `<base_url>/share/<slug-or-id>`.
//! - [`create_share_link`] / [`resolve_share`]: expiring, view-limited links
//!   and the lookup a share page performs.

pub mod error;
pub mod json_store;
pub mod memory;
pub mod project;
pub mod service;
pub mod session;
pub mod share;

pub use error::{ServiceError, ServiceResult, ShareError, ShareResult};
pub use json_store::JsonFileProjectService;
pub use memory::{InMemoryProjectService, ProjectStore};
pub use project::{NewProject, Project, ProjectAnalytics, ProjectUpdate};
pub use service::{AuthService, LocalAuthService, ProjectService, SharedAuth, User, require_user};
pub use session::EditSession;
pub use share::{
    ShareableLink, ShareableLinks, create_share_link, resolve_share, set_custom_url, share_url,
    validate_custom_url,
};
