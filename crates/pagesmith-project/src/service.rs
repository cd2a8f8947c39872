/*
 * service.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Service abstractions for authentication and project persistence.
//!
//! Both traits are async so that a hosted backend can implement them; the
//! implementations in this crate are local and resolve immediately. Callers
//! without an executor drive them with `pollster::block_on`.
//!
//! Every call is single-shot: failures are returned to the caller as
//! [`ServiceError`] and never retried here.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};
use crate::project::{NewProject, Project, ProjectUpdate};
use crate::share::ShareableLink;

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }
}

/// Source of the current user.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// The signed-in user, if any.
    async fn current_user(&self) -> ServiceResult<Option<User>>;

    async fn sign_out(&self) -> ServiceResult<()>;
}

/// Project persistence.
#[async_trait]
pub trait ProjectService: Send + Sync {
    /// Projects owned by the current user, newest first.
    async fn get_user_projects(&self) -> ServiceResult<Vec<Project>>;

    /// Any project by id.
    async fn get_project(&self, id: &str) -> ServiceResult<Option<Project>>;

    /// The project published under a custom URL.
    async fn get_project_by_custom_url(&self, slug: &str) -> ServiceResult<Option<Project>>;

    /// Create a project owned by the current user.
    async fn create_project(&self, input: NewProject) -> ServiceResult<Project>;

    /// Update a project owned by the current user.
    async fn update_project(&self, id: &str, update: ProjectUpdate) -> ServiceResult<Project>;

    /// Delete a project owned by the current user.
    async fn delete_project(&self, id: &str) -> ServiceResult<()>;

    /// Whether `slug` is unused by every share link and by every project
    /// other than `excluding`.
    async fn is_custom_url_available(
        &self,
        slug: &str,
        excluding: Option<&str>,
    ) -> ServiceResult<bool>;

    /// Count a visit to the published page.
    async fn record_view(&self, id: &str) -> ServiceResult<()>;

    /// Count a click on the published page.
    async fn record_click(&self, id: &str) -> ServiceResult<()>;

    /// Store a share link on a project owned by the current user.
    ///
    /// Returns `None` without storing anything when the slug is already used
    /// by a link or a custom URL.
    async fn add_share_link(&self, link: ShareableLink) -> ServiceResult<Option<ShareableLink>>;

    /// The link published under `slug`, active or not.
    async fn get_share_link(&self, slug: &str) -> ServiceResult<Option<ShareableLink>>;

    /// Links on a project owned by the current user, newest first.
    async fn get_project_share_links(&self, project_id: &str) -> ServiceResult<Vec<ShareableLink>>;

    /// Count a visit through a link, on the link and on its project.
    async fn record_link_view(&self, link_id: &str) -> ServiceResult<()>;

    /// Delete a link on a project owned by the current user.
    async fn delete_share_link(&self, link_id: &str) -> ServiceResult<()>;
}

/// Authentication for a single local user.
#[derive(Debug, Default)]
pub struct LocalAuthService {
    user: Mutex<Option<User>>,
}

impl LocalAuthService {
    /// Start signed in as `user`.
    pub fn signed_in(user: User) -> Self {
        Self {
            user: Mutex::new(Some(user)),
        }
    }

    /// Start signed out.
    pub fn signed_out() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthService for LocalAuthService {
    async fn current_user(&self) -> ServiceResult<Option<User>> {
        Ok(self
            .user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn sign_out(&self) -> ServiceResult<()> {
        let mut user = self.user.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(user) = user.take() {
            tracing::info!(user = %user.id, "signed out");
        }
        Ok(())
    }
}

/// Resolve the current user or fail with `NotAuthenticated`.
pub async fn require_user(auth: &dyn AuthService) -> ServiceResult<User> {
    auth.current_user()
        .await?
        .ok_or(ServiceError::NotAuthenticated)
}

/// Shared handle to an auth service.
pub type SharedAuth = Arc<dyn AuthService>;
