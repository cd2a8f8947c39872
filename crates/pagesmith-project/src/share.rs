/*
 * share.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Custom URLs and share links.
//!
//! A published project is reachable at `<base_url>/share/<slug>`, where the
//! slug is the project's custom URL if it has one and its id otherwise. The
//! base URL is configuration handed in by the caller.
//!
//! Share links add more slugs for the same project, optionally limited by an
//! expiry date and a view count. Links and custom URLs share one slug
//! namespace; [`resolve_share`] tries links first.

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ShareError, ShareResult};
use crate::project::{Project, ProjectUpdate};
use crate::service::ProjectService;

static CUSTOM_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("custom URL pattern is valid"));

/// Check that `slug` is a usable custom URL.
pub fn validate_custom_url(slug: &str) -> ShareResult<()> {
    if CUSTOM_URL.is_match(slug) {
        Ok(())
    } else {
        Err(ShareError::InvalidSlug {
            slug: slug.to_string(),
        })
    }
}

/// `<base_url>/share/<slug-or-id>`.
pub fn share_url(base_url: &str, project: &Project) -> String {
    share_url_for_slug(base_url, project.share_slug())
}

fn share_url_for_slug(base_url: &str, slug: &str) -> String {
    format!("{}/share/{}", base_url.trim_end_matches('/'), slug)
}

/// Validate, check availability, and store a project's custom URL.
///
/// The slug is validated before the service is asked anything. Returns the
/// new share URL.
pub async fn set_custom_url(
    service: &dyn ProjectService,
    base_url: &str,
    project_id: &str,
    slug: &str,
) -> ShareResult<String> {
    validate_custom_url(slug)?;

    if !service
        .is_custom_url_available(slug, Some(project_id))
        .await?
    {
        return Err(ShareError::SlugTaken {
            slug: slug.to_string(),
        });
    }

    let project = service
        .update_project(project_id, ProjectUpdate::custom_url(slug))
        .await?;
    tracing::info!(project = project_id, slug, "custom URL set");
    Ok(share_url(base_url, &project))
}

/// Create a share link on a project owned by the current user.
///
/// The slug is validated first, then checked against existing links and
/// custom URLs.
pub async fn create_share_link(
    service: &dyn ProjectService,
    project_id: &str,
    slug: &str,
    expiry_days: Option<u32>,
    max_views: Option<u64>,
    now: DateTime<Utc>,
) -> ShareResult<ShareableLink> {
    let link = ShareableLink::new(project_id, slug, expiry_days, max_views, now)?;
    if !service.is_custom_url_available(slug, None).await? {
        return Err(ShareError::SlugTaken {
            slug: slug.to_string(),
        });
    }
    service
        .add_share_link(link)
        .await?
        .ok_or_else(|| ShareError::SlugTaken {
            slug: slug.to_string(),
        })
}

/// The project published under `slug`, counting the visit.
///
/// A share link with that slug wins; an inactive one is an error rather than
/// a fall-through. Otherwise the slug is a custom URL or a project id.
pub async fn resolve_share(
    service: &dyn ProjectService,
    slug: &str,
    now: DateTime<Utc>,
) -> ShareResult<Project> {
    let not_found = || ShareError::NotFound {
        slug: slug.to_string(),
    };

    if let Some(link) = service.get_share_link(slug).await? {
        if link.is_expired(now) {
            return Err(ShareError::LinkExpired {
                slug: slug.to_string(),
            });
        }
        if link.is_exhausted() {
            return Err(ShareError::ViewLimitReached {
                slug: slug.to_string(),
            });
        }
        let project = service
            .get_project(&link.project_id)
            .await?
            .ok_or_else(not_found)?;
        service.record_link_view(&link.id).await?;
        tracing::debug!(slug, project = %project.id, views = link.views + 1, "share link visited");
        return Ok(project);
    }

    let project = match service.get_project_by_custom_url(slug).await? {
        Some(project) => project,
        None => service.get_project(slug).await?.ok_or_else(not_found)?,
    };
    service.record_view(&project.id).await?;
    tracing::debug!(slug, project = %project.id, "shared project visited");
    Ok(project)
}

/// A share link with optional expiry and view limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareableLink {
    pub id: String,
    pub project_id: String,
    pub custom_slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_views: Option<u64>,
    #[serde(default)]
    pub views: u64,
    pub created_at: DateTime<Utc>,
}

impl ShareableLink {
    /// Create a link valid for `expiry_days` (forever if `None`).
    pub fn new(
        project_id: impl Into<String>,
        custom_slug: impl Into<String>,
        expiry_days: Option<u32>,
        max_views: Option<u64>,
        now: DateTime<Utc>,
    ) -> ShareResult<Self> {
        let custom_slug = custom_slug.into();
        validate_custom_url(&custom_slug)?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.into(),
            custom_slug,
            expires_at: expiry_days.map(|days| now + Duration::days(i64::from(days))),
            max_views,
            views: 0,
            created_at: now,
        })
    }

    /// Not expired and under its view limit.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired(now) && !self.is_exhausted()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }

    /// Every allowed view has been used. A zero limit means no limit.
    pub fn is_exhausted(&self) -> bool {
        self.max_views
            .is_some_and(|max| max > 0 && self.views >= max)
    }

    pub fn record_view(&mut self) {
        self.views += 1;
    }

    pub fn url(&self, base_url: &str) -> String {
        share_url_for_slug(base_url, &self.custom_slug)
    }
}

/// A collection of share links with unique slugs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareableLinks {
    links: Vec<ShareableLink>,
}

impl ShareableLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a link, rejecting invalid or already used slugs.
    pub fn create(
        &mut self,
        project_id: &str,
        custom_slug: &str,
        expiry_days: Option<u32>,
        max_views: Option<u64>,
        now: DateTime<Utc>,
    ) -> ShareResult<&ShareableLink> {
        let link = ShareableLink::new(project_id, custom_slug, expiry_days, max_views, now)?;
        if !self.is_slug_available(custom_slug) {
            return Err(ShareError::SlugTaken {
                slug: custom_slug.to_string(),
            });
        }
        self.insert(link);
        Ok(&self.links[0])
    }

    /// Add a link whose slug has already been checked, newest first.
    pub fn insert(&mut self, link: ShareableLink) {
        self.links.insert(0, link);
    }

    pub fn is_slug_available(&self, slug: &str) -> bool {
        self.by_slug(slug).is_none()
    }

    pub fn by_slug(&self, slug: &str) -> Option<&ShareableLink> {
        self.links.iter().find(|l| l.custom_slug == slug)
    }

    pub fn get(&self, id: &str) -> Option<&ShareableLink> {
        self.links.iter().find(|l| l.id == id)
    }

    /// The link for `slug`, if it is still active.
    pub fn find_active(&self, slug: &str, now: DateTime<Utc>) -> Option<&ShareableLink> {
        self.by_slug(slug).filter(|l| l.is_active(now))
    }

    pub fn for_project<'a>(&'a self, project_id: &'a str) -> impl Iterator<Item = &'a ShareableLink> {
        self.links.iter().filter(move |l| l.project_id == project_id)
    }

    /// Count a view on link `id`. Returns false if there is no such link.
    pub fn record_view(&mut self, id: &str) -> bool {
        match self.links.iter_mut().find(|l| l.id == id) {
            Some(link) => {
                link.record_view();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<ShareableLink> {
        let index = self.links.iter().position(|l| l.id == id)?;
        Some(self.links.remove(index))
    }

    /// Drop every link on `project_id`.
    pub fn remove_project(&mut self, project_id: &str) {
        self.links.retain(|l| l.project_id != project_id);
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
