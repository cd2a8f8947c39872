/*
 * memory.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! In-memory project storage.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};
use crate::project::{NewProject, Project, ProjectUpdate};
use crate::service::{ProjectService, SharedAuth, require_user};
use crate::share::{ShareableLink, ShareableLinks};

/// All stored projects, keyed by id, and their share links.
///
/// Serialized as `{ "projects": [...], "links": [...] }` with projects in id
/// order and links newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectStore {
    projects: BTreeMap<String, Project>,
    links: ShareableLinks,
}

#[derive(Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default, skip_serializing_if = "ShareableLinks::is_empty")]
    links: ShareableLinks,
}

impl Serialize for ProjectStore {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        StoreDocument {
            projects: self.projects.values().cloned().collect(),
            links: self.links.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ProjectStore {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let document = StoreDocument::deserialize(deserializer)?;
        let mut store: ProjectStore = document.projects.into_iter().collect();
        store.links = document.links;
        Ok(store)
    }
}

impl FromIterator<Project> for ProjectStore {
    fn from_iter<I: IntoIterator<Item = Project>>(iter: I) -> Self {
        Self {
            projects: iter.into_iter().map(|p| (p.id.clone(), p)).collect(),
            links: ShareableLinks::new(),
        }
    }
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.get(id)
    }

    pub fn by_custom_url(&self, slug: &str) -> Option<&Project> {
        self.projects
            .values()
            .find(|p| p.custom_url.as_deref() == Some(slug))
    }

    /// Projects owned by `user_id`, newest first.
    pub fn user_projects(&self, user_id: &str) -> Vec<Project> {
        let mut projects: Vec<Project> = self
            .projects
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        projects
    }

    pub fn create(&mut self, user_id: &str, input: NewProject, now: DateTime<Utc>) -> Project {
        let project = Project::new(user_id, input, now);
        self.projects.insert(project.id.clone(), project.clone());
        project
    }

    /// Insert or replace a project as-is.
    pub fn insert(&mut self, project: Project) -> Option<Project> {
        self.projects.insert(project.id.clone(), project)
    }

    pub fn update(
        &mut self,
        user_id: &str,
        id: &str,
        update: ProjectUpdate,
        now: DateTime<Utc>,
    ) -> ServiceResult<Project> {
        let project = self.owned_mut(user_id, id)?;
        project.apply(update, now);
        Ok(project.clone())
    }

    /// Delete a project together with its share links.
    pub fn delete(&mut self, user_id: &str, id: &str) -> ServiceResult<()> {
        self.owned_mut(user_id, id)?;
        self.projects.remove(id);
        self.links.remove_project(id);
        Ok(())
    }

    /// Custom URLs and link slugs share one namespace. Only the custom URL of
    /// `excluding` is ignored.
    pub fn is_custom_url_available(&self, slug: &str, excluding: Option<&str>) -> bool {
        let used_by_project = self
            .projects
            .values()
            .any(|p| p.custom_url.as_deref() == Some(slug) && Some(p.id.as_str()) != excluding);
        !used_by_project && self.links.is_slug_available(slug)
    }

    pub fn links(&self) -> &ShareableLinks {
        &self.links
    }

    /// Store a link on a project owned by `user_id`.
    ///
    /// The slug must be free (see [`Self::is_custom_url_available`]); a
    /// taken slug is reported as `None`.
    pub fn add_share_link(
        &mut self,
        user_id: &str,
        link: ShareableLink,
    ) -> ServiceResult<Option<ShareableLink>> {
        self.owned_mut(user_id, &link.project_id)?;
        if !self.is_custom_url_available(&link.custom_slug, None) {
            return Ok(None);
        }
        self.links.insert(link.clone());
        Ok(Some(link))
    }

    pub fn share_link(&self, slug: &str) -> Option<&ShareableLink> {
        self.links.by_slug(slug)
    }

    pub fn project_share_links(
        &mut self,
        user_id: &str,
        project_id: &str,
    ) -> ServiceResult<Vec<ShareableLink>> {
        self.owned_mut(user_id, project_id)?;
        Ok(self.links.for_project(project_id).cloned().collect())
    }

    /// Count a view on a link and on the project it points to.
    pub fn record_link_view(&mut self, link_id: &str, now: DateTime<Utc>) -> ServiceResult<()> {
        let project_id = self
            .links
            .get(link_id)
            .map(|link| link.project_id.clone())
            .ok_or_else(|| ServiceError::NotFound {
                id: link_id.to_string(),
            })?;
        self.get_mut(&project_id)?.record_view(now);
        self.links.record_view(link_id);
        Ok(())
    }

    pub fn delete_share_link(&mut self, user_id: &str, link_id: &str) -> ServiceResult<()> {
        let not_found = || ServiceError::NotFound {
            id: link_id.to_string(),
        };
        let project_id = self.links.get(link_id).ok_or_else(not_found)?.project_id.clone();
        self.owned_mut(user_id, &project_id).map_err(|_| not_found())?;
        self.links.remove(link_id);
        Ok(())
    }

    pub fn record_view(&mut self, id: &str, now: DateTime<Utc>) -> ServiceResult<()> {
        self.get_mut(id)?.record_view(now);
        Ok(())
    }

    pub fn record_click(&mut self, id: &str, now: DateTime<Utc>) -> ServiceResult<()> {
        self.get_mut(id)?.record_click(now);
        Ok(())
    }

    fn get_mut(&mut self, id: &str) -> ServiceResult<&mut Project> {
        self.projects
            .get_mut(id)
            .ok_or_else(|| ServiceError::NotFound { id: id.to_string() })
    }

    /// Projects owned by someone else are reported as missing.
    fn owned_mut(&mut self, user_id: &str, id: &str) -> ServiceResult<&mut Project> {
        match self.projects.get_mut(id) {
            Some(project) if project.user_id == user_id => Ok(project),
            _ => Err(ServiceError::NotFound { id: id.to_string() }),
        }
    }
}

/// Project service backed by a [`ProjectStore`] in memory.
pub struct InMemoryProjectService {
    auth: SharedAuth,
    store: Mutex<ProjectStore>,
}

impl InMemoryProjectService {
    pub fn new(auth: SharedAuth) -> Self {
        Self::with_store(auth, ProjectStore::new())
    }

    pub fn with_store(auth: SharedAuth, store: ProjectStore) -> Self {
        Self {
            auth,
            store: Mutex::new(store),
        }
    }

    /// A copy of the current store contents.
    pub fn snapshot(&self) -> ProjectStore {
        self.lock().clone()
    }

    /// Replace the whole store, returning the previous contents.
    pub fn restore(&self, store: ProjectStore) -> ProjectStore {
        std::mem::replace(&mut *self.lock(), store)
    }

    fn lock(&self) -> MutexGuard<'_, ProjectStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ProjectService for InMemoryProjectService {
    async fn get_user_projects(&self) -> ServiceResult<Vec<Project>> {
        let user = require_user(self.auth.as_ref()).await?;
        Ok(self.lock().user_projects(&user.id))
    }

    async fn get_project(&self, id: &str) -> ServiceResult<Option<Project>> {
        let project = self.lock().get(id).cloned();
        if project.is_none() {
            tracing::debug!(project = id, "no project found");
        }
        Ok(project)
    }

    async fn get_project_by_custom_url(&self, slug: &str) -> ServiceResult<Option<Project>> {
        Ok(self.lock().by_custom_url(slug).cloned())
    }

    async fn create_project(&self, input: NewProject) -> ServiceResult<Project> {
        let user = require_user(self.auth.as_ref()).await?;
        let project = self.lock().create(&user.id, input, Utc::now());
        tracing::info!(project = %project.id, template = %project.template, "created project");
        Ok(project)
    }

    async fn update_project(&self, id: &str, update: ProjectUpdate) -> ServiceResult<Project> {
        let user = require_user(self.auth.as_ref()).await?;
        let project = self.lock().update(&user.id, id, update, Utc::now())?;
        tracing::debug!(project = id, "updated project");
        Ok(project)
    }

    async fn delete_project(&self, id: &str) -> ServiceResult<()> {
        let user = require_user(self.auth.as_ref()).await?;
        self.lock().delete(&user.id, id)?;
        tracing::info!(project = id, "deleted project");
        Ok(())
    }

    async fn is_custom_url_available(
        &self,
        slug: &str,
        excluding: Option<&str>,
    ) -> ServiceResult<bool> {
        Ok(self.lock().is_custom_url_available(slug, excluding))
    }

    async fn record_view(&self, id: &str) -> ServiceResult<()> {
        self.lock().record_view(id, Utc::now())
    }

    async fn record_click(&self, id: &str) -> ServiceResult<()> {
        self.lock().record_click(id, Utc::now())
    }

    async fn add_share_link(&self, link: ShareableLink) -> ServiceResult<Option<ShareableLink>> {
        let user = require_user(self.auth.as_ref()).await?;
        let added = self.lock().add_share_link(&user.id, link)?;
        if let Some(link) = &added {
            tracing::info!(project = %link.project_id, slug = %link.custom_slug, "created share link");
        }
        Ok(added)
    }

    async fn get_share_link(&self, slug: &str) -> ServiceResult<Option<ShareableLink>> {
        Ok(self.lock().share_link(slug).cloned())
    }

    async fn get_project_share_links(&self, project_id: &str) -> ServiceResult<Vec<ShareableLink>> {
        let user = require_user(self.auth.as_ref()).await?;
        self.lock().project_share_links(&user.id, project_id)
    }

    async fn record_link_view(&self, link_id: &str) -> ServiceResult<()> {
        self.lock().record_link_view(link_id, Utc::now())
    }

    async fn delete_share_link(&self, link_id: &str) -> ServiceResult<()> {
        let user = require_user(self.auth.as_ref()).await?;
        self.lock().delete_share_link(&user.id, link_id)?;
        tracing::info!(link = link_id, "deleted share link");
        Ok(())
    }
}
