/*
 * json_store.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Project service persisted to a single JSON file.
//!
//! The whole store is read once when the service is opened and rewritten
//! after every successful mutation. A mutation whose write fails is rolled
//! back in memory, so the service never reports state the file lacks.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{ServiceError, ServiceResult};
use crate::memory::{InMemoryProjectService, ProjectStore};
use crate::project::{NewProject, Project, ProjectUpdate};
use crate::service::{ProjectService, SharedAuth};
use crate::share::ShareableLink;

pub struct JsonFileProjectService {
    path: PathBuf,
    inner: InMemoryProjectService,
}

impl JsonFileProjectService {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>, auth: SharedAuth) -> ServiceResult<Self> {
        let path = path.into();
        let store = read_store(&path)?;
        tracing::debug!(path = %path.display(), projects = store.len(), "opened project store");
        Ok(Self {
            inner: InMemoryProjectService::with_store(auth, store),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A copy of the current store contents.
    pub fn snapshot(&self) -> ProjectStore {
        self.inner.snapshot()
    }

    /// Run `mutation` against the in-memory store and write the result.
    ///
    /// If the write fails the store is put back as it was before the call.
    async fn mutate<T, F>(&self, mutation: F) -> ServiceResult<T>
    where
        F: Future<Output = ServiceResult<T>> + Send,
        T: Send,
    {
        let before = self.inner.snapshot();
        let value = mutation.await?;
        if let Err(err) = self.persist() {
            self.inner.restore(before);
            tracing::warn!(path = %self.path.display(), "store write failed, change rolled back");
            return Err(err);
        }
        Ok(value)
    }

    fn persist(&self) -> ServiceResult<()> {
        let store = self.inner.snapshot();
        let json = serde_json::to_string_pretty(&store).map_err(|source| ServiceError::Malformed {
            path: self.path.clone(),
            source,
        })?;

        let io_error = |source| ServiceError::Store {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(&self.path, json + "\n").map_err(io_error)?;
        tracing::debug!(path = %self.path.display(), projects = store.len(), "saved project store");
        Ok(())
    }
}

fn read_store(path: &Path) -> ServiceResult<ProjectStore> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ProjectStore::new()),
        Err(source) => {
            return Err(ServiceError::Store {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if text.trim().is_empty() {
        return Ok(ProjectStore::new());
    }
    serde_json::from_str(&text).map_err(|source| ServiceError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

#[async_trait]
impl ProjectService for JsonFileProjectService {
    async fn get_user_projects(&self) -> ServiceResult<Vec<Project>> {
        self.inner.get_user_projects().await
    }

    async fn get_project(&self, id: &str) -> ServiceResult<Option<Project>> {
        self.inner.get_project(id).await
    }

    async fn get_project_by_custom_url(&self, slug: &str) -> ServiceResult<Option<Project>> {
        self.inner.get_project_by_custom_url(slug).await
    }

    async fn create_project(&self, input: NewProject) -> ServiceResult<Project> {
        self.mutate(self.inner.create_project(input)).await
    }

    async fn update_project(&self, id: &str, update: ProjectUpdate) -> ServiceResult<Project> {
        self.mutate(self.inner.update_project(id, update)).await
    }

    async fn delete_project(&self, id: &str) -> ServiceResult<()> {
        self.mutate(self.inner.delete_project(id)).await
    }

    async fn is_custom_url_available(
        &self,
        slug: &str,
        excluding: Option<&str>,
    ) -> ServiceResult<bool> {
        self.inner.is_custom_url_available(slug, excluding).await
    }

    async fn record_view(&self, id: &str) -> ServiceResult<()> {
        self.mutate(self.inner.record_view(id)).await
    }

    async fn record_click(&self, id: &str) -> ServiceResult<()> {
        self.mutate(self.inner.record_click(id)).await
    }

    async fn add_share_link(&self, link: ShareableLink) -> ServiceResult<Option<ShareableLink>> {
        self.mutate(self.inner.add_share_link(link)).await
    }

    async fn get_share_link(&self, slug: &str) -> ServiceResult<Option<ShareableLink>> {
        self.inner.get_share_link(slug).await
    }

    async fn get_project_share_links(&self, project_id: &str) -> ServiceResult<Vec<ShareableLink>> {
        self.inner.get_project_share_links(project_id).await
    }

    async fn record_link_view(&self, link_id: &str) -> ServiceResult<()> {
        self.mutate(self.inner.record_link_view(link_id)).await
    }

    async fn delete_share_link(&self, link_id: &str) -> ServiceResult<()> {
        self.mutate(self.inner.delete_share_link(link_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{LocalAuthService, User};
    use std::sync::Arc;

    fn auth() -> SharedAuth {
        Arc::new(LocalAuthService::signed_in(User::new("alice")))
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let service = JsonFileProjectService::open(dir.path().join("projects.json"), auth()).unwrap();
        assert!(service.snapshot().is_empty());
    }

    #[test]
    fn test_mutations_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("projects.json");

        let service = JsonFileProjectService::open(&path, auth()).unwrap();
        let project =
            pollster::block_on(service.create_project(NewProject::new("Site", "empty"))).unwrap();
        assert!(path.is_file());

        let reopened = JsonFileProjectService::open(&path, auth()).unwrap();
        let loaded = pollster::block_on(reopened.get_project(&project.id))
            .unwrap()
            .unwrap();
        assert_eq!(loaded, project);
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");
        let service = JsonFileProjectService::open(&path, auth()).unwrap();

        // A directory where the file should be makes every write fail.
        fs::create_dir(&path).unwrap();
        let err = pollster::block_on(service.create_project(NewProject::new("Site", "empty")))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Store { .. }));
        assert!(pollster::block_on(service.get_user_projects()).unwrap().is_empty());

        fs::remove_dir(&path).unwrap();
        let project =
            pollster::block_on(service.create_project(NewProject::new("Site", "empty"))).unwrap();
        assert!(matches!(
            pollster::block_on(service.record_view(&project.id)),
            Ok(())
        ));

        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        assert!(pollster::block_on(service.record_view(&project.id)).is_err());
        let kept = pollster::block_on(service.get_project(&project.id)).unwrap().unwrap();
        assert_eq!(kept.analytics.views, 1);
    }

    #[test]
    fn test_share_links_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");
        let service = JsonFileProjectService::open(&path, auth()).unwrap();
        let project =
            pollster::block_on(service.create_project(NewProject::new("Site", "empty"))).unwrap();
        let link = ShareableLink::new(&project.id, "promo", Some(7), Some(10), chrono::Utc::now())
            .unwrap();
        pollster::block_on(service.add_share_link(link.clone())).unwrap();
        pollster::block_on(service.record_link_view(&link.id)).unwrap();

        let reopened = JsonFileProjectService::open(&path, auth()).unwrap();
        let loaded = pollster::block_on(reopened.get_share_link("promo")).unwrap().unwrap();
        assert_eq!(loaded.views, 1);
        assert_eq!(loaded.max_views, Some(10));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonFileProjectService::open(&path, auth()),
            Err(ServiceError::Malformed { .. })
        ));
    }
}
