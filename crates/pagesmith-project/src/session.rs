/*
 * session.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Editing sessions.

use chrono::Utc;
use pagesmith_content::{ContentSink, ContentValue};

use crate::error::ServiceResult;
use crate::project::{Project, ProjectUpdate};
use crate::service::ProjectService;

/// An open project in an editor.
///
/// Edits land in the in-memory copy immediately (last writer wins per eid);
/// nothing reaches the store until [`EditSession::save`].
#[derive(Debug, Clone)]
pub struct EditSession {
    project: Project,
    dirty: bool,
}

impl EditSession {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            dirty: false,
        }
    }

    /// Load `id` from `service` and open it.
    pub async fn open(service: &dyn ProjectService, id: &str) -> ServiceResult<Option<Self>> {
        Ok(service.get_project(id).await?.map(Self::new))
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn into_project(self) -> Project {
        self.project
    }

    /// Whether there are edits not yet saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.project.name = name.into();
        self.touch();
    }

    /// Persist the content map and name through `service`.
    pub async fn save(&mut self, service: &dyn ProjectService) -> ServiceResult<&Project> {
        let update = ProjectUpdate {
            name: Some(self.project.name.clone()),
            data: Some(self.project.data.clone()),
            ..ProjectUpdate::default()
        };
        self.project = service.update_project(&self.project.id, update).await?;
        self.dirty = false;
        tracing::info!(project = %self.project.id, entries = self.project.data.len(), "saved project");
        Ok(&self.project)
    }

    fn touch(&mut self) {
        self.project.updated_at = Utc::now();
        self.dirty = true;
    }
}

impl ContentSink for EditSession {
    fn on_content_change(&mut self, eid: &str, value: ContentValue) {
        self.project.data.on_content_change(eid, value);
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::NewProject;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_edits_mark_dirty_and_overwrite() {
        let project = Project::new("alice", NewProject::new("Site", "superclips"), Utc::now());
        let created = project.updated_at;
        let mut session = EditSession::new(project);
        assert!(!session.is_dirty());

        session.on_content_change("hero_headline", ContentValue::text("First"));
        session.on_content_change("hero_headline", ContentValue::text("Second"));

        assert!(session.is_dirty());
        assert!(session.project().updated_at >= created);
        assert_eq!(session.project().data.get_text("hero_headline", ""), "Second");
        assert_eq!(session.project().data.len(), 1);
    }
}
