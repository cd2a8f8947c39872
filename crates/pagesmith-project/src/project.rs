/*
 * project.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Project records.

use chrono::{DateTime, Utc};
use pagesmith_content::ContentMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// View and click counters for a published project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectAnalytics {
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_viewed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_clicked_at: Option<DateTime<Utc>>,
}

/// A user's page: a template id plus the content filled into its slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default)]
    pub data: ContentMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub analytics: ProjectAnalytics,
}

impl Project {
    /// Create a project owned by `user_id` with a fresh id.
    pub fn new(user_id: impl Into<String>, input: NewProject, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            name: input.name,
            template: input.template,
            theme: input.theme,
            data: input.data,
            custom_url: input.custom_url,
            created_at: now,
            updated_at: now,
            analytics: ProjectAnalytics::default(),
        }
    }

    /// Path segment used in share links: the custom URL, else the id.
    pub fn share_slug(&self) -> &str {
        match self.custom_url.as_deref() {
            Some(slug) if !slug.is_empty() => slug,
            _ => &self.id,
        }
    }

    /// Apply the fields present in `update`.
    pub fn apply(&mut self, update: ProjectUpdate, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(template) = update.template {
            self.template = template;
        }
        if let Some(theme) = update.theme {
            self.theme = Some(theme);
        }
        if let Some(data) = update.data {
            self.data = data;
        }
        if let Some(custom_url) = update.custom_url {
            self.custom_url = Some(custom_url);
        }
        self.updated_at = now;
    }

    pub fn record_view(&mut self, now: DateTime<Utc>) {
        self.analytics.views += 1;
        self.analytics.last_viewed_at = Some(now);
    }

    pub fn record_click(&mut self, now: DateTime<Utc>) {
        self.analytics.clicks += 1;
        self.analytics.last_clicked_at = Some(now);
    }
}

/// Input for creating a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub template: String,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub data: ContentMap,
    #[serde(default)]
    pub custom_url: Option<String>,
}

impl NewProject {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            ..Self::default()
        }
    }
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub template: Option<String>,
    pub theme: Option<String>,
    pub data: Option<ContentMap>,
    pub custom_url: Option<String>,
}

impl ProjectUpdate {
    pub fn data(data: ContentMap) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    pub fn custom_url(slug: impl Into<String>) -> Self {
        Self {
            custom_url: Some(slug.into()),
            ..Self::default()
        }
    }
}
