/*
 * manifest.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template manifests.
//!
//! A manifest is the explicit schema of a template: which slots exist, what
//! kind of content each one holds, and the compiled-in default shown until a
//! user edits it. Manifests are YAML documents stored next to the template
//! body:
//!
//! ```yaml
//! id: general-content
//! name: General Content Page
//! category: Content
//! slots:
//!   - id: headline
//!     kind: text
//!     label: Headline
//!     default: A short, impactful headline
//!   - id: cta_button
//!     kind: button
//!     default: Get Started
//!     default_url: "#"
//! ```
//!
//! Slot ids may contain loop placeholders (`pt-proj-title-{n}`); defaults may
//! use the same placeholders.
//!
//! A template may also declare colour themes. The project's chosen theme
//! becomes CSS variables (`--theme-primary`, `--theme-secondary`,
//! `--theme-accent`) in the exported head, and `$theme$` renders its id:
//!
//! ```yaml
//! default_theme: corporate-blue
//! themes:
//!   - id: corporate-blue
//!     name: Corporate Blue
//!     colors: { primary: "#1e40af", secondary: "#3b82f6", accent: "#60a5fa" }
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DefinitionError;

/// The kind of content a slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Text,
    Image,
    Button,
}

impl SlotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotKind::Text => "text",
            SlotKind::Image => "image",
            SlotKind::Button => "button",
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One editable slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlotSpec {
    pub id: String,
    pub kind: SlotKind,

    /// Human-readable label for editor side panels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Editor grouping (e.g. "Hero", "Footer").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,

    /// Default text, image source, or button label.
    #[serde(default)]
    pub default: String,

    /// Default button target (button slots).
    #[serde(default = "default_button_url")]
    pub default_url: String,

    /// Default click-through link (image slots).
    #[serde(default)]
    pub default_link: String,
}

fn default_button_url() -> String {
    "#".to_string()
}

/// Theme colours, written into CSS variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeColors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
}

/// One colour theme of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeSpec {
    pub id: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub colors: ThemeColors,

    /// Extra head markup for this theme only.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub head: String,
}

impl ThemeSpec {
    /// Head markup: the colour variables, then the theme's own extras.
    pub fn head_markup(&self) -> String {
        let mut out = format!(
            "<style>:root {{ --theme-primary: {}; --theme-secondary: {}; --theme-accent: {}; }}</style>\n",
            self.colors.primary, self.colors.secondary, self.colors.accent
        );
        out.push_str(&self.head);
        out
    }
}

/// Template metadata and slot schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateManifest {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    /// Extra markup for the exported document's `<head>` (fonts, config).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub head: String,

    #[serde(default)]
    pub slots: Vec<SlotSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub themes: Vec<ThemeSpec>,

    /// Theme used when a project names none (first theme if unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_theme: Option<String>,
}

impl TemplateManifest {
    /// Parse a manifest document.
    ///
    /// `id` names the template in error messages; it is checked against the
    /// manifest's own `id` when the definition is assembled.
    pub fn from_yaml(id: &str, source: &str) -> Result<Self, DefinitionError> {
        let manifest: TemplateManifest =
            serde_yaml::from_str(source).map_err(|source| DefinitionError::Manifest {
                id: id.to_string(),
                source,
            })?;
        manifest.check_unique_slots()?;
        manifest.check_themes()?;
        Ok(manifest)
    }

    /// Look up a slot by its id as written in the template.
    pub fn slot(&self, eid: &str) -> Option<&SlotSpec> {
        self.slots.iter().find(|s| s.id == eid)
    }

    /// The theme to render for a project that asked for `requested`.
    ///
    /// Unknown or missing requests get the default theme. Templates without
    /// themes give `None`.
    pub fn theme(&self, requested: Option<&str>) -> Option<&ThemeSpec> {
        if let Some(id) = requested {
            if let Some(theme) = self.themes.iter().find(|t| t.id == id) {
                return Some(theme);
            }
            tracing::warn!(template = %self.id, theme = id, "unknown theme, using default");
        }
        match &self.default_theme {
            Some(default) => self.themes.iter().find(|t| &t.id == default),
            None => self.themes.first(),
        }
    }

    fn check_themes(&self) -> Result<(), DefinitionError> {
        let mut seen = HashSet::new();
        for theme in &self.themes {
            if !seen.insert(theme.id.as_str()) {
                return Err(DefinitionError::DuplicateTheme {
                    id: self.id.clone(),
                    theme: theme.id.clone(),
                });
            }
        }
        if let Some(default) = &self.default_theme {
            if !seen.contains(default.as_str()) {
                return Err(DefinitionError::UnknownTheme {
                    id: self.id.clone(),
                    theme: default.clone(),
                });
            }
        }
        Ok(())
    }

    fn check_unique_slots(&self) -> Result<(), DefinitionError> {
        let mut seen = HashSet::new();
        for slot in &self.slots {
            if !seen.insert(slot.id.as_str()) {
                return Err(DefinitionError::DuplicateSlot {
                    id: self.id.clone(),
                    eid: slot.id.clone(),
                });
            }
        }
        Ok(())
    }
}
