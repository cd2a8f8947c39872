/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Render options and evaluation context.
//!
//! A template is rendered against a [`RenderContext`]: the project's content
//! map, the template manifest (for slot defaults), the document-level
//! variables, and the loop indices currently in scope. Rendering never reads
//! anything else, so identical contexts give identical output.

use std::borrow::Cow;

use pagesmith_content::ContentMap;

use crate::manifest::TemplateManifest;

/// Caller-facing render options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Wrap content slots with `data-eid` markers for an editor front end.
    pub editable: bool,

    /// Project name, used for `$title$`.
    pub title: String,

    /// Resolved theme id, used for `$theme$`.
    pub theme: Option<String>,
}

impl RenderOptions {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            editable: false,
            title: title.into(),
            theme: None,
        }
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn with_theme(mut self, theme: Option<String>) -> Self {
        self.theme = theme;
        self
    }
}

/// Everything a template reads while rendering.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    content: &'a ContentMap,
    manifest: Option<&'a TemplateManifest>,
    options: &'a RenderOptions,
    head: &'a str,
    body: &'a str,

    /// Loop indices in scope, innermost last.
    indices: Vec<(String, i64)>,
}

impl<'a> RenderContext<'a> {
    pub fn new(content: &'a ContentMap, options: &'a RenderOptions) -> Self {
        Self {
            content,
            manifest: None,
            options,
            head: "",
            body: "",
            indices: Vec::new(),
        }
    }

    /// Use `manifest` for slot defaults.
    pub fn with_manifest(mut self, manifest: &'a TemplateManifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    /// Set the raw markup for `$head$`.
    pub fn with_head(mut self, head: &'a str) -> Self {
        self.head = head;
        self
    }

    /// Set the raw markup for `$body$`.
    pub fn with_body(mut self, body: &'a str) -> Self {
        self.body = body;
        self
    }

    pub fn content(&self) -> &'a ContentMap {
        self.content
    }

    pub fn manifest(&self) -> Option<&'a TemplateManifest> {
        self.manifest
    }

    pub fn options(&self) -> &'a RenderOptions {
        self.options
    }

    pub fn head(&self) -> &'a str {
        self.head
    }

    pub fn body(&self) -> &'a str {
        self.body
    }

    /// Current value of a loop variable.
    pub fn index(&self, var: &str) -> Option<i64> {
        self.indices
            .iter()
            .rev()
            .find(|(name, _)| name == var)
            .map(|(_, value)| *value)
    }

    /// Create a child context with one more loop variable bound.
    pub fn child(&self, var: &str, value: i64) -> RenderContext<'a> {
        let mut child = self.clone();
        child.indices.push((var.to_string(), value));
        child
    }

    /// Replace `{var}` placeholders with the loop indices in scope.
    pub fn expand<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if !text.contains('{') || self.indices.is_empty() {
            return Cow::Borrowed(text);
        }
        let mut expanded = text.to_string();
        for (var, value) in self.indices.iter().rev() {
            expanded = expanded.replace(&format!("{{{}}}", var), &value.to_string());
        }
        Cow::Owned(expanded)
    }
}
