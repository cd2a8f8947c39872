/*
 * project_file.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Standalone project documents.
//!
//! A project file is the JSON shape a project is saved in:
//!
//! ```json
//! { "name": "Launch", "template": "superclips", "data": { "hero_headline": { "text": "Hi" } } }
//! ```
//!
//! Fields this tool does not know about are kept on write.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use pagesmith_content::ContentMap;
use serde_json::{Map, Value};

pub struct ProjectFile {
    path: PathBuf,
    document: Map<String, Value>,
}

impl ProjectFile {
    pub fn read(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read project file: {}", path.display()))?;
        let value: Value = serde_json::from_str(&source)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?;
        let Value::Object(document) = value else {
            bail!("Project file {} must contain a JSON object", path.display());
        };
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    /// Project name, falling back to the file stem.
    pub fn name(&self) -> String {
        match self.document.get("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self
                .path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    pub fn template(&self) -> Option<&str> {
        self.document.get("template").and_then(Value::as_str)
    }

    pub fn theme(&self) -> Option<&str> {
        self.document
            .get("theme")
            .and_then(Value::as_str)
            .filter(|theme| !theme.is_empty())
    }

    /// Content map; malformed entries are skipped.
    pub fn data(&self) -> ContentMap {
        self.document
            .get("data")
            .map(ContentMap::from_json_lenient)
            .unwrap_or_default()
    }

    pub fn set_data(&mut self, data: &ContentMap) {
        self.document.insert("data".to_string(), data.to_json_value());
    }

    pub fn write(&self) -> Result<()> {
        let mut json = serde_json::to_string_pretty(&self.document)?;
        json.push('\n');
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write project file: {}", self.path.display()))
    }
}
