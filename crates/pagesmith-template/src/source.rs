/*
 * source.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template sources.
//!
//! A template is a pair of files under a directory named after its id:
//! `<id>/template.yml` (the manifest) and `<id>/template.html` (the body).
//! Sources only hand out the raw text; compiling and validating happens in
//! the registry.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use include_dir::{Dir, include_dir};

use crate::error::DefinitionError;

/// Manifest file name inside a template directory.
pub const MANIFEST_FILE: &str = "template.yml";

/// Body file name inside a template directory.
pub const BODY_FILE: &str = "template.html";

/// Built-in templates, compiled into the binary.
static BUILTIN_TEMPLATES: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/resources/templates");

/// Raw text of one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFiles {
    pub manifest: String,
    pub body: String,
}

/// Trait for loading template files by id.
pub trait TemplateSource {
    /// Short description used in log messages.
    fn describe(&self) -> String;

    /// Ids of every template this source provides, sorted.
    fn template_ids(&self) -> Result<Vec<String>, DefinitionError>;

    /// Load one template, or `None` if this source has no such id.
    fn get_template(&self, id: &str) -> Result<Option<TemplateFiles>, DefinitionError>;
}

/// Templates compiled into the binary via `include_dir`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSource;

impl TemplateSource for EmbeddedSource {
    fn describe(&self) -> String {
        "built-in templates".to_string()
    }

    fn template_ids(&self) -> Result<Vec<String>, DefinitionError> {
        let mut ids: Vec<String> = BUILTIN_TEMPLATES
            .dirs()
            .filter(|dir| dir.get_file(dir.path().join(MANIFEST_FILE)).is_some())
            .filter_map(|dir| dir.path().file_name()?.to_str().map(str::to_string))
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn get_template(&self, id: &str) -> Result<Option<TemplateFiles>, DefinitionError> {
        let read = |file: &str| {
            BUILTIN_TEMPLATES
                .get_file(Path::new(id).join(file))
                .and_then(|f| f.contents_utf8())
                .map(str::to_string)
        };
        Ok(match (read(MANIFEST_FILE), read(BODY_FILE)) {
            (Some(manifest), Some(body)) => Some(TemplateFiles { manifest, body }),
            _ => None,
        })
    }
}

/// Templates in a directory on disk.
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    root: PathBuf,
}

impl FileSystemSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn io_error(&self, id: &str, source: std::io::Error) -> DefinitionError {
        DefinitionError::Io {
            id: id.to_string(),
            source,
        }
    }
}

impl TemplateSource for FileSystemSource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn template_ids(&self) -> Result<Vec<String>, DefinitionError> {
        let entries = fs::read_dir(&self.root)
            .map_err(|e| self.io_error(&self.root.display().to_string(), e))?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.io_error(&self.root.display().to_string(), e))?;
            let path = entry.path();
            if !path.join(MANIFEST_FILE).is_file() {
                continue;
            }
            if let Some(id) = path.file_name().and_then(|n| n.to_str()) {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn get_template(&self, id: &str) -> Result<Option<TemplateFiles>, DefinitionError> {
        let dir = self.root.join(id);
        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Ok(None);
        }
        let manifest = fs::read_to_string(&manifest_path).map_err(|e| self.io_error(id, e))?;
        let body = fs::read_to_string(dir.join(BODY_FILE)).map_err(|e| self.io_error(id, e))?;
        Ok(Some(TemplateFiles { manifest, body }))
    }
}

/// Templates held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    templates: BTreeMap<String, TemplateFiles>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template to the source.
    pub fn add(
        &mut self,
        id: impl Into<String>,
        manifest: impl Into<String>,
        body: impl Into<String>,
    ) -> &mut Self {
        self.templates.insert(
            id.into(),
            TemplateFiles {
                manifest: manifest.into(),
                body: body.into(),
            },
        );
        self
    }
}

impl TemplateSource for MemorySource {
    fn describe(&self) -> String {
        "in-memory templates".to_string()
    }

    fn template_ids(&self) -> Result<Vec<String>, DefinitionError> {
        Ok(self.templates.keys().cloned().collect())
    }

    fn get_template(&self, id: &str) -> Result<Option<TemplateFiles>, DefinitionError> {
        Ok(self.templates.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_templates_present() {
        let ids = EmbeddedSource.template_ids().unwrap();
        assert_eq!(
            ids,
            vec!["empty", "general-content", "portfolio", "saas-pro", "superclips"]
        );

        let files = EmbeddedSource.get_template("superclips").unwrap().unwrap();
        assert!(files.manifest.contains("hero_headline"));
        assert!(files.body.contains("$text(hero_headline)$"));
        assert!(EmbeddedSource.get_template("missing").unwrap().is_none());
    }

    #[test]
    fn test_filesystem_source() {
        let dir = tempfile::tempdir().unwrap();
        let landing = dir.path().join("landing");
        fs::create_dir(&landing).unwrap();
        fs::write(landing.join(MANIFEST_FILE), "id: landing\nname: Landing\n").unwrap();
        fs::write(landing.join(BODY_FILE), "<main></main>").unwrap();
        fs::create_dir(dir.path().join("not-a-template")).unwrap();

        let source = FileSystemSource::new(dir.path());
        assert_eq!(source.template_ids().unwrap(), vec!["landing"]);

        let files = source.get_template("landing").unwrap().unwrap();
        assert_eq!(files.body, "<main></main>");
        assert!(source.get_template("not-a-template").unwrap().is_none());
    }

    #[test]
    fn test_filesystem_missing_body_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken");
        fs::create_dir(&broken).unwrap();
        fs::write(broken.join(MANIFEST_FILE), "id: broken\nname: Broken\n").unwrap();

        let err = FileSystemSource::new(dir.path())
            .get_template("broken")
            .unwrap_err();
        assert!(matches!(err, DefinitionError::Io { id, .. } if id == "broken"));
    }

    #[test]
    fn test_memory_source() {
        let mut source = MemorySource::new();
        source.add("b", "id: b\nname: B\n", "").add("a", "id: a\nname: A\n", "");
        assert_eq!(source.template_ids().unwrap(), vec!["a", "b"]);
        assert!(source.get_template("a").unwrap().is_some());
    }
}
