/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! CLI configuration.
//!
//! Settings come from `pagesmith.yml` (or the file given with `--config`),
//! falling back to defaults when no file exists. Relative paths are resolved
//! against the directory containing the config file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use pagesmith_project::{JsonFileProjectService, LocalAuthService, User};
use pagesmith_template::{FileSystemSource, TemplateRegistry};
use serde::Deserialize;

/// Default config file looked up in the working directory.
pub const CONFIG_FILE: &str = "pagesmith.yml";

/// Environment variable overriding `base_url`.
pub const BASE_URL_ENV: &str = "PAGESMITH_BASE_URL";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Origin used to build share links.
    pub base_url: String,

    /// Where `export` writes files unless `-o` is given.
    pub output_dir: PathBuf,

    /// JSON file holding stored projects.
    pub store: PathBuf,

    /// Extra template directories; later entries override earlier ones and
    /// the built-in set.
    pub template_dirs: Vec<PathBuf>,

    /// Id of the local user owning stored projects.
    pub user: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            output_dir: PathBuf::from("dist"),
            store: PathBuf::from("projects.json"),
            template_dirs: Vec::new(),
            user: "local".to_string(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `./pagesmith.yml` is used if
    /// present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let default = PathBuf::from(CONFIG_FILE);
                default.is_file().then_some(default)
            }
        };

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => {
                tracing::debug!("No {} found, using defaults", CONFIG_FILE);
                Self::default()
            }
        };

        match std::env::var(BASE_URL_ENV) {
            Ok(base_url) if !base_url.is_empty() => config.base_url = base_url,
            _ => {}
        }
        Ok(config)
    }

    /// Read a config file and resolve its relative paths.
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config = Self::from_yaml(&source)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.resolve_paths(base);
        tracing::debug!(config = %path.display(), "Loaded configuration");
        Ok(config)
    }

    fn from_yaml(source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(source)?)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.output_dir);
        resolve(&mut self.store);
        self.template_dirs.iter_mut().for_each(resolve);
    }

    /// Built-in templates plus every configured template directory.
    pub fn registry(&self) -> Result<TemplateRegistry> {
        let mut registry =
            TemplateRegistry::with_builtin().context("Failed to load built-in templates")?;
        for dir in &self.template_dirs {
            let source = FileSystemSource::new(dir);
            registry
                .load_source(&source)
                .with_context(|| format!("Failed to load templates from {}", dir.display()))?;
        }
        Ok(registry)
    }

    /// The project store, owned by the configured local user.
    pub fn project_service(&self) -> Result<JsonFileProjectService> {
        let auth = Arc::new(LocalAuthService::signed_in(User::new(&self.user)));
        JsonFileProjectService::open(&self.store, auth)
            .with_context(|| format!("Failed to open project store: {}", self.store.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let config = Config::from_yaml("base_url: https://pages.example.com\n").unwrap();
        assert_eq!(config.base_url, "https://pages.example.com");
        assert_eq!(config.store, PathBuf::from("projects.json"));
        assert_eq!(config.user, "local");
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(Config::from_yaml("colour: red\n").is_err());
    }

    #[test]
    fn test_paths_resolved_against_config_dir() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "store: data/store.json\ntemplate_dirs: [themes]\noutput_dir: /abs/out\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.store, temp.path().join("data/store.json"));
        assert_eq!(config.template_dirs, vec![temp.path().join("themes")]);
        assert_eq!(config.output_dir, PathBuf::from("/abs/out"));
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(Config::load(Some(&temp.path().join("nope.yml"))).is_err());
    }

    #[test]
    fn test_registry_includes_builtin_templates() {
        let registry = Config::default().registry().unwrap();
        assert!(registry.contains("superclips"));
        assert!(registry.contains("empty"));
    }
}
