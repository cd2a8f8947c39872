/*
 * export.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Export a project to a standalone HTML document.
 */

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use pagesmith_content::ContentMap;
use pagesmith_project::{Project, ProjectService};
use pagesmith_template::{DirectorySaver, ExportRequest, download_html, export_to_html};

use super::ProjectRef;
use crate::config::Config;
use crate::project_file::ProjectFile;

/// Arguments for the export command
#[derive(Debug, Default)]
pub struct ExportArgs {
    pub project: Option<String>,
    pub template: Option<String>,
    pub data: Option<PathBuf>,
    pub name: Option<String>,
    pub theme: Option<String>,
    pub output: Option<String>,
}

/// What to export, after resolving the arguments.
#[derive(Debug)]
pub(crate) struct Source {
    pub name: String,
    pub template: String,
    pub theme: Option<String>,
    pub data: ContentMap,
}

impl From<Project> for Source {
    fn from(project: Project) -> Self {
        Self {
            name: project.name,
            template: project.template,
            theme: project.theme,
            data: project.data,
        }
    }
}

pub fn execute(config: &Config, args: ExportArgs) -> Result<()> {
    let source = resolve_source(config, &args)?;
    write_export(config, &source, args.output.as_deref())
}

/// Render `source` and write it to `output`: a directory, `-` for stdout,
/// or the configured output directory when `None`.
pub(crate) fn write_export(config: &Config, source: &Source, output: Option<&str>) -> Result<()> {
    let registry = config.registry()?;
    let request = ExportRequest::new(&source.template, &source.data, &source.name)
        .with_theme(source.theme.as_deref());
    let html = export_to_html(&registry, &request)?;

    match output {
        Some("-") => print!("{html}"),
        output => {
            let dir = output.map_or_else(|| config.output_dir.clone(), PathBuf::from);
            let mut saver = DirectorySaver::new(dir);
            let path = download_html(&mut saver, &html, &source.name)?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn resolve_source(config: &Config, args: &ExportArgs) -> Result<Source> {
    let mut source = match args.project.as_deref().map(ProjectRef::parse) {
        Some(ProjectRef::File(path)) => {
            let file = ProjectFile::read(&path)?;
            Source {
                name: file.name(),
                template: file.template().unwrap_or_default().to_string(),
                theme: file.theme().map(str::to_string),
                data: file.data(),
            }
        }
        Some(ProjectRef::Stored(id)) => {
            let service = config.project_service()?;
            let project = pollster::block_on(service.get_project(&id))?
                .with_context(|| format!("No project file or stored project named '{id}'"))?;
            Source::from(project)
        }
        None => {
            let data = match &args.data {
                Some(path) => {
                    let json = std::fs::read_to_string(path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    ContentMap::from_json_str(&json)
                        .with_context(|| format!("Invalid content map in {}", path.display()))?
                }
                None => ContentMap::new(),
            };
            Source {
                name: String::new(),
                template: String::new(),
                theme: None,
                data,
            }
        }
    };

    if let Some(template) = &args.template {
        source.template = template.clone();
    }
    if let Some(name) = &args.name {
        source.name = name.clone();
    }
    if let Some(theme) = &args.theme {
        source.theme = Some(theme.clone());
    }
    if source.template.is_empty() {
        bail!("No template given; pass a project or --template");
    }
    if source.name.is_empty() {
        source.name = source.template.clone();
    }
    tracing::debug!(
        template = %source.template,
        name = %source.name,
        theme = source.theme.as_deref().unwrap_or("default"),
        "resolved export source"
    );
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn config_in(temp: &TempDir) -> Config {
        Config {
            output_dir: temp.path().join("dist"),
            store: temp.path().join("projects.json"),
            ..Config::default()
        }
    }

    #[test]
    fn test_export_project_file_to_directory() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        let project = temp.path().join("launch.json");
        std::fs::write(
            &project,
            r#"{"name": "My Launch", "template": "superclips", "data": {"hero_headline": {"text": "Hello"}}}"#,
        )
        .unwrap();

        execute(
            &config,
            ExportArgs {
                project: Some(project.to_string_lossy().into_owned()),
                ..ExportArgs::default()
            },
        )
        .unwrap();

        let html = std::fs::read_to_string(temp.path().join("dist/my-launch.html")).unwrap();
        assert!(html.contains("Hello"));
        assert!(html.contains("<title>My Launch</title>"));
    }

    #[test]
    fn test_theme_from_file_and_flag() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        let project = temp.path().join("pro.json");
        std::fs::write(
            &project,
            r#"{"name": "Pro", "template": "saas-pro", "theme": "modern-minimal", "data": {}}"#,
        )
        .unwrap();
        let project_arg = project.to_string_lossy().into_owned();

        execute(
            &config,
            ExportArgs {
                project: Some(project_arg.clone()),
                ..ExportArgs::default()
            },
        )
        .unwrap();
        let html = std::fs::read_to_string(temp.path().join("dist/pro.html")).unwrap();
        assert!(html.contains(r#"data-theme="modern-minimal""#));

        let source = resolve_source(
            &config,
            &ExportArgs {
                project: Some(project_arg),
                theme: Some("corporate-blue".to_string()),
                ..ExportArgs::default()
            },
        )
        .unwrap();
        assert_eq!(source.theme.as_deref(), Some("corporate-blue"));
    }

    #[test]
    fn test_template_only_export_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        let source = resolve_source(
            &config,
            &ExportArgs {
                template: Some("empty".to_string()),
                ..ExportArgs::default()
            },
        )
        .unwrap();
        assert_eq!(source.name, "empty");
        assert!(source.data.is_empty());
    }

    #[test]
    fn test_unknown_template_fails_without_writing() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        let err = execute(
            &config,
            ExportArgs {
                template: Some("no-such-template".to_string()),
                ..ExportArgs::default()
            },
        )
        .unwrap_err();

        assert!(err.to_string().contains("no-such-template"));
        assert!(!temp.path().join("dist").exists());
    }

    #[test]
    fn test_missing_template_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(resolve_source(&config_in(&temp), &ExportArgs::default()).is_err());
    }
}
