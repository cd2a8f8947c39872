/*
 * view.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Render the page published under a share slug, as a visitor would see it.
 */

use anyhow::Result;
use chrono::Utc;
use pagesmith_project::resolve_share;

use super::export::{Source, write_export};
use crate::config::Config;

/// Resolve `slug` (link, custom URL or project id), count the visit and
/// export the page. Output defaults to stdout.
pub fn execute(config: &Config, slug: &str, output: Option<&str>) -> Result<()> {
    let service = config.project_service()?;
    let project = pollster::block_on(resolve_share(&service, slug, Utc::now()))?;
    tracing::info!(slug, project = %project.id, views = project.analytics.views + 1, "shared page viewed");
    write_export(config, &Source::from(project), Some(output.unwrap_or("-")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagesmith_project::{NewProject, ProjectService, ShareableLink};
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
    fn test_view_exports_with_project_theme() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        let service = config.project_service().unwrap();
        let input = NewProject {
            theme: Some("elegant-dark".to_string()),
            ..NewProject::new("Pro Page", "saas-pro")
        };
        let project = pollster::block_on(service.create_project(input)).unwrap();

        let out = temp.path().join("shared");
        let out_arg = out.to_string_lossy().into_owned();
        execute(&config, &project.id, Some(out_arg.as_str())).unwrap();

        let html = std::fs::read_to_string(out.join("pro-page.html")).unwrap();
        assert!(html.contains(r#"data-theme="elegant-dark""#));

        let reopened = config.project_service().unwrap();
        let stored = pollster::block_on(reopened.get_project(&project.id))
            .unwrap()
            .unwrap();
        assert_eq!(stored.analytics.views, 1);
    }

    #[test]
    fn test_exhausted_link_is_refused() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        let service = config.project_service().unwrap();
        let project =
            pollster::block_on(service.create_project(NewProject::new("Once", "empty"))).unwrap();
        let link = ShareableLink::new(&project.id, "once", None, Some(1), Utc::now()).unwrap();
        pollster::block_on(service.add_share_link(link)).unwrap();

        let out = temp.path().join("shared").to_string_lossy().into_owned();
        execute(&config, "once", Some(out.as_str())).unwrap();
        let err = execute(&config, "once", Some(out.as_str())).unwrap_err();
        assert!(err.to_string().contains("view limit"));

        assert!(execute(&config, "nobody-home", Some(out.as_str())).is_err());
    }
}
