/*
 * share.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Give a stored project a custom URL and print its share link.
 */

use anyhow::Result;
use pagesmith_project::set_custom_url;

use crate::config::Config;

pub fn execute(config: &Config, project_id: &str, slug: &str) -> Result<()> {
    let service = config.project_service()?;
    let url = pollster::block_on(set_custom_url(&service, &config.base_url, project_id, slug))?;
    println!("{url}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagesmith_project::{NewProject, ProjectService};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_share_stores_slug() {
        let temp = TempDir::new().unwrap();
        let config = Config {
            store: temp.path().join("projects.json"),
            ..Config::default()
        };
        let service = config.project_service().unwrap();
        let project =
            pollster::block_on(service.create_project(NewProject::new("Launch", "superclips")))
                .unwrap();

        execute(&config, &project.id, "launch-2025").unwrap();

        let reopened = config.project_service().unwrap();
        let stored = pollster::block_on(reopened.get_project_by_custom_url("launch-2025"))
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, project.id);
    }

    #[test]
    fn test_invalid_slug_rejected() {
        let temp = TempDir::new().unwrap();
        let config = Config {
            store: temp.path().join("projects.json"),
            ..Config::default()
        };
        let err = execute(&config, "any", "has space").unwrap_err();
        assert!(err.to_string().contains("has space"));
    }
}
