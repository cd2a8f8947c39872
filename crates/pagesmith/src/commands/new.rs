/*
 * new.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Create a stored project from a template.
 */

use anyhow::{Result, bail};
use pagesmith_project::{NewProject, ProjectService};

use crate::config::Config;

pub fn execute(config: &Config, name: &str, template: &str, theme: Option<&str>) -> Result<()> {
    let registry = config.registry()?;
    let definition = registry.require(template)?;
    if let Some(theme) = theme {
        if !definition.manifest.themes.iter().any(|t| t.id == theme) {
            bail!("Template '{template}' has no theme '{theme}'");
        }
    }

    let service = config.project_service()?;
    let input = NewProject {
        theme: theme.map(str::to_string),
        ..NewProject::new(name, template)
    };
    let project = pollster::block_on(service.create_project(input))?;
    tracing::info!(id = %project.id, template, theme, "created project");
    println!("{}", project.id);
    Ok(())
}
