/*
 * templates.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * List available templates.
 */

use anyhow::Result;
use pagesmith_template::TemplateRegistry;
use serde_json::{Value, json};

use crate::config::Config;

pub fn execute(config: &Config, json: bool) -> Result<()> {
    let registry = config.registry()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&listing_json(&registry))?);
    } else {
        print!("{}", listing_text(&registry));
    }
    Ok(())
}

fn listing_json(registry: &TemplateRegistry) -> Value {
    registry
        .iter()
        .map(|definition| {
            let manifest = &definition.manifest;
            json!({
                "id": manifest.id,
                "name": manifest.name,
                "category": manifest.category,
                "description": manifest.description,
                "slots": manifest.slots.len(),
                "themes": manifest.themes.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
                "default_theme": manifest.theme(None).map(|t| t.id.as_str()),
            })
        })
        .collect()
}

fn listing_text(registry: &TemplateRegistry) -> String {
    let width = registry.ids().map(str::len).max().unwrap_or(0);
    let mut out = String::new();
    for definition in registry.iter() {
        let manifest = &definition.manifest;
        let category = if manifest.category.is_empty() {
            String::new()
        } else {
            format!(" [{}]", manifest.category)
        };
        out.push_str(&format!(
            "{:width$}  {}{} ({} slots)\n",
            manifest.id,
            manifest.name,
            category,
            manifest.slots.len(),
        ));
    }
    out
}
