/*
 * slots.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * List the editable slots of one template.
 */

use anyhow::Result;
use pagesmith_template::{SlotKind, TemplateDefinition};

use crate::config::Config;

pub fn execute(config: &Config, template: &str) -> Result<()> {
    let registry = config.registry()?;
    let definition = registry.require(template)?;
    print!("{}", describe_slots(definition));
    Ok(())
}

fn describe_slots(definition: &TemplateDefinition) -> String {
    let mut out = String::new();
    let mut section: Option<&str> = None;
    for slot in &definition.manifest.slots {
        if slot.section.as_deref() != section {
            section = slot.section.as_deref();
            if let Some(name) = section {
                out.push_str(&format!("{name}:\n"));
            }
        }
        let default = match slot.kind {
            SlotKind::Button => format!("{} -> {}", slot.default, slot.default_url),
            SlotKind::Image if !slot.default_link.is_empty() => {
                format!("{} -> {}", slot.default, slot.default_link)
            }
            _ => slot.default.clone(),
        };
        out.push_str(&format!("  {} ({}): {}\n", slot.id, slot.kind, default));
    }
    out
}
