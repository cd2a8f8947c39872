/*
 * edit.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Change the content of one slot in a project file or stored project.
 */

use anyhow::{Context, Result, bail};
use pagesmith_content::{ContentMap, ContentSink, ContentValue};
use pagesmith_project::EditSession;
use pagesmith_template::{SlotKind, SlotSpec, TemplateRegistry};

use super::ProjectRef;
use crate::config::Config;
use crate::project_file::ProjectFile;

/// Arguments for the edit command
#[derive(Debug, Default)]
pub struct EditArgs {
    pub project: String,
    pub eid: String,
    pub text: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
    pub button_text: Option<String>,
    pub button_url: Option<String>,
}

pub fn execute(config: &Config, args: EditArgs) -> Result<()> {
    let registry = config.registry()?;

    match ProjectRef::parse(&args.project) {
        ProjectRef::File(path) => {
            let mut file = ProjectFile::read(&path)?;
            let mut data = file.data();
            let slot = lookup_slot(&registry, file.template(), &args.eid);
            let value = build_value(&args, &data, slot.as_ref())?;
            data.on_content_change(&args.eid, value);
            file.set_data(&data);
            file.write()?;
            tracing::info!(file = %path.display(), eid = %args.eid, "updated project file");
        }
        ProjectRef::Stored(id) => {
            let service = config.project_service()?;
            let mut session = pollster::block_on(EditSession::open(&service, &id))?
                .with_context(|| format!("No project file or stored project named '{id}'"))?;
            let project = session.project();
            let slot = lookup_slot(&registry, Some(&project.template), &args.eid);
            let value = build_value(&args, &project.data, slot.as_ref())?;
            session.on_content_change(&args.eid, value);
            pollster::block_on(session.save(&service))?;
        }
    }
    Ok(())
}

/// The manifest slot behind `eid`, resolving loop ids such as
/// `pt-test-avatar-2` to their `{n}` declaration.
fn lookup_slot(registry: &TemplateRegistry, template: Option<&str>, eid: &str) -> Option<SlotSpec> {
    let definition = registry.get(template?)?;
    let slot = definition.slot_for(eid);
    if slot.is_none() {
        tracing::warn!(template = definition.id(), eid, "template has no such slot");
    }
    slot
}

/// Turn the command-line flags into a replacement value for `eid`.
///
/// A button edit that only names one half keeps the other half from the
/// current content, or the slot default.
fn build_value(
    args: &EditArgs,
    current: &ContentMap,
    slot: Option<&SlotSpec>,
) -> Result<ContentValue> {
    let value = if let Some(text) = &args.text {
        ContentValue::text(text.as_str())
    } else if let Some(image) = &args.image {
        match &args.link {
            Some(link) => ContentValue::image_with_link(image.as_str(), link.as_str()),
            None => ContentValue::image(image.as_str()),
        }
    } else if args.button_text.is_some() || args.button_url.is_some() {
        let (default_text, default_url) = slot
            .map(|s| (s.default.as_str(), s.default_url.as_str()))
            .unwrap_or(("", "#"));
        let existing = current.get_button(&args.eid, default_text, default_url);
        ContentValue::button(
            args.button_text.clone().unwrap_or(existing.text),
            args.button_url.clone().unwrap_or(existing.url),
        )
    } else {
        bail!("Nothing to change; pass --text, --image or --button-text/--button-url");
    };

    if let Some(slot) = slot {
        let kind = match &value {
            ContentValue::Text { .. } => SlotKind::Text,
            ContentValue::Image { .. } => SlotKind::Image,
            ContentValue::Button { .. } => SlotKind::Button,
        };
        if kind != slot.kind {
            bail!("Slot '{}' holds {} content, not {}", slot.id, slot.kind, kind);
        }
    }
    Ok(value)
}
