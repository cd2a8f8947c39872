/*
 * registry.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template definitions and the registry that resolves them by id.

use std::collections::{BTreeMap, HashMap, HashSet};

use pagesmith_content::ContentMap;

use crate::ast::{TemplateNode, walk_slots};
use crate::context::{RenderContext, RenderOptions};
use crate::error::{DefinitionError, ExportError, ExportResult};
use crate::manifest::{SlotSpec, TemplateManifest};
use crate::parser::Template;
use crate::source::{EmbeddedSource, TemplateFiles, TemplateSource};

/// A validated template: manifest plus compiled body.
///
/// Definitions are stateless with respect to content; the same definition
/// renders every project built from it.
#[derive(Debug, Clone)]
pub struct TemplateDefinition {
    pub manifest: TemplateManifest,
    pub body: Template,
}

impl TemplateDefinition {
    /// Compile and validate a template loaded under `id`.
    ///
    /// Every slot the body reads must be declared in the manifest with the
    /// same kind. Declared slots the body never reads are only logged.
    pub fn from_files(id: &str, files: &TemplateFiles) -> Result<Self, DefinitionError> {
        let manifest = TemplateManifest::from_yaml(id, &files.manifest)?;
        if manifest.id != id {
            return Err(DefinitionError::IdMismatch {
                expected: id.to_string(),
                found: manifest.id,
            });
        }

        let body = Template::compile_with_filename(&files.body, &format!("{}/template.html", id))
            .map_err(|source| DefinitionError::Syntax {
                id: id.to_string(),
                source,
            })?;

        let mut used = HashSet::new();
        let mut error = None;
        walk_slots(body.nodes(), &mut |slot| {
            used.insert(slot.eid.as_str());
            if error.is_some() {
                return;
            }
            match manifest.slot(&slot.eid) {
                None => {
                    error = Some(DefinitionError::UnknownSlot {
                        id: id.to_string(),
                        eid: slot.eid.clone(),
                        line: slot.pos.line,
                        column: slot.pos.column,
                    });
                }
                Some(spec) if spec.kind != slot.field.kind() => {
                    error = Some(DefinitionError::SlotKindMismatch {
                        id: id.to_string(),
                        eid: slot.eid.clone(),
                        expected: spec.kind,
                        found: slot.field.kind(),
                        line: slot.pos.line,
                    });
                }
                Some(_) => {}
            }
        });
        if let Some(error) = error {
            return Err(error);
        }

        for spec in &manifest.slots {
            if !used.contains(spec.id.as_str()) {
                tracing::warn!(template = id, slot = %spec.id, "slot is declared but never rendered");
            }
        }

        Ok(Self { manifest, body })
    }

    pub fn id(&self) -> &str {
        &self.manifest.id
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    /// The slot a concrete eid belongs to, with `{var}` placeholders expanded.
    ///
    /// Slots inside loops are declared once with a placeholder id
    /// (`pt-test-avatar-{n}`). A rendered id such as `pt-test-avatar-2`
    /// resolves to that declaration when each placeholder matches an index
    /// its loop actually produces.
    pub fn slot_for(&self, eid: &str) -> Option<SlotSpec> {
        if let Some(spec) = self.manifest.slot(eid) {
            return Some(spec.clone());
        }
        let mut ranges = HashMap::new();
        collect_loop_ranges(self.body.nodes(), &mut ranges);
        self.manifest.slots.iter().find_map(|spec| {
            if !spec.id.contains('{') {
                return None;
            }
            let segments = split_placeholders(&spec.id);
            let mut bindings = Vec::new();
            if !match_segments(&segments, eid, &ranges, &mut bindings) {
                return None;
            }
            let expand = |text: &str| {
                bindings.iter().fold(text.to_string(), |acc, (var, value)| {
                    acc.replace(&format!("{{{}}}", var), &value.to_string())
                })
            };
            Some(SlotSpec {
                id: eid.to_string(),
                default: expand(&spec.default),
                default_url: expand(&spec.default_url),
                default_link: expand(&spec.default_link),
                ..spec.clone()
            })
        })
    }

    /// Render the template body (no document shell).
    pub fn render(&self, content: &ContentMap, options: &RenderOptions) -> String {
        let context = RenderContext::new(content, options).with_manifest(&self.manifest);
        self.body.render(&context)
    }
}

#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

fn split_placeholders(id: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = id;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|i| open + i) else {
            break;
        };
        if open > 0 {
            segments.push(Segment::Literal(&rest[..open]));
        }
        segments.push(Segment::Placeholder(&rest[open + 1..close]));
        rest = &rest[close + 1..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }
    segments
}

/// Inclusive `$for$` ranges per loop variable.
fn collect_loop_ranges<'a>(nodes: &'a [TemplateNode], ranges: &mut HashMap<&'a str, Vec<(i64, i64)>>) {
    for node in nodes {
        match node {
            TemplateNode::Repeat(repeat) => {
                ranges
                    .entry(repeat.var.as_str())
                    .or_default()
                    .push((repeat.start, repeat.end));
                collect_loop_ranges(&repeat.body, ranges);
            }
            TemplateNode::Conditional(cond) => {
                collect_loop_ranges(&cond.then_branch, ranges);
                if let Some(else_branch) = &cond.else_branch {
                    collect_loop_ranges(else_branch, ranges);
                }
            }
            _ => {}
        }
    }
}

/// Match `text` against the segments, binding each placeholder to an index
/// written the way the evaluator prints it (no leading zeros or `+`).
fn match_segments<'a>(
    segments: &[Segment<'a>],
    text: &str,
    ranges: &HashMap<&str, Vec<(i64, i64)>>,
    bindings: &mut Vec<(&'a str, i64)>,
) -> bool {
    match segments.split_first() {
        None => text.is_empty(),
        Some((Segment::Literal(literal), rest)) => text
            .strip_prefix(*literal)
            .is_some_and(|tail| match_segments(rest, tail, ranges, bindings)),
        Some((Segment::Placeholder(var), rest)) => {
            let Some(var_ranges) = ranges.get(var) else {
                return false;
            };
            let sign = usize::from(text.starts_with('-'));
            let digits = text[sign..].bytes().take_while(u8::is_ascii_digit).count();
            for len in (sign + 1..=sign + digits).rev() {
                let written = &text[..len];
                let Ok(value) = written.parse::<i64>() else {
                    continue;
                };
                if value.to_string() != written
                    || !var_ranges.iter().any(|&(start, end)| (start..=end).contains(&value))
                {
                    continue;
                }
                if let Some(bound) = bindings.iter().find(|(name, _)| name == var) {
                    if bound.1 != value {
                        continue;
                    }
                }
                bindings.push((*var, value));
                if match_segments(rest, &text[len..], ranges, bindings) {
                    return true;
                }
                bindings.pop();
            }
            false
        }
    }
}

/// Registered templates, keyed and listed by id.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, TemplateDefinition>,
}

impl TemplateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in templates.
    pub fn with_builtin() -> Result<Self, DefinitionError> {
        let mut registry = Self::new();
        registry.load_source(&EmbeddedSource)?;
        Ok(registry)
    }

    /// Load every template from `source`, replacing templates with the same id.
    ///
    /// Returns the number of templates loaded. The first invalid template
    /// aborts the load.
    pub fn load_source(&mut self, source: &dyn TemplateSource) -> Result<usize, DefinitionError> {
        let ids = source.template_ids()?;
        let mut loaded = 0;
        for id in ids {
            let Some(files) = source.get_template(&id)? else {
                continue;
            };
            let definition = TemplateDefinition::from_files(&id, &files)?;
            if self.insert(definition).is_some() {
                tracing::debug!(template = %id, source = %source.describe(), "template overridden");
            }
            loaded += 1;
        }
        tracing::debug!(count = loaded, source = %source.describe(), "loaded templates");
        Ok(loaded)
    }

    /// Register a definition, returning the one it replaces.
    pub fn insert(&mut self, definition: TemplateDefinition) -> Option<TemplateDefinition> {
        self.templates
            .insert(definition.id().to_string(), definition)
    }

    pub fn get(&self, id: &str) -> Option<&TemplateDefinition> {
        self.templates.get(id)
    }

    /// Look up a template, failing with `TemplateNotFound`.
    pub fn require(&self, id: &str) -> ExportResult<&TemplateDefinition> {
        self.get(id).ok_or_else(|| ExportError::TemplateNotFound { id: id.to_string() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    /// Templates in id order.
    pub fn iter(&self) -> impl Iterator<Item = &TemplateDefinition> {
        self.templates.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::SlotKind;
    use crate::source::MemorySource;

    fn files(manifest: &str, body: &str) -> TemplateFiles {
        TemplateFiles {
            manifest: manifest.to_string(),
            body: body.to_string(),
        }
    }

    const MANIFEST: &str = "id: t\nname: T\nslots:\n  - { id: title, kind: text, default: Hi }\n  - { id: pic, kind: image }\n";

    #[test]
    fn test_valid_definition() {
        let def = TemplateDefinition::from_files(
            "t",
            &files(MANIFEST, "<h1>$text(title)$</h1><img src=\"$image(pic)$\">"),
        )
        .unwrap();
        assert_eq!(def.id(), "t");
        assert_eq!(
            def.render(&ContentMap::new(), &RenderOptions::default()),
            "<h1>Hi</h1><img src=\"\">"
        );
    }

    #[test]
    fn test_id_mismatch() {
        let err = TemplateDefinition::from_files("other", &files(MANIFEST, "")).unwrap_err();
        assert!(matches!(err, DefinitionError::IdMismatch { found, .. } if found == "t"));
    }

    #[test]
    fn test_unknown_slot() {
        let err = TemplateDefinition::from_files("t", &files(MANIFEST, "\n  $text(subtitle)$"))
            .unwrap_err();
        match err {
            DefinitionError::UnknownSlot {
                eid, line, column, ..
            } => {
                assert_eq!(eid, "subtitle");
                assert_eq!((line, column), (2, 3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_kind_mismatch() {
        let err =
            TemplateDefinition::from_files("t", &files(MANIFEST, "$button.url(pic)$")).unwrap_err();
        assert!(matches!(
            err,
            DefinitionError::SlotKindMismatch {
                expected: SlotKind::Image,
                found: SlotKind::Button,
                ..
            }
        ));
    }

    #[test]
    fn test_syntax_error() {
        let err = TemplateDefinition::from_files("t", &files(MANIFEST, "$if(text(title))$"))
            .unwrap_err();
        assert!(matches!(err, DefinitionError::Syntax { .. }));
    }

    #[test]
    fn test_later_sources_override() {
        let mut first = MemorySource::new();
        first.add("t", MANIFEST, "first $text(title)$");
        let mut second = MemorySource::new();
        second.add("t", MANIFEST, "second $text(title)$");

        let mut registry = TemplateRegistry::new();
        assert_eq!(registry.load_source(&first).unwrap(), 1);
        assert_eq!(registry.load_source(&second).unwrap(), 1);
        assert_eq!(registry.len(), 1);

        let def = registry.get("t").unwrap();
        assert_eq!(
            def.render(&ContentMap::new(), &RenderOptions::default()),
            "second Hi"
        );
    }

    #[test]
    fn test_require_unknown() {
        let registry = TemplateRegistry::new();
        assert!(matches!(
            registry.require("nope"),
            Err(ExportError::TemplateNotFound { id }) if id == "nope"
        ));
    }

    #[test]
    fn test_builtin_registry_is_sorted() {
        let registry = TemplateRegistry::with_builtin().unwrap();
        let ids: Vec<&str> = registry.ids().collect();
        assert_eq!(
            ids,
            vec!["empty", "general-content", "portfolio", "saas-pro", "superclips"]
        );
    }

    #[test]
    fn test_slot_for_resolves_loop_ids() {
        let registry = TemplateRegistry::with_builtin().unwrap();
        let portfolio = registry.get("portfolio").unwrap();

        let avatar = portfolio.slot_for("pt-test-avatar-2").unwrap();
        assert_eq!(avatar.id, "pt-test-avatar-2");
        assert_eq!(avatar.kind, SlotKind::Image);
        assert!(avatar.default.ends_with("query=avatar%202"));

        // Outside the 1..3 loop, or written differently than rendered.
        assert!(portfolio.slot_for("pt-test-avatar-9").is_none());
        assert!(portfolio.slot_for("pt-test-avatar-02").is_none());
        assert!(portfolio.slot_for("pt-test-avatar-").is_none());

        // Literal ids still resolve directly.
        assert_eq!(
            portfolio.slot_for("pt-test-avatar-{n}").unwrap().id,
            "pt-test-avatar-{n}"
        );
    }

    #[test]
    fn test_slot_for_nested_placeholders() {
        let def = TemplateDefinition::from_files(
            "t",
            &files(
                "id: t\nname: T\nslots:\n  - { id: \"cell-{r}-{c}\", kind: text, default: \"R{r}C{c}\" }\n",
                "$for(r in 1..2)$$for(c in 10..12)$$text(cell-{r}-{c})$$endfor$$endfor$",
            ),
        )
        .unwrap();

        let spec = def.slot_for("cell-2-11").unwrap();
        assert_eq!(spec.default, "R2C11");
        assert!(def.slot_for("cell-3-11").is_none());
        assert!(def.slot_for("cell-1-9").is_none());
        assert!(def.slot_for("cell-1").is_none());
    }
}
