/*
 * evaluator.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template evaluation.
//!
//! Evaluation walks the AST and appends to a single output buffer. Every slot
//! goes through the content accessors with its manifest default, so the
//! preview and the exported page always agree. Evaluation cannot fail: an
//! absent or malformed content entry simply renders the default.

use std::borrow::Cow;

use crate::ast::{Conditional, Placement, Repeat, SlotField, SlotRef, TemplateNode, Variable};
use crate::context::RenderContext;
use crate::escape::escape_html;
use crate::parser::Template;

impl Template {
    /// Render this template with the given context.
    pub fn render(&self, context: &RenderContext<'_>) -> String {
        let mut out = String::new();
        render_nodes(&self.nodes, context, &mut out);
        out
    }
}

/// Render a list of nodes into `out`.
pub fn render_nodes(nodes: &[TemplateNode], context: &RenderContext<'_>, out: &mut String) {
    for node in nodes {
        render_node(node, context, out);
    }
}

fn render_node(node: &TemplateNode, context: &RenderContext<'_>, out: &mut String) {
    match node {
        TemplateNode::Literal(literal) => out.push_str(&literal.text),

        TemplateNode::Slot(slot) => render_slot(slot, context, out),

        TemplateNode::Variable(var, _) => match var {
            Variable::Title => out.push_str(&escape_html(&context.options().title)),
            Variable::Theme => {
                if let Some(theme) = &context.options().theme {
                    out.push_str(&escape_html(theme));
                }
            }
            Variable::Head => out.push_str(context.head()),
            Variable::Body => out.push_str(context.body()),
        },

        TemplateNode::Index(var, _) => {
            if let Some(value) = context.index(var) {
                out.push_str(&value.to_string());
            }
        }

        TemplateNode::Conditional(Conditional {
            condition,
            then_branch,
            else_branch,
            ..
        }) => {
            if !resolve_slot(condition, context).is_empty() {
                render_nodes(then_branch, context, out);
            } else if let Some(else_branch) = else_branch {
                render_nodes(else_branch, context, out);
            }
        }

        TemplateNode::Repeat(Repeat {
            var,
            start,
            end,
            body,
            ..
        }) => {
            for i in *start..=*end {
                let child = context.child(var, i);
                render_nodes(body, &child, out);
            }
        }

        TemplateNode::Comment(_) => {}
    }
}

fn render_slot(slot: &SlotRef, context: &RenderContext<'_>, out: &mut String) {
    let value = escape_html(&resolve_slot(slot, context));

    if context.options().editable && slot.placement == Placement::Content {
        let eid = context.expand(&slot.eid);
        out.push_str("<span data-eid=\"");
        out.push_str(&escape_html(&eid));
        out.push_str("\" data-kind=\"");
        out.push_str(slot.field.kind().as_str());
        out.push_str("\">");
        out.push_str(&value);
        out.push_str("</span>");
    } else {
        out.push_str(&value);
    }
}

/// Resolve one slot field to its unescaped value.
///
/// Defaults come from the manifest entry declared under the slot id as
/// written in the template (placeholders included), expanded with the loop
/// indices in scope.
pub fn resolve_slot(slot: &SlotRef, context: &RenderContext<'_>) -> String {
    let eid = context.expand(&slot.eid);
    let spec = context.manifest().and_then(|m| m.slot(&slot.eid));

    let default: Cow<'_, str> = spec.map_or(Cow::Borrowed(""), |s| context.expand(&s.default));
    let content = context.content();

    match slot.field {
        SlotField::Text => content.get_text(&eid, &default).to_string(),
        SlotField::Image => content.get_image(&eid, &default).to_string(),
        SlotField::Link => {
            let link = content.get_image_link(&eid);
            if link.is_empty() {
                spec.map_or(String::new(), |s| context.expand(&s.default_link).into_owned())
            } else {
                link.to_string()
            }
        }
        SlotField::ButtonText | SlotField::ButtonUrl => {
            let default_url = spec.map_or(Cow::Borrowed("#"), |s| context.expand(&s.default_url));
            let button = content.get_button(&eid, &default, &default_url);
            if slot.field == SlotField::ButtonText {
                button.text
            } else {
                button.url
            }
        }
    }
}
