/*
 * ast.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template AST types.
//!
//! This module defines the abstract syntax tree for parsed slot templates.
//! Each node carries the position it was parsed from, for error reporting
//! during validation against a manifest.

use crate::manifest::SlotKind;

/// A position in template source (1-based line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourcePos {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl SourcePos {
    /// Compute the position of a byte offset in `source`.
    pub fn at(source: &str, offset: usize) -> Self {
        let before = &source[..offset.min(source.len())];
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(nl) => before[nl + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        Self {
            offset,
            line,
            column,
        }
    }
}

/// A node in the template AST.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateNode {
    /// Literal text to be output as-is.
    Literal(Literal),

    /// Content slot: `$text(eid)$`, `$image(eid)$`, `$button.url(eid)$`, ...
    Slot(SlotRef),

    /// Document-level variable: `$title$`, `$theme$`, `$head$`, `$body$`
    Variable(Variable, SourcePos),

    /// Loop index: `$n$` inside `$for(n in 1..3)$`
    Index(String, SourcePos),

    /// Conditional block: `$if(link(eid))$...$else$...$endif$`
    Conditional(Conditional),

    /// Counted loop: `$for(n in 1..3)$...$endfor$`
    Repeat(Repeat),

    /// Comment (not rendered): `$-- comment`
    Comment(Comment),
}

/// Literal text node.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub text: String,
    pub pos: SourcePos,
}

/// Which field of a slot a directive reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotField {
    Text,
    Image,
    Link,
    ButtonText,
    ButtonUrl,
}

impl SlotField {
    /// Parse a directive name (`text`, `image`, `link`, `button.text`, `button.url`).
    pub fn from_directive(name: &str) -> Option<Self> {
        match name {
            "text" => Some(SlotField::Text),
            "image" => Some(SlotField::Image),
            "link" => Some(SlotField::Link),
            "button.text" => Some(SlotField::ButtonText),
            "button.url" => Some(SlotField::ButtonUrl),
            _ => None,
        }
    }

    /// The directive name as written in templates.
    pub fn directive(&self) -> &'static str {
        match self {
            SlotField::Text => "text",
            SlotField::Image => "image",
            SlotField::Link => "link",
            SlotField::ButtonText => "button.text",
            SlotField::ButtonUrl => "button.url",
        }
    }

    /// The slot kind this field belongs to.
    pub fn kind(&self) -> SlotKind {
        match self {
            SlotField::Text => SlotKind::Text,
            SlotField::Image | SlotField::Link => SlotKind::Image,
            SlotField::ButtonText | SlotField::ButtonUrl => SlotKind::Button,
        }
    }
}

/// Where in the HTML a slot was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Between tags, as element content.
    Content,
    /// Inside a tag, e.g. an attribute value.
    Attribute,
}

/// A reference to one field of a content slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotRef {
    pub field: SlotField,
    /// Slot id as written; may contain loop placeholders like `{n}`.
    pub eid: String,
    pub placement: Placement,
    pub pos: SourcePos,
}

/// Document-level variables, filled by the export pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variable {
    /// Project name (escaped).
    Title,
    /// Id of the theme being rendered (empty for unthemed templates).
    Theme,
    /// Extra head markup declared by the template manifest.
    Head,
    /// Rendered page body.
    Body,
}

/// Conditional block: `$if(slot)$...$else$...$endif$`
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    /// Slot whose resolved value decides the branch.
    pub condition: SlotRef,
    pub then_branch: Vec<TemplateNode>,
    pub else_branch: Option<Vec<TemplateNode>>,
    pub pos: SourcePos,
}

/// Counted loop: `$for(var in start..end)$...$endfor$`, both bounds inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct Repeat {
    pub var: String,
    pub start: i64,
    pub end: i64,
    pub body: Vec<TemplateNode>,
    pub pos: SourcePos,
}

/// Comment (not rendered).
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub text: String,
    pub pos: SourcePos,
}

/// Visit every slot reference in `nodes`, including conditions and loop bodies.
pub fn walk_slots<'a>(nodes: &'a [TemplateNode], visit: &mut dyn FnMut(&'a SlotRef)) {
    for node in nodes {
        match node {
            TemplateNode::Slot(slot) => visit(slot),
            TemplateNode::Conditional(cond) => {
                visit(&cond.condition);
                walk_slots(&cond.then_branch, visit);
                if let Some(else_branch) = &cond.else_branch {
                    walk_slots(else_branch, visit);
                }
            }
            TemplateNode::Repeat(repeat) => walk_slots(&repeat.body, visit),
            TemplateNode::Literal(_)
            | TemplateNode::Variable(..)
            | TemplateNode::Index(..)
            | TemplateNode::Comment(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_pos() {
        let source = "ab\ncd$x$";
        assert_eq!(
            SourcePos::at(source, 0),
            SourcePos {
                offset: 0,
                line: 1,
                column: 1
            }
        );
        let pos = SourcePos::at(source, 5);
        assert_eq!((pos.line, pos.column), (2, 3));
    }

    #[test]
    fn test_slot_field_roundtrip() {
        for name in ["text", "image", "link", "button.text", "button.url"] {
            let field = SlotField::from_directive(name).unwrap();
            assert_eq!(field.directive(), name);
        }
        assert_eq!(SlotField::from_directive("video"), None);
    }

    #[test]
    fn test_field_kinds() {
        assert_eq!(SlotField::Link.kind(), SlotKind::Image);
        assert_eq!(SlotField::ButtonUrl.kind(), SlotKind::Button);
        assert_eq!(SlotField::Text.kind(), SlotKind::Text);
    }
}
