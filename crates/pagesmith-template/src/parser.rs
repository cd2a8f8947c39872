/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Slot template parser.
//!
//! Templates are HTML with `$...$` directives. The parser is a single
//! left-to-right scan: literal text is copied into `Literal` nodes, each
//! directive becomes a node, and block directives (`$if$`, `$for$`) are
//! matched with a stack. While scanning literals the parser also tracks
//! whether it is inside a tag, so that slots know if they were written as
//! element content or inside an attribute.

use std::mem;

use crate::ast::{
    Comment, Conditional, Literal, Placement, Repeat, SlotField, SlotRef, SourcePos, TemplateNode,
    Variable,
};
use crate::error::{TemplateError, TemplateResult};

/// Upper bound on the number of iterations of a single `$for$` loop.
pub const MAX_REPEAT: i64 = 100;

/// A compiled template ready for evaluation.
#[derive(Debug, Clone)]
pub struct Template {
    /// The parsed template AST.
    pub(crate) nodes: Vec<TemplateNode>,

    /// Name used in diagnostics (file name or template id).
    pub(crate) name: String,
}

impl Template {
    /// Compile a template from source text.
    pub fn compile(source: &str) -> TemplateResult<Self> {
        Self::compile_with_filename(source, "<template>")
    }

    /// Compile a template from source text with a filename for diagnostics.
    ///
    /// `$head$` and `$body$` are rejected; they only exist in the document
    /// shell.
    pub fn compile_with_filename(source: &str, filename: &str) -> TemplateResult<Self> {
        let nodes = Parser::new(source, false).parse()?;
        Ok(Self {
            nodes,
            name: filename.to_string(),
        })
    }

    /// Compile a document shell, which may use `$head$` and `$body$`.
    pub fn compile_shell(source: &str, filename: &str) -> TemplateResult<Self> {
        let nodes = Parser::new(source, true).parse()?;
        Ok(Self {
            nodes,
            name: filename.to_string(),
        })
    }

    /// The parsed nodes.
    pub fn nodes(&self) -> &[TemplateNode] {
        &self.nodes
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// An open block awaiting its closing directive.
#[derive(Debug)]
enum Block {
    If {
        condition: SlotRef,
        /// Set once `$else$` has been seen.
        then_branch: Option<Vec<TemplateNode>>,
        pos: SourcePos,
    },
    For {
        var: String,
        start: i64,
        end: i64,
        pos: SourcePos,
    },
}

impl Block {
    fn describe(&self) -> &'static str {
        match self {
            Block::If { .. } => "$if$",
            Block::For { .. } => "$for$",
        }
    }

    fn pos(&self) -> SourcePos {
        match self {
            Block::If { pos, .. } | Block::For { pos, .. } => *pos,
        }
    }
}

struct Parser<'a> {
    source: &'a str,
    /// Whether shell-only variables are allowed.
    shell: bool,
    in_tag: bool,
    loop_vars: Vec<String>,
    stack: Vec<(Block, Vec<TemplateNode>)>,
    current: Vec<TemplateNode>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, shell: bool) -> Self {
        Self {
            source,
            shell,
            in_tag: false,
            loop_vars: Vec::new(),
            stack: Vec::new(),
            current: Vec::new(),
        }
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> TemplateError {
        let pos = SourcePos::at(self.source, offset);
        error_at_pos(pos, message)
    }

    fn parse(mut self) -> TemplateResult<Vec<TemplateNode>> {
        let source = self.source;
        let bytes = source.as_bytes();
        let mut literal_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'<' => {
                    let next = bytes.get(i + 1).copied().unwrap_or(b' ');
                    if next.is_ascii_alphabetic() || next == b'/' || next == b'!' {
                        self.in_tag = true;
                    }
                    i += 1;
                }
                b'>' => {
                    self.in_tag = false;
                    i += 1;
                }
                b'$' => {
                    self.push_literal(literal_start, i);
                    let rest = &source[i + 1..];

                    if rest.starts_with('$') {
                        self.push_text("$", i);
                        i += 2;
                    } else if let Some(comment) = rest.strip_prefix("--") {
                        let line_len = comment.find('\n').map_or(comment.len(), |n| n + 1);
                        self.current.push(TemplateNode::Comment(Comment {
                            text: comment[..line_len].trim().to_string(),
                            pos: SourcePos::at(source, i),
                        }));
                        i += 3 + line_len;
                    } else {
                        let Some(len) = rest.find(['$', '\n']) else {
                            return Err(self.error_at(i, "unterminated directive"));
                        };
                        if rest.as_bytes()[len] == b'\n' {
                            return Err(self.error_at(i, "unterminated directive"));
                        }
                        let directive = rest[..len].trim();
                        self.directive(directive, i)?;
                        i += len + 2;
                    }
                    literal_start = i;
                }
                _ => i += 1,
            }
        }
        self.push_literal(literal_start, bytes.len());

        if let Some((block, _)) = self.stack.pop() {
            return Err(error_at_pos(
                block.pos(),
                format!("{} is never closed", block.describe()),
            ));
        }
        Ok(self.current)
    }

    fn push_literal(&mut self, start: usize, end: usize) {
        if start < end {
            let text = &self.source[start..end];
            self.push_text(text, start);
        }
    }

    /// Append literal text, merging with a preceding literal.
    fn push_text(&mut self, text: &str, offset: usize) {
        if let Some(TemplateNode::Literal(last)) = self.current.last_mut() {
            last.text.push_str(text);
            return;
        }
        self.current.push(TemplateNode::Literal(Literal {
            text: text.to_string(),
            pos: SourcePos::at(self.source, offset),
        }));
    }

    fn directive(&mut self, directive: &str, offset: usize) -> TemplateResult<()> {
        let pos = SourcePos::at(self.source, offset);

        match directive {
            "title" => {
                self.current
                    .push(TemplateNode::Variable(Variable::Title, pos));
                return Ok(());
            }
            "theme" => {
                self.current.push(TemplateNode::Variable(Variable::Theme, pos));
                return Ok(());
            }
            "head" | "body" if !self.shell => {
                return Err(self.error_at(
                    offset,
                    format!("${directive}$ is only available in the document shell"),
                ));
            }
            "head" => {
                self.current.push(TemplateNode::Variable(Variable::Head, pos));
                return Ok(());
            }
            "body" => {
                self.current.push(TemplateNode::Variable(Variable::Body, pos));
                return Ok(());
            }
            "else" => return self.else_branch(offset),
            "endif" => return self.end_if(offset),
            "endfor" => return self.end_for(offset),
            "" => return Err(self.error_at(offset, "empty directive")),
            _ => {}
        }

        if let Some(inner) = call_argument(directive, "if") {
            let condition = self.slot_ref(inner, offset)?;
            let parent = mem::take(&mut self.current);
            self.stack.push((
                Block::If {
                    condition,
                    then_branch: None,
                    pos,
                },
                parent,
            ));
            return Ok(());
        }

        if let Some(inner) = call_argument(directive, "for") {
            let (var, start, end) = self.loop_header(inner, offset)?;
            self.loop_vars.push(var.clone());
            let parent = mem::take(&mut self.current);
            self.stack.push((
                Block::For {
                    var,
                    start,
                    end,
                    pos,
                },
                parent,
            ));
            return Ok(());
        }

        if self.loop_vars.iter().any(|v| v == directive) {
            self.current
                .push(TemplateNode::Index(directive.to_string(), pos));
            return Ok(());
        }

        let slot = self.slot_ref(directive, offset)?;
        self.current.push(TemplateNode::Slot(slot));
        Ok(())
    }

    fn else_branch(&mut self, offset: usize) -> TemplateResult<()> {
        let slot = match self.stack.last_mut() {
            Some((Block::If { then_branch, .. }, _)) => then_branch,
            _ => return Err(self.error_at(offset, "$else$ without matching $if$")),
        };
        if slot.is_some() {
            return Err(self.error_at(offset, "duplicate $else$"));
        }
        *slot = Some(mem::take(&mut self.current));
        Ok(())
    }

    fn end_if(&mut self, offset: usize) -> TemplateResult<()> {
        let (condition, then_branch, pos, parent) = match self.stack.pop() {
            Some((
                Block::If {
                    condition,
                    then_branch,
                    pos,
                },
                parent,
            )) => (condition, then_branch, pos, parent),
            other => {
                self.stack.extend(other);
                return Err(self.error_at(offset, "$endif$ without matching $if$"));
            }
        };

        let body = mem::replace(&mut self.current, parent);
        let (then_branch, else_branch) = match then_branch {
            Some(then_branch) => (then_branch, Some(body)),
            None => (body, None),
        };
        self.current.push(TemplateNode::Conditional(Conditional {
            condition,
            then_branch,
            else_branch,
            pos,
        }));
        Ok(())
    }

    fn end_for(&mut self, offset: usize) -> TemplateResult<()> {
        let (var, start, end, pos, parent) = match self.stack.pop() {
            Some((
                Block::For {
                    var,
                    start,
                    end,
                    pos,
                },
                parent,
            )) => (var, start, end, pos, parent),
            other => {
                self.stack.extend(other);
                return Err(self.error_at(offset, "$endfor$ without matching $for$"));
            }
        };
        self.loop_vars.pop();

        let body = mem::replace(&mut self.current, parent);
        self.current.push(TemplateNode::Repeat(Repeat {
            var,
            start,
            end,
            body,
            pos,
        }));
        Ok(())
    }

    /// Parse `field(eid)`.
    fn slot_ref(&self, text: &str, offset: usize) -> TemplateResult<SlotRef> {
        let Some(paren) = text.find('(') else {
            return Err(self.error_at(offset, format!("unknown directive '{}'", text)));
        };
        let name = text[..paren].trim();
        let Some(field) = SlotField::from_directive(name) else {
            return Err(self.error_at(offset, format!("unknown directive '{}'", name)));
        };
        let Some(eid) = call_argument(text, name) else {
            return Err(self.error_at(offset, format!("malformed slot reference '{}'", text)));
        };
        self.check_eid(eid, offset)?;

        Ok(SlotRef {
            field,
            eid: eid.to_string(),
            placement: if self.in_tag {
                Placement::Attribute
            } else {
                Placement::Content
            },
            pos: SourcePos::at(self.source, offset),
        })
    }

    fn check_eid(&self, eid: &str, offset: usize) -> TemplateResult<()> {
        if eid.is_empty() {
            return Err(self.error_at(offset, "empty slot id"));
        }
        if let Some(bad) = eid
            .chars()
            .find(|c| c.is_whitespace() || matches!(c, '(' | ')' | '$' | '"' | '\'' | '<' | '>'))
        {
            return Err(self.error_at(
                offset,
                format!("invalid character {:?} in slot id '{}'", bad, eid),
            ));
        }

        let mut rest = eid;
        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                return Err(self.error_at(offset, format!("unclosed '{{' in slot id '{}'", eid)));
            };
            let var = &after[..close];
            if !self.loop_vars.iter().any(|v| v == var) {
                return Err(self.error_at(
                    offset,
                    format!("unknown loop variable '{}' in slot id '{}'", var, eid),
                ));
            }
            rest = &after[close + 1..];
        }
        Ok(())
    }

    /// Parse `var in start..end`.
    fn loop_header(&self, text: &str, offset: usize) -> TemplateResult<(String, i64, i64)> {
        let parts: Vec<&str> = text.split_whitespace().collect();
        let [var, "in", range] = parts.as_slice() else {
            return Err(self.error_at(offset, "expected $for(var in start..end)$"));
        };
        if !is_identifier(var) {
            return Err(self.error_at(offset, format!("invalid loop variable '{}'", var)));
        }
        if self.loop_vars.iter().any(|v| v == var) {
            return Err(self.error_at(offset, format!("loop variable '{}' is already in use", var)));
        }

        let bounds = range
            .split_once("..")
            .and_then(|(a, b)| Some((a.parse::<i64>().ok()?, b.parse::<i64>().ok()?)));
        let Some((start, end)) = bounds else {
            return Err(self.error_at(offset, format!("invalid range '{}'", range)));
        };
        if start > end {
            return Err(self.error_at(offset, format!("empty range '{}'", range)));
        }
        let iterations = end.checked_sub(start).and_then(|span| span.checked_add(1));
        if !matches!(iterations, Some(n) if n <= MAX_REPEAT) {
            return Err(self.error_at(
                offset,
                format!("range '{}' exceeds {} iterations", range, MAX_REPEAT),
            ));
        }
        Ok((var.to_string(), start, end))
    }
}

fn error_at_pos(pos: SourcePos, message: impl Into<String>) -> TemplateError {
    TemplateError::ParseError {
        message: message.into(),
        line: pos.line,
        column: pos.column,
    }
}

/// `name(arg)` → `arg`, trimmed.
fn call_argument<'t>(text: &'t str, name: &str) -> Option<&'t str> {
    text.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
        .map(str::trim)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
