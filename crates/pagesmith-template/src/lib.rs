/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Slot template engine and HTML export for Pagesmith.
//!
//! A template is HTML with `$...$` directives that read editable slots from a
//! project's content map:
//!
//! - Slots: `$text(eid)$`, `$image(eid)$`, `$link(eid)$`,
//!   `$button.text(eid)$`, `$button.url(eid)$`
//! - Document variables: `$title$` (and `$head$` / `$body$` in the shell)
//! - Conditionals: `$if(link(eid))$...$else$...$endif$`
//! - Counted loops: `$for(n in 1..3)$...$text(card-{n})$...$endfor$`
//! - Comments: `$-- comment`
//! - A literal dollar sign: `$$`
//!
//! Each template ships with a [`TemplateManifest`] declaring its slots,
//! their kinds, and defaults. [`TemplateRegistry`] checks the body against
//! the manifest when a template is loaded, so a template that reads an
//! undeclared slot never makes it into the registry.
//!
//! # Example
//!
//! ```ignore
//! use pagesmith_content::{ContentMap, ContentSink, ContentValue};
//! use pagesmith_template::{ExportRequest, TemplateRegistry, export_to_html};
//!
//! let registry = TemplateRegistry::with_builtin()?;
//! let mut data = ContentMap::new();
//! data.on_content_change("hero_headline", ContentValue::text("Hello"));
//!
//! let html = export_to_html(&registry, &ExportRequest::new("superclips", &data, "Launch"))?;
//! assert!(html.contains("Hello"));
//! ```

pub mod ast;
pub mod context;
pub mod document;
pub mod error;
pub mod escape;
pub mod evaluator;
pub mod export;
pub mod manifest;
pub mod parser;
pub mod registry;
pub mod source;

// Re-export main types at crate root
pub use ast::{Placement, SlotField, SlotRef, SourcePos, TemplateNode};
pub use context::{RenderContext, RenderOptions};
pub use error::{DefinitionError, ExportError, ExportResult, TemplateError, TemplateResult};
pub use escape::escape_html;
pub use export::{
    DirectorySaver, ExportRequest, FileSaver, download_html, export_to_html, preview_html,
    sanitize_filename,
};
pub use manifest::{SlotKind, SlotSpec, TemplateManifest, ThemeColors, ThemeSpec};
pub use parser::Template;
pub use registry::{TemplateDefinition, TemplateRegistry};
pub use source::{EmbeddedSource, FileSystemSource, MemorySource, TemplateFiles, TemplateSource};
