/*
 * export.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Export pipeline.
//!
//! `(template, content map, project name, theme)` goes in, one standalone HTML
//! document comes out. The output depends on nothing else: no timestamps, no
//! generated ids, and content maps iterate in key order, so exporting the
//! same project twice gives byte-identical files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pagesmith_content::ContentMap;

use crate::context::{RenderContext, RenderOptions};
use crate::document::document_shell;
use crate::error::ExportResult;
use crate::registry::{TemplateDefinition, TemplateRegistry};

/// Extension appended to exported file names.
pub const HTML_EXTENSION: &str = ".html";

/// Inputs of one export.
#[derive(Debug, Clone, Copy)]
pub struct ExportRequest<'a> {
    /// Template id.
    pub template: &'a str,
    pub data: &'a ContentMap,
    /// Used for the document title and the download file name.
    pub project_name: &'a str,
    /// Requested theme; unknown or missing themes use the template default.
    pub theme: Option<&'a str>,
}

impl<'a> ExportRequest<'a> {
    pub fn new(template: &'a str, data: &'a ContentMap, project_name: &'a str) -> Self {
        Self {
            template,
            data,
            project_name,
            theme: None,
        }
    }

    pub fn with_theme(mut self, theme: Option<&'a str>) -> Self {
        self.theme = theme;
        self
    }
}

/// Render options and extra head markup for the requested theme.
fn render_options(
    definition: &TemplateDefinition,
    request: &ExportRequest<'_>,
) -> (RenderOptions, String) {
    let theme = definition.manifest.theme(request.theme);
    let mut head = theme.map(|t| t.head_markup()).unwrap_or_default();
    head.push_str(&definition.manifest.head);
    let options = RenderOptions::new(request.project_name).with_theme(theme.map(|t| t.id.clone()));
    (options, head)
}

/// Render a project into a complete HTML document.
///
/// Fails with `TemplateNotFound` when the template id is not registered;
/// nothing is rendered in that case.
pub fn export_to_html(registry: &TemplateRegistry, request: &ExportRequest<'_>) -> ExportResult<String> {
    let definition = registry.require(request.template)?;
    let (options, head) = render_options(definition, request);
    let body = definition.render(request.data, &options);

    let shell = document_shell()?;
    let context = RenderContext::new(request.data, &options)
        .with_head(&head)
        .with_body(&body);
    let html = shell.render(&context);

    tracing::debug!(
        template = request.template,
        theme = options.theme.as_deref().unwrap_or(""),
        entries = request.data.len(),
        bytes = html.len(),
        "exported project"
    );
    Ok(html)
}

/// Render only the template body, as a live preview shows it.
pub fn preview_html(
    registry: &TemplateRegistry,
    request: &ExportRequest<'_>,
    editable: bool,
) -> ExportResult<String> {
    let definition = registry.require(request.template)?;
    let (options, _) = render_options(definition, request);
    let options = options.editable(editable);
    Ok(definition.render(request.data, &options))
}

/// Destination for exported files.
pub trait FileSaver {
    /// Store `contents` under `filename`, returning where it went.
    fn save(&mut self, filename: &str, contents: &str) -> io::Result<PathBuf>;
}

/// Saves files into a directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSaver for DirectorySaver {
    fn save(&mut self, filename: &str, contents: &str) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        fs::write(&path, contents)?;
        Ok(path)
    }
}

/// Hand an exported document to `saver` as `<sanitized name>.html`.
pub fn download_html(
    saver: &mut dyn FileSaver,
    html: &str,
    project_name: &str,
) -> ExportResult<PathBuf> {
    let filename = format!("{}{}", sanitize_filename(project_name), HTML_EXTENSION);
    let path = saver.save(&filename, html)?;
    tracing::info!(path = %path.display(), "saved export");
    Ok(path)
}

/// Turn a project name into a file stem.
///
/// Lowercases, collapses whitespace runs into `-`, and drops everything
/// outside `[a-z0-9_-]`. A trailing `.html` is ignored. Falls back to
/// `project` when nothing is left.
pub fn sanitize_filename(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    let stem = lower.strip_suffix(HTML_EXTENSION).unwrap_or(&lower);

    let mut out = String::with_capacity(stem.len());
    let mut in_space = false;
    for c in stem.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('-');
            }
            in_space = true;
            continue;
        }
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-' {
            out.push(c);
            in_space = false;
        }
    }

    if out.is_empty() {
        "project".to_string()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("My Landing  Page"), "my-landing-page");
        assert_eq!(sanitize_filename("Café & Co."), "caf-co");
        assert_eq!(sanitize_filename("launch_v2-final"), "launch_v2-final");
        assert_eq!(sanitize_filename("Site.HTML"), "site");
        assert_eq!(sanitize_filename("  "), "project");
        assert_eq!(sanitize_filename("../../etc/passwd"), "etcpasswd");
    }

    #[derive(Default)]
    struct RecordingSaver {
        saved: Vec<(String, String)>,
    }

    impl FileSaver for RecordingSaver {
        fn save(&mut self, filename: &str, contents: &str) -> io::Result<PathBuf> {
            self.saved.push((filename.to_string(), contents.to_string()));
            Ok(PathBuf::from(filename))
        }
    }

    #[test]
    fn test_download_uses_sanitized_name() {
        let mut saver = RecordingSaver::default();
        let path = download_html(&mut saver, "<html></html>", "Spring Sale").unwrap();
        assert_eq!(path, PathBuf::from("spring-sale.html"));
        assert_eq!(
            saver.saved,
            vec![("spring-sale.html".to_string(), "<html></html>".to_string())]
        );
    }

    #[test]
    fn test_directory_saver_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut saver = DirectorySaver::new(dir.path().join("dist"));
        let path = download_html(&mut saver, "<p>x</p>", "Demo").unwrap();
        assert_eq!(path, dir.path().join("dist").join("demo.html"));
        assert_eq!(fs::read_to_string(path).unwrap(), "<p>x</p>");
    }
}
