/*
 * export_pipeline.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * End-to-end tests: registry loading, export, preview and download.
 */

use std::fs;

use pagesmith_content::{ContentMap, ContentSink, ContentValue};
use pagesmith_template::{
    DefinitionError, DirectorySaver, ExportError, ExportRequest, FileSystemSource, MemorySource,
    TemplateRegistry, download_html, export_to_html, preview_html,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn registry() -> TemplateRegistry {
    TemplateRegistry::with_builtin().unwrap()
}

#[test]
fn test_export_is_deterministic() {
    let registry = registry();
    let data = ContentMap::from_json_value(&json!({
        "hero_headline": { "text": "Clip it" },
        "hero_cta": { "button": { "text": "Try", "url": "/try" } }
    }))
    .unwrap();

    for id in registry.ids() {
        let request = ExportRequest::new(id, &data, "Launch Page");
        let first = export_to_html(&registry, &request).unwrap();
        let second = export_to_html(&registry, &request).unwrap();
        assert_eq!(first, second, "export of '{}' is not deterministic", id);
    }
}

#[test]
fn test_export_with_empty_content_renders_defaults() {
    let registry = registry();
    let data = ContentMap::new();

    for definition in registry.iter() {
        let request = ExportRequest::new(definition.id(), &data, "Demo");
        let html = export_to_html(&registry, &request).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Demo</title>"));
        for directive in ["$text(", "$image(", "$link(", "$button.", "$if(", "$for(", "$title$", "$theme$"] {
            assert!(
                !html.contains(directive),
                "'{}' leaked {} into the export",
                definition.id(),
                directive
            );
        }
    }

    let html = export_to_html(&registry, &ExportRequest::new("superclips", &data, "Demo")).unwrap();
    assert!(html.contains("1 Long Video."));
    assert!(html.contains("Create Clips for Free"));

    let html = export_to_html(&registry, &ExportRequest::new("portfolio", &data, "Demo")).unwrap();
    assert!(html.contains("Project Title 3"));
    assert!(html.contains("query=avatar%202"));
    assert!(!html.contains("{n}"));
}

#[test]
fn test_unknown_template_is_an_error() {
    let registry = registry();
    let data = ContentMap::new();
    let err = export_to_html(&registry, &ExportRequest::new("no-such-template", &data, "X"))
        .unwrap_err();
    assert!(matches!(err, ExportError::TemplateNotFound { id } if id == "no-such-template"));
}

#[test]
fn test_edit_then_export() {
    let registry = registry();
    let mut data = ContentMap::new();
    data.on_content_change("hero_headline", ContentValue::text("Hello"));

    let html = export_to_html(&registry, &ExportRequest::new("superclips", &data, "Clips")).unwrap();
    assert!(html.contains(">Hello</h1>"));
    assert!(!html.contains("1 Long Video."));
}

#[test]
fn test_values_are_escaped() {
    let registry = registry();
    let mut data = ContentMap::new();
    data.on_content_change("headline", ContentValue::text("<script>alert('x')</script>"));
    data.on_content_change(
        "cta_button",
        ContentValue::button("Go", "\" onclick=\"steal()"),
    );

    let html = export_to_html(
        &registry,
        &ExportRequest::new("general-content", &data, "Tom & Jerry"),
    )
    .unwrap();
    assert!(html.contains("&lt;script&gt;alert(&#039;x&#039;)&lt;/script&gt;"));
    assert!(html.contains("href=\"&quot; onclick=&quot;steal()\""));
    assert!(html.contains("<title>Tom &amp; Jerry</title>"));
    assert!(!html.contains("<script>alert"));
}

#[test]
fn test_image_link_switches_markup() {
    let registry = registry();
    let mut data = ContentMap::new();
    let request = ExportRequest::new("general-content", &data, "P");
    let plain = export_to_html(&registry, &request).unwrap();
    assert!(!plain.contains("target=\"_blank\""));

    data.on_content_change(
        "hero_image",
        ContentValue::image_with_link("/cover.png", "https://shop.example.com"),
    );
    let request = ExportRequest::new("general-content", &data, "P");
    let linked = export_to_html(&registry, &request).unwrap();
    assert!(linked.contains("<a href=\"https://shop.example.com\" target=\"_blank\""));
    assert!(linked.contains("src=\"/cover.png\""));
}

#[test]
fn test_preview_editable_markers() {
    let registry = registry();
    let data = ContentMap::new();
    let request = ExportRequest::new("superclips", &data, "P");

    let preview = preview_html(&registry, &request, true).unwrap();
    assert!(!preview.contains("<!DOCTYPE html>"));
    assert!(preview.contains("<span data-eid=\"hero_headline\" data-kind=\"text\">1 Long Video.</span>"));

    let plain = preview_html(&registry, &request, false).unwrap();
    assert!(!plain.contains("data-eid"));
}

#[test]
fn test_filesystem_templates_override_builtin() {
    let dir = tempfile::tempdir().unwrap();
    let custom = dir.path().join("empty");
    fs::create_dir(&custom).unwrap();
    fs::write(
        custom.join("template.yml"),
        "id: empty\nname: Custom Blank\nslots:\n  - { id: note, kind: text, default: Custom }\n",
    )
    .unwrap();
    fs::write(custom.join("template.html"), "<p>$text(note)$</p>").unwrap();

    let mut registry = registry();
    let before = registry.len();
    registry.load_source(&FileSystemSource::new(dir.path())).unwrap();
    assert_eq!(registry.len(), before);
    assert_eq!(registry.get("empty").unwrap().name(), "Custom Blank");

    let data = ContentMap::new();
    let html = export_to_html(&registry, &ExportRequest::new("empty", &data, "P")).unwrap();
    assert!(html.contains("<p>Custom</p>"));
}

#[test]
fn test_invalid_templates_are_rejected() {
    let cases: [(&str, &str, fn(&DefinitionError) -> bool); 5] = [
        (
            "id: bad\nname: Bad\n",
            "$text(missing)$",
            |e| matches!(e, DefinitionError::UnknownSlot { .. }),
        ),
        (
            "id: bad\nname: Bad\nslots:\n  - { id: a, kind: text }\n",
            "$image(a)$",
            |e| matches!(e, DefinitionError::SlotKindMismatch { .. }),
        ),
        (
            "id: bad\nname: Bad\nslots:\n  - { id: a, kind: text }\n  - { id: a, kind: text }\n",
            "",
            |e| matches!(e, DefinitionError::DuplicateSlot { .. }),
        ),
        (
            "id: bad\nname: Bad\n",
            "$for(n in 1..2)$ unclosed",
            |e| matches!(e, DefinitionError::Syntax { .. }),
        ),
        (
            "id: bad\nname: Bad\n",
            "<main>$body$</main>",
            |e| matches!(e, DefinitionError::Syntax { .. }),
        ),
    ];

    for (manifest, body, check) in cases {
        let mut source = MemorySource::new();
        source.add("bad", manifest, body);
        let err = TemplateRegistry::new().load_source(&source).unwrap_err();
        assert!(check(&err), "unexpected error: {}", err);
    }
}

#[test]
fn test_themes_change_the_export() {
    let registry = registry();
    let data = ContentMap::new();
    let export = |theme: Option<&str>| {
        let request = ExportRequest::new("saas-pro", &data, "Launch").with_theme(theme);
        export_to_html(&registry, &request).unwrap()
    };

    let minimal = export(Some("modern-minimal"));
    let corporate = export(Some("corporate-blue"));
    assert_ne!(minimal, corporate);
    assert!(minimal.contains("--theme-primary: #000000;"));
    assert!(minimal.contains("data-theme=\"modern-minimal\""));
    assert!(corporate.contains("--theme-primary: #1e40af;"));
    assert!(corporate.contains("data-theme=\"corporate-blue\""));

    let dark = export(Some("elegant-dark"));
    assert!(dark.contains("background-color: #111827"));
    assert!(!corporate.contains("background-color: #111827"));

    // Unknown and missing themes both fall back to the declared default.
    let default = export(None);
    assert!(default.contains("data-theme=\"vibrant-playful\""));
    assert_eq!(export(Some("no-such-theme")), default);

    let preview = preview_html(
        &registry,
        &ExportRequest::new("saas-pro", &data, "Launch").with_theme(Some("nature-calm")),
        false,
    )
    .unwrap();
    assert!(preview.contains("data-theme=\"nature-calm\""));
}

#[test]
fn test_unthemed_templates_ignore_theme() {
    let registry = registry();
    let data = ContentMap::new();
    let plain = export_to_html(&registry, &ExportRequest::new("superclips", &data, "P")).unwrap();
    let themed = export_to_html(
        &registry,
        &ExportRequest::new("superclips", &data, "P").with_theme(Some("corporate-blue")),
    )
    .unwrap();
    assert_eq!(plain, themed);
    assert!(!plain.contains("--theme-primary"));
}

#[test]
fn test_download_to_directory() {
    let registry = registry();
    let data = ContentMap::new();
    let html = export_to_html(&registry, &ExportRequest::new("empty", &data, "My First Site")).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut saver = DirectorySaver::new(dir.path());
    let path = download_html(&mut saver, &html, "My First Site").unwrap();

    assert_eq!(path, dir.path().join("my-first-site.html"));
    assert_eq!(fs::read_to_string(&path).unwrap(), html);
}
