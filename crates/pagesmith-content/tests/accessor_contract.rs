/*
 * accessor_contract.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Behaviour of the content accessors and edit entrypoint as seen by templates.
 */

use pagesmith_content::{ButtonContent, ContentMap, ContentSink, ContentValue};
use pretty_assertions::assert_eq;
use serde_json::json;

const EIDS: &[&str] = &["hero_headline", "nav-1", "pt-test-quote-3", "", "ünïcode"];

#[test]
fn test_empty_map_always_returns_default() {
    let data = ContentMap::new();
    for eid in EIDS {
        for default in ["", "Default", "<b>raw</b>"] {
            assert_eq!(data.get_text(eid, default), default);
            assert_eq!(data.get_image(eid, default), default);
        }
    }
}

#[test]
fn test_stored_text_is_returned() {
    for eid in EIDS {
        for stored in ["v", "Hello, world", "multi\nline"] {
            let data = ContentMap::from_json_value(&json!({ *eid: { "text": stored } })).unwrap();
            assert_eq!(data.get_text(eid, "X"), stored);
        }
    }
}

#[test]
fn test_button_url_only_keeps_default_text() {
    let data = ContentMap::from_json_value(&json!({ "cta": { "button": { "url": "u" } } })).unwrap();
    assert_eq!(
        data.get_button("cta", "T", "U"),
        ButtonContent {
            text: "T".to_string(),
            url: "u".to_string(),
        }
    );
}

#[test]
fn test_saved_project_document_loads_leniently() {
    let source = r#"{
        "headline": { "text": "Saved headline" },
        "hero_image": { "image": "https://cdn.example.com/hero.jpg", "linkUrl": 7 },
        "cta_button": { "button": { "text": "Start now", "url": "/start" } },
        "stray": 12
    }"#;

    let data = ContentMap::from_json_str(source).unwrap();
    assert_eq!(data.len(), 3);
    assert_eq!(data.get_text("headline", ""), "Saved headline");
    assert_eq!(
        data.get_image("hero_image", ""),
        "https://cdn.example.com/hero.jpg"
    );
    assert_eq!(data.get_image_link("hero_image"), "");
    assert_eq!(data.get_button("cta_button", "", "").url, "/start");
}

#[test]
fn test_edits_from_json_payloads() {
    let mut data = ContentMap::new();
    let payloads = [
        ("headline", json!({ "text": "New headline" })),
        ("hero_image", json!({ "image": "/new.jpg", "linkUrl": "/shop" })),
        ("cta_button", json!({ "button": { "text": "Buy", "url": "/buy" } })),
    ];
    for (eid, payload) in &payloads {
        let value = ContentValue::from_json(eid, payload).unwrap();
        data.on_content_change(eid, value);
    }

    assert_eq!(data.get_text("headline", ""), "New headline");
    assert_eq!(data.get_image_link("hero_image"), "/shop");
    assert_eq!(data.get_button("cta_button", "", "").text, "Buy");

    assert_eq!(
        data.to_json_value(),
        json!({
            "cta_button": { "button": { "text": "Buy", "url": "/buy" } },
            "headline": { "text": "New headline" },
            "hero_image": { "image": "/new.jpg", "linkUrl": "/shop" }
        })
    );
}
