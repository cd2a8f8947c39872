/*
 * edit.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The content mutation entrypoint.
//!
//! Editors report every change as `on_content_change(eid, value)`, where the
//! value is shaped for the kind of slot being edited. Whoever receives the
//! call owns merging it into a content map and persisting it; this module
//! only defines the value type and the receiving trait.

use serde_json::Value;

use crate::entities::decode_html_entities;
use crate::entry::{ButtonEntry, ContentEntry};
use crate::error::{ContentError, ContentResult, json_kind};
use crate::map::ContentMap;

/// A complete edit for one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentValue {
    /// `{ "text": .. }`
    Text { text: String },

    /// `{ "image": .., "linkUrl": .. }`
    Image {
        image: String,
        link_url: Option<String>,
    },

    /// `{ "button": { "text": .., "url": .. } }`
    Button { text: String, url: String },
}

impl ContentValue {
    pub fn text(text: impl Into<String>) -> Self {
        ContentValue::Text { text: text.into() }
    }

    pub fn image(image: impl Into<String>) -> Self {
        ContentValue::Image {
            image: image.into(),
            link_url: None,
        }
    }

    pub fn image_with_link(image: impl Into<String>, link_url: impl Into<String>) -> Self {
        ContentValue::Image {
            image: image.into(),
            link_url: Some(link_url.into()),
        }
    }

    pub fn button(text: impl Into<String>, url: impl Into<String>) -> Self {
        ContentValue::Button {
            text: text.into(),
            url: url.into(),
        }
    }

    /// Decode an edit payload as sent by an editor front end.
    ///
    /// The shape is detected from the keys present, in the order button,
    /// image, text. Missing button fields become empty strings, which the
    /// accessors treat as "use the default".
    pub fn from_json(eid: &str, value: &Value) -> ContentResult<Self> {
        let unrecognized = |message: String| ContentError::UnrecognizedEdit {
            eid: eid.to_string(),
            message,
        };

        let object = value
            .as_object()
            .ok_or_else(|| unrecognized(format!("expected an object, found {}", json_kind(value))))?;

        if let Some(button) = object.get("button") {
            let button = button
                .as_object()
                .ok_or_else(|| unrecognized("'button' must be an object".to_string()))?;
            let field = |key: &str| {
                button
                    .get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            return Ok(ContentValue::Button {
                text: field("text"),
                url: field("url"),
            });
        }

        if let Some(image) = object.get("image").and_then(Value::as_str) {
            return Ok(ContentValue::Image {
                image: image.to_string(),
                link_url: object
                    .get("linkUrl")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            });
        }

        if let Some(text) = object.get("text").and_then(Value::as_str) {
            return Ok(ContentValue::text(text));
        }

        Err(unrecognized(
            "expected one of 'text', 'image' or 'button'".to_string(),
        ))
    }

    /// Undo HTML-entity encoding introduced by rich-text editing surfaces.
    ///
    /// Only user-visible labels are decoded; URLs are left untouched.
    pub fn normalized(self) -> Self {
        match self {
            ContentValue::Text { text } => ContentValue::Text {
                text: decode_html_entities(&text),
            },
            ContentValue::Button { text, url } => ContentValue::Button {
                text: decode_html_entities(&text),
                url,
            },
            image @ ContentValue::Image { .. } => image,
        }
    }

    /// Short name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentValue::Text { .. } => "text",
            ContentValue::Image { .. } => "image",
            ContentValue::Button { .. } => "button",
        }
    }
}

impl From<ContentValue> for ContentEntry {
    fn from(value: ContentValue) -> Self {
        match value {
            ContentValue::Text { text } => ContentEntry {
                text: Some(text),
                ..Default::default()
            },
            ContentValue::Image { image, link_url } => ContentEntry {
                image: Some(image),
                link_url,
                ..Default::default()
            },
            ContentValue::Button { text, url } => ContentEntry {
                button: Some(ButtonEntry {
                    text: Some(text),
                    url: Some(url),
                }),
                ..Default::default()
            },
        }
    }
}

/// Receiver of content edits.
///
/// Any `FnMut(&str, ContentValue)` closure is a sink, so callers can wire
/// edits straight into whatever persistence they have.
pub trait ContentSink {
    fn on_content_change(&mut self, eid: &str, value: ContentValue);
}

impl<F> ContentSink for F
where
    F: FnMut(&str, ContentValue),
{
    fn on_content_change(&mut self, eid: &str, value: ContentValue) {
        self(eid, value)
    }
}

/// Last writer wins: the edit replaces whatever was stored under `eid`.
impl ContentSink for ContentMap {
    fn on_content_change(&mut self, eid: &str, value: ContentValue) {
        tracing::debug!(eid, kind = value.kind(), "content change");
        self.insert(eid, value.normalized().into());
    }
}
