/*
 * entry.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Stored content entries.
//!
//! A [`ContentEntry`] is the storage form of one slot's content. All of its
//! fields are optional: saved projects routinely contain partial entries
//! (a button with only a custom url, an image without a link), and the
//! accessors decide field by field whether stored data is usable.
//!
//! The JSON shape matches what the editor front end writes:
//!
//! ```json
//! { "text": "Hello" }
//! { "image": "/hero.jpg", "linkUrl": "https://example.com" }
//! { "button": { "text": "Sign up", "url": "/signup" } }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stored content for one slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEntry {
    /// Text content (text slots).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Image source URL (image slots).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Optional click-through URL for an image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,

    /// Button label and target (button slots).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<ButtonEntry>,
}

/// Stored button fields; each may be missing independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A resolved button, after defaults have been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonContent {
    pub text: String,
    pub url: String,
}

impl ContentEntry {
    /// Build an entry from arbitrary JSON, keeping only well-typed fields.
    ///
    /// Returns `None` when the value is not an object. Fields holding the
    /// wrong JSON type are dropped instead of failing the whole entry.
    pub fn from_json_lenient(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self {
            text: string_field(object, "text"),
            image: string_field(object, "image"),
            link_url: string_field(object, "linkUrl"),
            button: object
                .get("button")
                .and_then(Value::as_object)
                .map(|button| ButtonEntry {
                    text: string_field(button, "text"),
                    url: string_field(button, "url"),
                }),
        })
    }

    /// True when no field holds any data.
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.image.is_none()
            && self.link_url.is_none()
            && self.button.is_none()
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}
