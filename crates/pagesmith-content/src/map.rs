/*
 * map.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The per-project content map and its accessors.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::entry::{ButtonContent, ContentEntry};
use crate::error::{ContentError, ContentResult, json_kind};

/// Mapping from eid to stored content.
///
/// Entries are kept in key order so that serialized maps (and anything
/// rendered by walking them) are byte-for-byte reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ContentMap {
    entries: BTreeMap<String, ContentEntry>,
}

impl ContentMap {
    /// Create an empty content map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a content map from JSON text.
    ///
    /// The document itself must be a JSON object; individual entries are
    /// loaded leniently (see [`ContentMap::from_json_lenient`]).
    pub fn from_json_str(source: &str) -> ContentResult<Self> {
        let value: Value = serde_json::from_str(source)?;
        Self::from_json_value(&value)
    }

    /// Build a content map from a JSON value that must be an object (or null).
    pub fn from_json_value(value: &Value) -> ContentResult<Self> {
        match value {
            Value::Object(_) | Value::Null => Ok(Self::from_json_lenient(value)),
            other => Err(ContentError::NotAnObject {
                found: json_kind(other),
            }),
        }
    }

    /// Build a content map from any JSON value without failing.
    ///
    /// Non-object documents yield an empty map, non-object entries are
    /// skipped, and wrongly typed fields inside an entry are ignored.
    pub fn from_json_lenient(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::new();
        };

        let mut entries = BTreeMap::new();
        for (eid, raw) in object {
            match ContentEntry::from_json_lenient(raw) {
                Some(entry) => {
                    entries.insert(eid.clone(), entry);
                }
                None => {
                    tracing::debug!(eid = %eid, "skipping malformed content entry");
                }
            }
        }
        Self { entries }
    }

    /// Convert to a JSON value in the editor's wire shape.
    pub fn to_json_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Text for `eid`, or `default` when none is stored.
    pub fn get_text<'a>(&'a self, eid: &str, default: &'a str) -> &'a str {
        self.entries
            .get(eid)
            .and_then(|e| non_empty(&e.text))
            .unwrap_or(default)
    }

    /// Image source for `eid`, or `default` when none is stored.
    pub fn get_image<'a>(&'a self, eid: &str, default: &'a str) -> &'a str {
        self.entries
            .get(eid)
            .and_then(|e| non_empty(&e.image))
            .unwrap_or(default)
    }

    /// Click-through link of the image at `eid`, or `""`.
    pub fn get_image_link(&self, eid: &str) -> &str {
        self.entries
            .get(eid)
            .and_then(|e| non_empty(&e.link_url))
            .unwrap_or("")
    }

    /// Button at `eid`.
    ///
    /// Text and url fall back independently: a saved button may carry a
    /// custom url while keeping the default label.
    pub fn get_button(&self, eid: &str, default_text: &str, default_url: &str) -> ButtonContent {
        let button = self.entries.get(eid).and_then(|e| e.button.as_ref());
        ButtonContent {
            text: button
                .and_then(|b| non_empty(&b.text))
                .unwrap_or(default_text)
                .to_string(),
            url: button
                .and_then(|b| non_empty(&b.url))
                .unwrap_or(default_url)
                .to_string(),
        }
    }

    /// Raw stored entry.
    pub fn get(&self, eid: &str) -> Option<&ContentEntry> {
        self.entries.get(eid)
    }

    /// Replace the entry stored under `eid`.
    pub fn insert(&mut self, eid: impl Into<String>, entry: ContentEntry) -> Option<ContentEntry> {
        self.entries.insert(eid.into(), entry)
    }

    /// Remove the entry stored under `eid`.
    pub fn remove(&mut self, eid: &str) -> Option<ContentEntry> {
        self.entries.remove(eid)
    }

    pub fn contains(&self, eid: &str) -> bool {
        self.entries.contains_key(eid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in eid order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContentEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = (&String, &mut ContentEntry)> {
        self.entries.iter_mut()
    }
}

/// Stored strings that are empty count as absent.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl<'de> Deserialize<'de> for ContentMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json_value(&value).map_err(serde::de::Error::custom)
    }
}

impl FromIterator<(String, ContentEntry)> for ContentMap {
    fn from_iter<I: IntoIterator<Item = (String, ContentEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
