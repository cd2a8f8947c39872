/*
 * entities.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! HTML entity clean-up for stored text.
//!
//! Text captured from `contenteditable` elements sometimes arrives already
//! entity-encoded, and saving it again encodes it a second time
//! (`&amp;amp;`). Since the export step escapes text itself, stored text must
//! be plain; these helpers undo any encoding that slipped through.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::map::ContentMap;

/// Upper bound on decoding passes for repeatedly encoded text.
const MAX_DECODE_PASSES: usize = 5;

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});")
        .expect("entity regex is valid")
});

static ENCODED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(?:amp|lt|gt|quot|#39|nbsp);").expect("encoded regex is valid"));

/// Decode HTML entities, repeating while the text still looks encoded.
///
/// Unknown named entities are left as they are.
pub fn decode_html_entities(text: &str) -> String {
    let mut decoded = decode_once(text);
    for _ in 1..MAX_DECODE_PASSES {
        if !has_encoded_entities(&decoded) {
            break;
        }
        let next = decode_once(&decoded);
        if next == decoded {
            break;
        }
        decoded = next;
    }
    decoded
}

/// True when `text` contains one of the common encoded entities.
pub fn has_encoded_entities(text: &str) -> bool {
    ENCODED.is_match(text)
}

/// Decode the text and button labels of every entry in place.
///
/// Returns the number of entries that changed.
pub fn normalize_content_map(data: &mut ContentMap) -> usize {
    let mut changed = 0;
    for (eid, entry) in data.entries_mut() {
        let mut touched = false;
        if let Some(text) = entry.text.as_mut() {
            touched |= decode_in_place(text);
        }
        if let Some(label) = entry.button.as_mut().and_then(|b| b.text.as_mut()) {
            touched |= decode_in_place(label);
        }
        if touched {
            tracing::debug!(eid = %eid, "decoded html entities");
            changed += 1;
        }
    }
    changed
}

fn decode_in_place(text: &mut String) -> bool {
    if !ENTITY.is_match(text) {
        return false;
    }
    let decoded = decode_html_entities(text);
    if decoded == *text {
        return false;
    }
    *text = decoded;
    true
}

fn decode_once(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            let body = &caps[1];
            decode_entity(body).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(body: &str) -> Option<String> {
    if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        return u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from);
    }
    if let Some(dec) = body.strip_prefix('#') {
        return dec.parse::<u32>().ok().and_then(char::from_u32).map(String::from);
    }
    let c = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "hellip" => '…',
        "mdash" => '—',
        "ndash" => '–',
        "bull" => '•',
        _ => return None,
    };
    Some(c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::ContentValue;
    use crate::entry::{ButtonEntry, ContentEntry};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decodes_basic_entities() {
        assert_eq!(
            decode_html_entities("&lt;b&gt; &quot;hi&quot; &#39;x&#039; &#x41;"),
            "<b> \"hi\" 'x' A"
        );
    }

    #[test]
    fn test_decodes_double_encoding() {
        assert_eq!(decode_html_entities("Tom &amp;amp; Jerry"), "Tom & Jerry");
        assert_eq!(decode_html_entities("&amp;amp;lt;"), "<");
    }

    #[test]
    fn test_unknown_entities_are_kept() {
        assert_eq!(decode_html_entities("&bogus; & friends"), "&bogus; & friends");
    }

    #[test]
    fn test_has_encoded_entities() {
        assert!(has_encoded_entities("a &amp; b"));
        assert!(!has_encoded_entities("a & b"));
    }

    #[test]
    fn test_normalize_content_map() {
        let mut data = ContentMap::new();
        data.insert("plain", ContentValue::text("nothing to do").into());
        data.insert("encoded", ContentValue::text("R&amp;D").into());
        data.insert(
            "cta",
            ContentEntry {
                button: Some(ButtonEntry {
                    text: Some("Buy &amp;amp; save".to_string()),
                    url: Some("/a?b=1&amp;c=2".to_string()),
                }),
                ..Default::default()
            },
        );

        assert_eq!(normalize_content_map(&mut data), 2);
        assert_eq!(data.get_text("encoded", ""), "R&D");
        let button = data.get_button("cta", "", "");
        assert_eq!(button.text, "Buy & save");
        // urls are not touched
        assert_eq!(button.url, "/a?b=1&amp;c=2");
    }
}
