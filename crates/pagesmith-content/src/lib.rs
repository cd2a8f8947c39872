/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Editable content model for Pagesmith templates.
//!
//! Every template reads its editable slots from a [`ContentMap`]: a flat map
//! from an element id ("eid") to a [`ContentEntry`]. Reads go through the
//! accessor methods, which never fail and fall back to the caller-supplied
//! default whenever the stored data is absent, empty, or of the wrong shape:
//!
//! - [`ContentMap::get_text`]
//! - [`ContentMap::get_image`] / [`ContentMap::get_image_link`]
//! - [`ContentMap::get_button`] (text and url fall back independently)
//!
//! Writes go through a single entrypoint, [`ContentSink::on_content_change`].
//! The map itself is a sink with last-writer-wins semantics per eid.
//!
//! # Example
//!
//! ```
//! use pagesmith_content::{ContentMap, ContentSink, ContentValue};
//!
//! let mut data = ContentMap::new();
//! assert_eq!(data.get_text("hero_headline", "Welcome"), "Welcome");
//!
//! data.on_content_change("hero_headline", ContentValue::text("Hello"));
//! assert_eq!(data.get_text("hero_headline", "Welcome"), "Hello");
//! ```

pub mod edit;
pub mod entities;
pub mod entry;
pub mod error;
pub mod map;

pub use edit::{ContentSink, ContentValue};
pub use entities::{decode_html_entities, has_encoded_entities, normalize_content_map};
pub use entry::{ButtonContent, ButtonEntry, ContentEntry};
pub use error::{ContentError, ContentResult};
pub use map::ContentMap;
