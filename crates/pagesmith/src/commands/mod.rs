/*
 * mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! CLI command implementations

pub mod edit;
pub mod export;
pub mod link;
pub mod new;
pub mod projects;
pub mod share;
pub mod slots;
pub mod templates;
pub mod view;

use std::path::{Path, PathBuf};

/// How a command argument names a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectRef {
    /// A standalone project JSON file.
    File(PathBuf),
    /// A project id in the configured store.
    Stored(String),
}

impl ProjectRef {
    /// Existing files win over store ids.
    pub fn parse(arg: &str) -> Self {
        let path = Path::new(arg);
        if path.is_file() {
            ProjectRef::File(path.to_path_buf())
        } else {
            ProjectRef::Stored(arg.to_string())
        }
    }
}
