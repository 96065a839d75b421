//! Read-only handling of unified diff documents.
//!
//! - `patch` - splitting a diff into per-file fragments (pure)
//! - [`FileDiffSource`] - a diff document loaded from disk instead of a repository

use std::fs;
use std::path::PathBuf;

use crate::domain::Version;
use crate::error::Result;
use crate::git::DiffSource;

pub mod patch;

pub use patch::{extract_fragments, filename_of, template_path_pattern, PatchFragment, DIFF_MARKER};

/// Serves a pre-generated diff file regardless of the requested versions.
#[derive(Debug, Clone)]
pub struct FileDiffSource {
    path: PathBuf,
}

impl FileDiffSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileDiffSource { path: path.into() }
    }
}

impl DiffSource for FileDiffSource {
    fn diff(&self, _previous: &Version, _current: &Version) -> Result<String> {
        Ok(fs::read_to_string(&self.path)?)
    }
}
