//! Change analysis collaborator
//!
//! The analyzer inspects the source repository between two releases and
//! deposits its findings as a JSON array in the run's working directory.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{ReleasePostError, Result};

pub mod command;

pub use command::CommandAnalyzer;

/// Well-known name of the analyzer's output file.
pub const CHANGES_FILE: &str = "changes.json";

/// Arguments handed to the analyzer for one release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Ref whose contents are analyzed
    pub compare: String,
    /// Version the changes are attributed to
    pub since: String,
    /// Repository the refs live in
    pub source: String,
    /// Ref the comparison starts from
    pub base: String,
}

impl AnalysisRequest {
    /// Request for `current` against `base` in `source`
    pub fn new(current: &str, base: &str, source: &str) -> Self {
        AnalysisRequest {
            compare: current.to_string(),
            since: current.to_string(),
            source: source.to_string(),
            base: base.to_string(),
        }
    }
}

pub trait Analyzer {
    /// Run the analysis, leaving its output file inside `workdir`.
    fn analyze(&self, request: &AnalysisRequest, workdir: &Path) -> Result<()>;
}

/// Read the analyzer output file as a list of raw change entries.
///
/// A missing file, unreadable file, invalid JSON or a non-array document all
/// mean the analysis is unavailable. Entry shapes are checked later.
pub fn load_changes(path: &Path) -> Result<Vec<Value>> {
    let unavailable = |reason: String| ReleasePostError::AnalysisUnavailable {
        path: path.to_path_buf(),
        reason,
    };

    let content = fs::read_to_string(path).map_err(|e| unavailable(e.to_string()))?;
    let document: Value =
        serde_json::from_str(&content).map_err(|e| unavailable(format!("invalid JSON: {}", e)))?;

    match document {
        Value::Array(entries) => Ok(entries),
        _ => Err(unavailable("expected a JSON array of changes".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_request_uses_current_twice() {
        let request = AnalysisRequest::new("6.8.0", "6.7.0", "https://example.com/repo.git");
        assert_eq!(request.compare, "6.8.0");
        assert_eq!(request.since, "6.8.0");
        assert_eq!(request.base, "6.7.0");
    }

    #[test]
    fn test_load_changes_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CHANGES_FILE);
        fs::write(&path, r#"[{"category": "fix"}, {"category": "feature"}]"#).unwrap();

        assert_eq!(load_changes(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_load_changes_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_changes(&dir.path().join(CHANGES_FILE)).unwrap_err();
        assert!(matches!(err, ReleasePostError::AnalysisUnavailable { .. }));
    }

    #[test]
    fn test_load_changes_rejects_non_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CHANGES_FILE);

        fs::write(&path, r#"{"category": "fix"}"#).unwrap();
        assert!(matches!(
            load_changes(&path).unwrap_err(),
            ReleasePostError::AnalysisUnavailable { .. }
        ));

        fs::write(&path, "not json").unwrap();
        let err = load_changes(&path).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }
}
