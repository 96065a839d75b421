use crate::domain::Version;
use crate::error::{ReleasePostError, Result};

/// Tag naming pattern used to find a release in version control
/// (e.g. `"{version}"`, `"v{version}"`, `"release-{version}"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPattern {
    pattern: String,
}

impl TagPattern {
    /// Create a tag pattern, requiring exactly one `{version}` placeholder
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        if pattern.matches("{version}").count() != 1 {
            return Err(ReleasePostError::config(format!(
                "Tag pattern '{}' should have exactly one {{version}} placeholder",
                pattern
            )));
        }
        Ok(TagPattern { pattern })
    }

    /// Format a version according to the pattern
    /// Example: pattern="v{version}", version=6.8.0 -> "v6.8.0"
    pub fn format(&self, version: &Version) -> String {
        self.pattern.replace("{version}", &version.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

impl Default for TagPattern {
    fn default() -> Self {
        TagPattern {
            pattern: "{version}".to_string(),
        }
    }
}
