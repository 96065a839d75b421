use std::sync::Mutex;

use crate::domain::Version;
use crate::error::Result;
use crate::git::{ContributorSource, DiffSource};

/// Mock release history for testing without a git repository
pub struct MockRepository {
    diff: String,
    contributors: Vec<String>,
    diff_error: Option<String>,
    contributor_error: Option<String>,
    requests: Mutex<Vec<String>>,
}

impl MockRepository {
    /// Create a new mock with an empty diff and no contributors
    pub fn new() -> Self {
        MockRepository {
            diff: String::new(),
            contributors: Vec::new(),
            diff_error: None,
            contributor_error: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Set the diff returned for any release pair
    pub fn with_diff(mut self, diff: impl Into<String>) -> Self {
        self.diff = diff.into();
        self
    }

    /// Fail every diff request with `message`
    pub fn with_diff_error(mut self, message: impl Into<String>) -> Self {
        self.diff_error = Some(message.into());
        self
    }

    /// Fail every contributor lookup with `message`
    pub fn with_contributor_error(mut self, message: impl Into<String>) -> Self {
        self.contributor_error = Some(message.into());
        self
    }

    /// Add a contributor returned for any release pair
    pub fn add_contributor(&mut self, name: impl Into<String>) {
        self.contributors.push(name.into());
    }

    /// Requests served so far, e.g. `"diff 6.7.0..6.8.0"`
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    fn record(&self, entry: String) {
        if let Ok(mut log) = self.requests.lock() {
            log.push(entry);
        }
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffSource for MockRepository {
    fn diff(&self, previous: &Version, current: &Version) -> Result<String> {
        self.record(format!("diff {}..{}", previous, current));
        if let Some(message) = &self.diff_error {
            return Err(git2::Error::from_str(message).into());
        }
        Ok(self.diff.clone())
    }
}

impl ContributorSource for MockRepository {
    fn contributors(&self, current: &Version, previous: &Version) -> Result<Vec<String>> {
        self.record(format!("contributors {}..{}", previous, current));
        if let Some(message) = &self.contributor_error {
            return Err(git2::Error::from_str(message).into());
        }
        Ok(self.contributors.clone())
    }
}
