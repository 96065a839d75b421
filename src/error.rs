use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::Stage;

/// Which version string an [`ReleasePostError::InvalidVersion`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionRole {
    Current,
    Previous,
    /// A version parsed outside of a release run (e.g. `scan --target`).
    Unspecified,
}

impl fmt::Display for VersionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRole::Current => write!(f, "current"),
            VersionRole::Previous => write!(f, "previous"),
            VersionRole::Unspecified => write!(f, "semantic"),
        }
    }
}

/// Unified error type for release-post operations
#[derive(Error, Debug)]
pub enum ReleasePostError {
    #[error("Invalid {role} version '{value}': {reason}")]
    InvalidVersion {
        role: VersionRole,
        value: String,
        reason: String,
    },

    #[error("Analysis output unavailable at {}: {reason}", .path.display())]
    AnalysisUnavailable { path: PathBuf, reason: String },

    #[error("Malformed change entry #{index}: {reason}")]
    MalformedChangeEntry { index: usize, reason: String },

    #[error("{stage} stage failed: {message}")]
    CollaboratorFailure { stage: Stage, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in release-post
pub type Result<T> = std::result::Result<T, ReleasePostError>;

impl ReleasePostError {
    /// Create an invalid-version error with context
    pub fn invalid_version(
        role: VersionRole,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ReleasePostError::InvalidVersion {
            role,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleasePostError::Config(msg.into())
    }

    /// Create a collaborator failure for the given stage
    pub fn collaborator(stage: Stage, msg: impl Into<String>) -> Self {
        ReleasePostError::CollaboratorFailure {
            stage,
            message: msg.into(),
        }
    }

    /// Re-label an invalid-version error with the role it played in a run.
    pub fn with_role(self, role: VersionRole) -> Self {
        match self {
            ReleasePostError::InvalidVersion { value, reason, .. } => {
                ReleasePostError::InvalidVersion {
                    role,
                    value,
                    reason,
                }
            }
            other => other,
        }
    }

    /// Attribute an infrastructure error (git, I/O, config) to a pipeline stage.
    ///
    /// Domain errors keep their own kind so callers can still match on them.
    pub fn at_stage(self, stage: Stage) -> Self {
        match self {
            ReleasePostError::Git(e) => ReleasePostError::collaborator(stage, e.message()),
            ReleasePostError::Io(e) => ReleasePostError::collaborator(stage, e.to_string()),
            ReleasePostError::Config(msg) => ReleasePostError::collaborator(stage, msg),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReleasePostError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_invalid_version_names_role_and_value() {
        let err = ReleasePostError::invalid_version(VersionRole::Previous, "6.x", "bad format");
        assert_eq!(err.to_string(), "Invalid previous version '6.x': bad format");
    }

    #[test]
    fn test_with_role_relabels_only_versions() {
        let err = ReleasePostError::invalid_version(VersionRole::Unspecified, "1", "short")
            .with_role(VersionRole::Current);
        assert!(err.to_string().starts_with("Invalid current version"));

        let err = ReleasePostError::config("x").with_role(VersionRole::Current);
        assert!(matches!(err, ReleasePostError::Config(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ReleasePostError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_at_stage_wraps_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ReleasePostError::from(io_err).at_stage(Stage::Output);
        match err {
            ReleasePostError::CollaboratorFailure { stage, message } => {
                assert_eq!(stage, Stage::Output);
                assert!(message.contains("denied"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_at_stage_keeps_domain_errors() {
        let err = ReleasePostError::MalformedChangeEntry {
            index: 2,
            reason: "missing category".to_string(),
        }
        .at_stage(Stage::Changeset);
        assert!(matches!(
            err,
            ReleasePostError::MalformedChangeEntry { index: 2, .. }
        ));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (ReleasePostError::config("x"), "Configuration error"),
            (
                ReleasePostError::collaborator(Stage::Publish, "x"),
                "publish stage failed",
            ),
            (
                ReleasePostError::AnalysisUnavailable {
                    path: PathBuf::from("changes.json"),
                    reason: "x".to_string(),
                },
                "Analysis output unavailable",
            ),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
