//! User interface module - run summaries and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Summaries of whole pipeline runs

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_boundary_warning, display_error, display_status, display_success,
    display_template_report, format_template_change, format_template_report,
};

use crate::domain::VersionRange;
use crate::pipeline::{PipelineOutcome, PipelineReport};

/// Display the releases being compared.
pub fn display_versions(versions: &VersionRange) {
    display_status(&format!(
        "Comparing {} against {}",
        versions.current, versions.previous
    ));
}

/// Final confirmation line for a run's artifact.
pub fn outcome_message(outcome: &PipelineOutcome) -> String {
    match outcome {
        PipelineOutcome::Written { path } => format!("Output written to {}", path.display()),
        PipelineOutcome::Published { url } => format!("Published draft release post at {}", url),
    }
}

/// Display everything a successful run produced.
pub fn display_report(report: &PipelineReport) {
    display_versions(&report.versions);
    display_template_report(&report.template_changes);
    for warning in &report.warnings {
        display_boundary_warning(warning);
    }
    display_success(&outcome_message(&report.outcome));
}
