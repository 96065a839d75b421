//! Release post pipeline
//!
//! Stages run strictly in order and the first failure ends the run:
//!
//! ```text
//! Start -> VersionsResolved -> AnalysisComplete -> ChangesetBuilt
//!       -> ContributorsFetched -> DocumentRendered -> Written | Published
//! ```
//!
//! Each stage is a method returning the next stage's input or an error. There
//! is no retry and no rollback: side effects of completed stages (such as the
//! analyzer's output file) stay where they are when a later stage fails.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::analyzer::{load_changes, AnalysisRequest, Analyzer, CHANGES_FILE};
use crate::boundary::BoundaryWarning;
use crate::changeset::{aggregate, Changeset};
use crate::domain::{validate_format, VersionRange};
use crate::error::{ReleasePostError, Result, VersionRole};
use crate::git::{ContributorSource, DiffSource};
use crate::publish::Publisher;
use crate::render::{RenderContext, Renderer, RELEASE_TEMPLATE};
use crate::scanner::{scan, TemplateChangeReport};

/// Rendered document written in output-only mode.
pub const OUTPUT_FILE: &str = "changes.html";

/// Pipeline stage, used to attribute failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Versions,
    Analysis,
    Changeset,
    Contributors,
    Render,
    Output,
    Publish,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Versions => "versions",
            Stage::Analysis => "analysis",
            Stage::Changeset => "changeset",
            Stage::Contributors => "contributors",
            Stage::Render => "render",
            Stage::Output => "output",
            Stage::Publish => "publish",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Write the rendered document to [`OUTPUT_FILE`] in the workdir
    WriteFile,
    /// Create a remote draft post
    Publish,
}

/// Inputs of one pipeline invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
    pub current_version: String,
    /// Derived from `current_version` when absent
    pub previous_version: Option<String>,
    pub mode: OutputMode,
    /// Directory for the analyzer output and the rendered file
    pub workdir: PathBuf,
}

/// Run-independent settings, usually built from [`crate::config::Config`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub product_name: String,
    pub source_repository: String,
    pub changes_file: String,
    pub template_name: String,
    pub site_id: String,
    pub auth_token: Option<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        PipelineSettings {
            product_name: "WooCommerce".to_string(),
            source_repository: "https://github.com/woocommerce/woocommerce.git".to_string(),
            changes_file: CHANGES_FILE.to_string(),
            template_name: RELEASE_TEMPLATE.to_string(),
            site_id: "96396764".to_string(),
            auth_token: None,
        }
    }
}

/// The external collaborators a run talks to.
pub struct Collaborators<'a> {
    pub analyzer: &'a dyn Analyzer,
    pub diff_source: &'a dyn DiffSource,
    pub contributors: &'a dyn ContributorSource,
    pub renderer: &'a dyn Renderer,
    pub publisher: &'a dyn Publisher,
}

/// Terminal success of a run: exactly one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Written { path: PathBuf },
    Published { url: String },
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub versions: VersionRange,
    pub template_changes: TemplateChangeReport,
    pub warnings: Vec<BoundaryWarning>,
    pub outcome: PipelineOutcome,
}

enum Delivery<'t> {
    File,
    Draft { auth_token: &'t str },
}

pub struct ReleasePostPipeline<'a> {
    settings: PipelineSettings,
    collaborators: Collaborators<'a>,
}

impl<'a> ReleasePostPipeline<'a> {
    pub fn new(settings: PipelineSettings, collaborators: Collaborators<'a>) -> Self {
        ReleasePostPipeline {
            settings,
            collaborators,
        }
    }

    /// Execute every stage for `run`.
    pub fn run(&self, run: &PipelineRun) -> Result<PipelineReport> {
        let mut warnings = Vec::new();

        let versions = self.resolve_versions(run, &mut warnings)?;
        let delivery = self.delivery(run.mode)?;

        let raw_changes = self.run_analysis(run, &versions)?;
        if raw_changes.is_empty() {
            warnings.push(BoundaryWarning::NoAnalyzedChanges {
                current: run.current_version.clone(),
            });
        }

        let (changeset, template_changes) = self.build_changeset(&versions, &raw_changes)?;
        let unbumped = template_changes.warnings().count();
        if unbumped > 0 {
            warnings.push(BoundaryWarning::UnbumpedTemplates { count: unbumped });
        }

        let contributors = self.fetch_contributors(&versions)?;

        let title = format!(
            "{} {} Released",
            self.settings.product_name, run.current_version
        );
        let html = self.render_document(&title, &changeset, &contributors, &run.current_version)?;

        let outcome = match delivery {
            Delivery::File => self.write_output(&run.workdir, &html)?,
            Delivery::Draft { auth_token } => self.publish(auth_token, &title, &html)?,
        };

        for warning in &warnings {
            warn!(%warning, "release boundary warning");
        }

        Ok(PipelineReport {
            versions,
            template_changes,
            warnings,
            outcome,
        })
    }

    /// Start -> VersionsResolved
    fn resolve_versions(
        &self,
        run: &PipelineRun,
        warnings: &mut Vec<BoundaryWarning>,
    ) -> Result<VersionRange> {
        let versions =
            VersionRange::resolve(&run.current_version, run.previous_version.as_deref())?;

        for (role, raw) in [
            (VersionRole::Current, run.current_version.clone()),
            (VersionRole::Previous, versions.previous.to_string()),
        ] {
            if !validate_format(&raw) {
                return Err(ReleasePostError::invalid_version(
                    role,
                    raw,
                    "does not match the release version grammar",
                ));
            }
        }

        if versions.previous.is_older_than(&versions.current) == Some(false) {
            warnings.push(BoundaryWarning::PreviousNotOlder {
                previous: versions.previous.to_string(),
                current: versions.current.to_string(),
            });
        }

        info!(
            stage = %Stage::Versions,
            current = %versions.current,
            previous = %versions.previous,
            "versions resolved"
        );
        Ok(versions)
    }

    /// Where the rendered document goes; publishing needs a token up front.
    fn delivery(&self, mode: OutputMode) -> Result<Delivery<'_>> {
        match mode {
            OutputMode::WriteFile => Ok(Delivery::File),
            OutputMode::Publish => self
                .settings
                .auth_token
                .as_deref()
                .filter(|token| !token.is_empty())
                .map(|auth_token| Delivery::Draft { auth_token })
                .ok_or_else(|| {
                    ReleasePostError::config(
                        "Publishing requires an auth token; configure one or use --outputOnly",
                    )
                }),
        }
    }

    /// VersionsResolved -> AnalysisComplete
    fn run_analysis(&self, run: &PipelineRun, versions: &VersionRange) -> Result<Vec<Value>> {
        let request = AnalysisRequest::new(
            &run.current_version,
            &versions.previous.to_string(),
            &self.settings.source_repository,
        );

        let changes_path = run.workdir.join(&self.settings.changes_file);
        let unavailable = |reason: String| ReleasePostError::AnalysisUnavailable {
            path: changes_path.clone(),
            reason,
        };

        // Output left by an earlier run must never stand in for this one.
        match fs::remove_file(&changes_path) {
            Ok(()) => debug!(path = %changes_path.display(), "removed stale analyzer output"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(unavailable(format!("cannot remove stale output: {}", e))),
        }

        self.collaborators
            .analyzer
            .analyze(&request, &run.workdir)
            .map_err(|e| match e {
                ReleasePostError::CollaboratorFailure { message, .. } => unavailable(message),
                other => unavailable(other.to_string()),
            })?;

        let changes = load_changes(&changes_path)?;
        info!(stage = %Stage::Analysis, entries = changes.len(), "analysis complete");
        Ok(changes)
    }

    /// AnalysisComplete -> ChangesetBuilt
    fn build_changeset(
        &self,
        versions: &VersionRange,
        raw_changes: &[Value],
    ) -> Result<(Changeset, TemplateChangeReport)> {
        let diff = self
            .collaborators
            .diff_source
            .diff(&versions.previous, &versions.current)
            .map_err(|e| e.at_stage(Stage::Changeset))?;

        let template_changes = scan(&diff, &versions.current);
        let changeset = aggregate(raw_changes, &template_changes)?;

        info!(
            stage = %Stage::Changeset,
            groups = changeset.groups.len(),
            entries = changeset.total_entries(),
            templates = template_changes.len(),
            "changeset built"
        );
        Ok((changeset, TemplateChangeReport::from_scan(&template_changes)))
    }

    /// ChangesetBuilt -> ContributorsFetched
    fn fetch_contributors(&self, versions: &VersionRange) -> Result<Vec<String>> {
        let contributors = self
            .collaborators
            .contributors
            .contributors(&versions.current, &versions.previous)
            .map_err(|e| e.at_stage(Stage::Contributors))?;

        info!(stage = %Stage::Contributors, count = contributors.len(), "contributors fetched");
        Ok(contributors)
    }

    /// ContributorsFetched -> DocumentRendered
    fn render_document(
        &self,
        title: &str,
        changeset: &Changeset,
        contributors: &[String],
        display_version: &str,
    ) -> Result<String> {
        let context = RenderContext {
            contributors,
            title,
            changes: changeset,
            display_version,
        };

        let html = self
            .collaborators
            .renderer
            .render(&self.settings.template_name, &context)
            .map_err(|e| e.at_stage(Stage::Render))?;

        info!(stage = %Stage::Render, bytes = html.len(), "document rendered");
        Ok(html)
    }

    /// DocumentRendered -> Written
    fn write_output(&self, workdir: &Path, html: &str) -> Result<PipelineOutcome> {
        let path = workdir.join(OUTPUT_FILE);
        fs::write(&path, html).map_err(|e| ReleasePostError::from(e).at_stage(Stage::Output))?;

        info!(stage = %Stage::Output, path = %path.display(), "document written");
        Ok(PipelineOutcome::Written { path })
    }

    /// DocumentRendered -> Published
    fn publish(&self, auth_token: &str, title: &str, html: &str) -> Result<PipelineOutcome> {
        let draft = self
            .collaborators
            .publisher
            .create_draft(&self.settings.site_id, auth_token, title, html)
            .map_err(|e| e.at_stage(Stage::Publish))?;

        info!(stage = %Stage::Publish, url = %draft.url, "draft published");
        Ok(PipelineOutcome::Published { url: draft.url })
    }
}
