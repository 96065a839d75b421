//! Command workflows
//!
//! Turns parsed command-line arguments and configuration into collaborators
//! and runs them. Kept separate from `main.rs` so workflows can be called
//! programmatically without depending on clap.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::analyzer::CommandAnalyzer;
use crate::config::Config;
use crate::diff::FileDiffSource;
use crate::domain::{Version, VersionRange};
use crate::git::{DiffSource, Git2Repository};
use crate::pipeline::{
    Collaborators, OutputMode, PipelineReport, PipelineRun, ReleasePostPipeline,
};
use crate::publish::WpComPublisher;
use crate::render::HtmlRenderer;
use crate::scanner::{scan, TemplateChangeReport};

/// Arguments for the release workflow
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseWorkflowArgs {
    pub current_version: String,
    pub previous_version: Option<String>,
    pub output_only: bool,
    /// Working directory for analyzer output and the rendered file
    pub workdir: Option<PathBuf>,
    /// Pre-generated diff to scan instead of diffing the repository
    pub diff_file: Option<PathBuf>,
}

impl ReleaseWorkflowArgs {
    pub fn to_run(&self) -> Result<PipelineRun> {
        let workdir = match &self.workdir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("Cannot determine current directory")?,
        };

        Ok(PipelineRun {
            current_version: self.current_version.clone(),
            previous_version: self.previous_version.clone(),
            mode: if self.output_only {
                OutputMode::WriteFile
            } else {
                OutputMode::Publish
            },
            workdir,
        })
    }
}

/// Release workflow
///
/// 1. Pre-flight version check (nothing is opened before it passes)
/// 2. Build collaborators from configuration
/// 3. Run the release post pipeline
pub fn run_release_workflow(
    args: &ReleaseWorkflowArgs,
    config: &Config,
) -> Result<PipelineReport> {
    VersionRange::resolve(&args.current_version, args.previous_version.as_deref())?;

    let run = args.to_run()?;
    fs::create_dir_all(&run.workdir)
        .with_context(|| format!("Cannot create working directory {}", run.workdir.display()))?;

    let repository = Git2Repository::open(&config.git.repository, config.git.tag_pattern()?)
        .with_context(|| {
            format!(
                "Cannot open git repository at {}",
                config.git.repository.display()
            )
        })?;
    let diff_file = args
        .diff_file
        .as_ref()
        .map(|path| FileDiffSource::new(path.clone()));
    let diff_source: &dyn DiffSource = match &diff_file {
        Some(file) => file,
        None => &repository,
    };

    let analyzer = CommandAnalyzer::new(
        config.analyzer.command.clone(),
        config.analyzer.args.clone(),
    );
    let renderer = HtmlRenderer::new(config.render.templates_dir.clone());
    let publisher = WpComPublisher::new(config.publish.api_base.clone(), config.publish.timeout())?;

    debug!(?run, "starting release pipeline");

    let pipeline = ReleasePostPipeline::new(
        config.pipeline_settings(),
        Collaborators {
            analyzer: &analyzer,
            diff_source,
            contributors: &repository,
            renderer: &renderer,
            publisher: &publisher,
        },
    );

    Ok(pipeline.run(&run)?)
}

/// Scan a diff file for template changes against `target_version`.
pub fn run_scan_workflow(diff_file: &Path, target_version: &str) -> Result<TemplateChangeReport> {
    let target = Version::parse(target_version)?;
    let diff = fs::read_to_string(diff_file)
        .with_context(|| format!("Cannot read diff {}", diff_file.display()))?;

    Ok(TemplateChangeReport::from_scan(&scan(&diff, &target)))
}
