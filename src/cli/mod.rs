//! Command-line interface definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod orchestration;

pub use orchestration::{run_release_workflow, run_scan_workflow, ReleaseWorkflowArgs};

#[derive(Debug, Parser)]
#[command(
    name = "release-post",
    about = "Generate release posts and template change reports between releases",
    version
)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    pub config: Option<String>,

    #[arg(long, global = true, help = "Log pipeline progress to stderr")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a release post for a version and publish it as a draft.
    Release {
        #[arg(
            value_name = "currentVersion",
            help = "The version to generate a post for, as tagged in the repository"
        )]
        current_version: String,

        #[arg(
            long = "outputOnly",
            visible_alias = "output-only",
            help = "Only output the post to changes.html, do not publish it"
        )]
        output_only: bool,

        #[arg(
            long = "previousVersion",
            visible_alias = "previous-version",
            value_name = "previousVersion",
            help = "Version to compare against instead of the last minor release"
        )]
        previous_version: Option<String>,

        #[arg(long, help = "Directory for analyzer output and the rendered post")]
        workdir: Option<PathBuf>,

        #[arg(long, help = "Read the release diff from a file instead of the repository")]
        diff: Option<PathBuf>,
    },

    /// Report template changes in a diff file.
    Scan {
        #[arg(value_name = "diffFile")]
        diff_file: PathBuf,

        #[arg(long, help = "Release version expected in @version annotations")]
        target: String,

        #[arg(long, help = "Print the report as JSON")]
        json: bool,
    },
}

impl Command {
    /// Workflow arguments for a `release` command
    pub fn release_args(&self) -> Option<ReleaseWorkflowArgs> {
        match self {
            Command::Release {
                current_version,
                output_only,
                previous_version,
                workdir,
                diff,
            } => Some(ReleaseWorkflowArgs {
                current_version: current_version.clone(),
                previous_version: previous_version.clone(),
                output_only: *output_only,
                workdir: workdir.clone(),
                diff_file: diff.clone(),
            }),
            Command::Scan { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_flags() {
        let cli = Cli::try_parse_from([
            "release-post",
            "release",
            "6.8.0",
            "--outputOnly",
            "--previousVersion",
            "6.6.0",
        ])
        .unwrap();

        let args = cli.command.release_args().unwrap();
        assert_eq!(args.current_version, "6.8.0");
        assert_eq!(args.previous_version.as_deref(), Some("6.6.0"));
        assert!(args.output_only);
    }

    #[test]
    fn test_release_kebab_aliases() {
        let cli = Cli::try_parse_from([
            "release-post",
            "release",
            "6.8.0",
            "--output-only",
            "--previous-version",
            "6.6.0",
        ])
        .unwrap();
        assert!(cli.command.release_args().unwrap().output_only);
    }

    #[test]
    fn test_release_requires_version() {
        assert!(Cli::try_parse_from(["release-post", "release"]).is_err());
    }

    #[test]
    fn test_scan_args() {
        let cli = Cli::try_parse_from([
            "release-post",
            "--verbose",
            "scan",
            "release.diff",
            "--target",
            "6.8.0",
            "--json",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert!(cli.command.release_args().is_none());
        match cli.command {
            Command::Scan { target, json, .. } => {
                assert_eq!(target, "6.8.0");
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
