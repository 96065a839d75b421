use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use crate::analyzer::{AnalysisRequest, Analyzer};
use crate::error::{ReleasePostError, Result};
use crate::pipeline::Stage;

/// Runs an external analyzer program.
///
/// Arguments may contain the placeholders `{compare}`, `{since}`, `{source}`
/// and `{base}`, which are replaced from the [`AnalysisRequest`]. The program
/// runs with the working directory set to the run's workdir so that it leaves
/// its output file there.
#[derive(Debug, Clone)]
pub struct CommandAnalyzer {
    program: String,
    args: Vec<String>,
}

impl CommandAnalyzer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        CommandAnalyzer {
            program: program.into(),
            args,
        }
    }

    /// Arguments with placeholders substituted for `request`
    pub fn expand_args(&self, request: &AnalysisRequest) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{compare}", &request.compare)
                    .replace("{since}", &request.since)
                    .replace("{source}", &request.source)
                    .replace("{base}", &request.base)
            })
            .collect()
    }
}

impl Analyzer for CommandAnalyzer {
    fn analyze(&self, request: &AnalysisRequest, workdir: &Path) -> Result<()> {
        let args = self.expand_args(request);
        info!(program = %self.program, ?args, "running change analyzer");

        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(workdir)
            .output()
            .map_err(|e| {
                ReleasePostError::collaborator(
                    Stage::Analysis,
                    format!("Failed to execute analyzer '{}': {}", self.program, e),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Err(ReleasePostError::collaborator(
                Stage::Analysis,
                format!(
                    "Analyzer '{}' failed with exit code {}\nStdout: {}\nStderr: {}",
                    self.program,
                    output.status.code().unwrap_or(-1),
                    stdout,
                    stderr
                ),
            ));
        }

        debug!(
            stdout_bytes = output.stdout.len(),
            "analyzer finished successfully"
        );
        Ok(())
    }
}
