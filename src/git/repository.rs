use std::collections::HashSet;
use std::path::Path;

use git2::{DiffFormat, Oid, Repository as Git2Repo, Sort};
use tracing::debug;

use crate::domain::{TagPattern, Version};
use crate::error::{ReleasePostError, Result};
use crate::git::{ContributorSource, DiffSource};

/// Release history read from a local git repository.
///
/// Releases are located by formatting their version with the configured
/// [`TagPattern`] and resolving the result as a revision.
pub struct Git2Repository {
    repo: Git2Repo,
    tags: TagPattern,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P, tags: TagPattern) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo, tags })
    }

    fn release_commit(&self, version: &Version) -> Result<Oid> {
        let spec = self.tags.format(version);
        let object = self.repo.revparse_single(&spec).map_err(|e| {
            ReleasePostError::config(format!(
                "Cannot find release '{}' (tag pattern '{}'): {}",
                spec,
                self.tags.as_str(),
                e.message()
            ))
        })?;

        Ok(object.peel_to_commit()?.id())
    }
}

impl DiffSource for Git2Repository {
    fn diff(&self, previous: &Version, current: &Version) -> Result<String> {
        let old_tree = self.repo.find_commit(self.release_commit(previous)?)?.tree()?;
        let new_tree = self.repo.find_commit(self.release_commit(current)?)?.tree()?;

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), None)?;

        let mut text = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            // Content lines come without their diff prefix; headers carry their own text.
            if matches!(line.origin(), '+' | '-' | ' ') {
                text.push(line.origin());
            }
            text.push_str(&String::from_utf8_lossy(line.content()));
            true
        })?;

        debug!(
            previous = %previous,
            current = %current,
            files = diff.deltas().len(),
            "generated release diff"
        );

        Ok(text)
    }
}

impl ContributorSource for Git2Repository {
    fn contributors(&self, current: &Version, previous: &Version) -> Result<Vec<String>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
        revwalk.push(self.release_commit(current)?)?;
        revwalk.hide(self.release_commit(previous)?)?;

        let mut seen = HashSet::new();
        let mut contributors = Vec::new();

        for oid_result in revwalk {
            let commit = self.repo.find_commit(oid_result?)?;
            let author = commit.author().name().unwrap_or("unknown").to_string();

            if seen.insert(author.clone()) {
                contributors.push(author);
            }
        }

        Ok(contributors)
    }
}
