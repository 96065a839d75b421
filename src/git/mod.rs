//! Release history collaborators
//!
//! The pipeline never talks to version control directly. It asks a
//! [DiffSource] for the diff between two releases and a [ContributorSource]
//! for the people who contributed to the newer one.
//!
//! - [repository::Git2Repository]: both traits backed by the `git2` crate
//! - [mock::MockRepository]: canned answers for tests
//!
//! ```rust
//! # use release_post::git::{ContributorSource, DiffSource};
//! # use release_post::domain::VersionRange;
//! # fn example<R: DiffSource + ContributorSource>(repo: &R) -> release_post::Result<()> {
//! let range = VersionRange::resolve("6.8.0", None)?;
//! let diff = repo.diff(&range.previous, &range.current)?;
//! let people = repo.contributors(&range.current, &range.previous)?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::domain::Version;
use crate::error::Result;

/// Produces the unified diff between two releases.
pub trait DiffSource {
    /// Diff from `previous` (old side) to `current` (new side), in
    /// `diff --git` patch format.
    fn diff(&self, previous: &Version, current: &Version) -> Result<String>;
}

/// Looks up who contributed to a release.
pub trait ContributorSource {
    /// Contributor identities for changes in `current` that are not in
    /// `previous`, without duplicates, in a stable order.
    fn contributors(&self, current: &Version, previous: &Version) -> Result<Vec<String>>;
}
