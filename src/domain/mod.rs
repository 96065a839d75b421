//! Domain logic - release versions and how they map to tags

pub mod tag;
pub mod version;

pub use tag::TagPattern;
pub use version::{validate_format, Version, VersionRange};
