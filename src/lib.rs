pub mod analyzer;
pub mod boundary;
pub mod changeset;
pub mod cli;
pub mod config;
pub mod diff;
pub mod domain;
pub mod error;
pub mod git;
pub mod pipeline;
pub mod publish;
pub mod render;
pub mod scanner;
pub mod ui;

pub use error::{ReleasePostError, Result};
