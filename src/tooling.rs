//! Tooling & Integration Layer
//!
//! Command-line access to the navigation core.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
