//! Command line interface module
//!
//! Argument parsing and the runner that maps one protocol invocation to an
//! exit code.

pub mod args;
pub mod runner;

pub use args::Args;
pub use runner::Runner;
