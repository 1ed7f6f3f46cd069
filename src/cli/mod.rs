//! Command-line interface module
//!
//! Provides process-flag parsing, the registered command groups, console
//! rendering and the execution modes of the binary.

pub mod args;
pub mod commands;
pub mod images;
pub mod render;

pub use args::{Args, parse_args};
pub use commands::execute_command;
pub use render::ConsoleSink;
