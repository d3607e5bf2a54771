//! webterm client library
//!
//! This library contains the interactive front-end: argument parsing, REPL
//! input handling and transcript rendering. The binary is in main.rs.

pub mod app;
pub mod cli;
pub mod command;
pub mod render;

// Re-export commonly used types
pub use app::{App, Flow};
pub use cli::{CliArgs, USAGE};
pub use command::Input;
pub use render::{status_line, Renderer};
