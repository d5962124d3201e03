//! CLI module - argument parsing and interactive page navigation

mod args;
mod prompts;

pub use args::{enriched_output_path, Cli, Commands};
pub use prompts::*;
