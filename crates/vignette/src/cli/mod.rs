//! Command-line interface module.

mod commands;
mod run;

pub use commands::{Cli, Commands, GenerateArgs};
pub use run::{list_formats, run_generate};
