//! CLI Module
//!
//! Command-line interface for flpzip.

pub mod commands;

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Usage line printed when no project path is given.
pub const USAGE: &str = "Usage: flpzip <path_to_flp>";

/// flpzip - bundle an FL Studio project with its samples into a zip archive
#[derive(Parser, Debug)]
#[command(name = "flpzip")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the .flp project file
    pub path: Option<PathBuf>,

    /// Anything after the project path is accepted and ignored
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub ignored: Vec<OsString>,
}
