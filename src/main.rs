//! flpzip CLI
//!
//! Bundles an FL Studio project and the samples it references into a zip
//! archive next to the project file.

use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::debug;

use flpzip::cli::{commands, Cli};

fn main() -> ExitCode {
    // Initialize logger
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    debug!("flpzip v{}", env!("CARGO_PKG_VERSION"));
    if !cli.ignored.is_empty() {
        debug!("ignoring extra arguments: {:?}", cli.ignored);
    }

    match cli.path {
        Some(path) => commands::bundle(&path),
        None => commands::usage(),
    }
}
