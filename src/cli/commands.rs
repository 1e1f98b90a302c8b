//! CLI Command Implementations

use std::io;
use std::path::Path;
use std::process::ExitCode;

use log::{debug, info};

use crate::bundle::{process_project, Outcome};
use crate::cli::USAGE;
use crate::flp::FlpParser;

/// Bundle the project at `path` and map the outcome to an exit code.
pub fn bundle(path: &Path) -> ExitCode {
    info!("Processing project: {}", path.display());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match process_project(&FlpParser::new(), path, &mut out) {
        Outcome::Success(report) => {
            debug!("archive entries: {:?}", report.entries);
            ExitCode::SUCCESS
        }
        Outcome::Failure(e) => {
            debug!("bundle failed ({})", e.error_code());
            if let Some(suggestion) = e.recovery_suggestion() {
                info!("{}", suggestion);
            }
            ExitCode::FAILURE
        }
    }
}

/// Print the usage line and return the missing-argument exit code.
pub fn usage() -> ExitCode {
    println!("{}", USAGE);
    ExitCode::from(1)
}
