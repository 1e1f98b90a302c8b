//! Project Bundling
//!
//! Packs a project file and every sample it references into a flat zip
//! archive next to the project.

pub mod archive;

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{FlpZipError, Result};
use crate::project::ProjectParser;

pub use archive::ProjectArchive;

/// Extension of the produced archive.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Summary of a successful bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleReport {
    /// Path of the written archive.
    pub archive_path: PathBuf,
    /// Entry names in the order they were written. The project comes first.
    pub entries: Vec<String>,
    /// Sample paths that were referenced but not found on disk.
    pub missing: Vec<PathBuf>,
    /// Sample paths skipped because their entry name was already taken.
    pub duplicates: Vec<PathBuf>,
}

/// Result of [`process_project`].
#[derive(Debug)]
pub enum Outcome {
    Success(BundleReport),
    Failure(FlpZipError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

/// Archive path for a project: same directory and stem, `.zip` extension.
pub fn archive_path_for(project_path: &Path) -> PathBuf {
    project_path.with_extension(ARCHIVE_EXTENSION)
}

fn entry_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Parse `project_path` and write it together with its samples to
/// [`archive_path_for`]. Missing samples are reported on `out` and skipped.
pub fn bundle_project<P, W>(parser: &P, project_path: &Path, out: &mut W) -> Result<BundleReport>
where
    P: ProjectParser + ?Sized,
    W: Write,
{
    info!("Bundling project: {}", project_path.display());

    let project = parser.parse(project_path)?;
    let project_entry = entry_name(project_path).ok_or_else(|| FlpZipError::InvalidProjectPath {
        path: project_path.to_path_buf(),
    })?;

    let archive_path = archive_path_for(project_path);
    let mut archive = ProjectArchive::create(&archive_path)?;
    archive.add_file(project_path, &project_entry)?;

    let mut missing = Vec::new();
    let mut duplicates = Vec::new();

    for sample_path in project.sample_paths() {
        let name = match entry_name(sample_path) {
            Some(name) if sample_path.is_file() => name,
            _ => {
                report_line(
                    out,
                    format_args!("Warning: Sample file not found - {}", sample_path.display()),
                );
                missing.push(sample_path.to_path_buf());
                continue;
            }
        };
        if archive.contains(&name) {
            warn!(
                "skipping {}: an entry named {} is already in the archive",
                sample_path.display(),
                name
            );
            duplicates.push(sample_path.to_path_buf());
            continue;
        }
        archive.add_file(sample_path, &name)?;
    }

    let entries = archive.finish()?;
    info!(
        "Wrote {} entries to {} ({} missing, {} duplicate)",
        entries.len(),
        archive_path.display(),
        missing.len(),
        duplicates.len()
    );

    Ok(BundleReport {
        archive_path,
        entries,
        missing,
        duplicates,
    })
}

/// Bundle a project and report the result on `out`.
///
/// Every error is caught here and turned into [`Outcome::Failure`] after an
/// `Error:` line is written; nothing propagates to the caller.
pub fn process_project<P, W>(parser: &P, project_path: &Path, out: &mut W) -> Outcome
where
    P: ProjectParser + ?Sized,
    W: Write,
{
    let outcome = match bundle_project(parser, project_path, out) {
        Ok(report) => {
            report_line(
                out,
                format_args!("Successfully created {}", report.archive_path.display()),
            );
            Outcome::Success(report)
        }
        Err(e) => {
            report_line(out, format_args!("Error: {}", e));
            Outcome::Failure(e)
        }
    };
    if let Err(e) = out.flush() {
        debug!("failed to flush report output: {}", e);
    }
    outcome
}

/// Write one line of user-facing output.
///
/// Output failures never change the outcome of a bundle.
fn report_line<W: Write + ?Sized>(out: &mut W, line: fmt::Arguments<'_>) {
    if let Err(e) = writeln!(out, "{}", line) {
        debug!("failed to write report output: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{Channel, Project};
    use std::fs::{self, File};
    use std::io;
    use tempfile::TempDir;
    use zip::ZipArchive;

    struct StubParser(Project);

    impl ProjectParser for StubParser {
        fn parse(&self, _path: &Path) -> Result<Project> {
            Ok(self.0.clone())
        }
    }

    struct FailingParser;

    impl ProjectParser for FailingParser {
        fn parse(&self, _path: &Path) -> Result<Project> {
            Err(FlpZipError::InvalidHeaderLength { length: 0 })
        }
    }

    fn setup() -> (TempDir, PathBuf) {
        let temp_dir = tempfile::tempdir().unwrap();
        let project = temp_dir.path().join("song.flp");
        fs::write(&project, b"FLhd").unwrap();
        (temp_dir, project)
    }

    fn entry_names(path: &Path) -> Vec<String> {
        let zip = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = zip.file_names().map(String::from).collect();
        names.sort();
        names
    }

    #[test]
    fn test_archive_path_for() {
        assert_eq!(archive_path_for(Path::new("song.flp")), PathBuf::from("song.zip"));
        assert_eq!(
            archive_path_for(Path::new("/music/My Song.v2.flp")),
            PathBuf::from("/music/My Song.v2.zip")
        );
        assert_eq!(archive_path_for(Path::new("beat")), PathBuf::from("beat.zip"));
    }

    #[test]
    fn test_bundle_without_samplers() {
        let (_temp_dir, project) = setup();
        let mut out = Vec::new();

        let report = bundle_project(&StubParser(Project::default()), &project, &mut out).unwrap();

        assert_eq!(report.entries, vec!["song.flp"]);
        assert_eq!(entry_names(&report.archive_path), vec!["song.flp"]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_bundle_skips_duplicate_names() {
        let (temp_dir, project) = setup();
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(a.join("kick.wav"), b"one").unwrap();
        fs::write(b.join("kick.wav"), b"two").unwrap();

        let parser = StubParser(Project::with_channels(vec![
            Channel::sampler(0, a.join("kick.wav")),
            Channel::sampler(1, b.join("kick.wav")),
        ]));
        let mut out = Vec::new();
        let report = bundle_project(&parser, &project, &mut out).unwrap();

        assert_eq!(report.entries, vec!["song.flp", "kick.wav"]);
        assert_eq!(report.duplicates, vec![b.join("kick.wav")]);
        assert!(report.missing.is_empty());
    }

    #[test]
    fn test_process_reports_missing_sample() {
        let (temp_dir, project) = setup();
        let gone = temp_dir.path().join("gone.wav");
        let parser = StubParser(Project::with_channels(vec![Channel::sampler(0, &gone)]));
        let mut out = Vec::new();

        let outcome = process_project(&parser, &project, &mut out);

        assert!(outcome.is_success());
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            format!(
                "Warning: Sample file not found - {}\nSuccessfully created {}\n",
                gone.display(),
                temp_dir.path().join("song.zip").display()
            )
        );
    }

    #[test]
    fn test_directory_sample_counts_as_missing() {
        let (temp_dir, project) = setup();
        let kick_dir = temp_dir.path().join("Kick");
        fs::create_dir_all(&kick_dir).unwrap();
        let parser = StubParser(Project::with_channels(vec![Channel::sampler(0, &kick_dir)]));
        let mut out = Vec::new();

        let outcome = process_project(&parser, &project, &mut out);

        let report = match outcome {
            Outcome::Success(report) => report,
            Outcome::Failure(e) => panic!("bundle failed: {}", e),
        };
        assert_eq!(report.missing, vec![kick_dir.clone()]);
        assert_eq!(entry_names(&report.archive_path), vec!["song.flp"]);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(&format!("Warning: Sample file not found - {}", kick_dir.display())));
    }

    #[test]
    fn test_sample_without_file_name_counts_as_missing() {
        let (temp_dir, project) = setup();
        let parent = temp_dir.path().join("..");
        let parser = StubParser(Project::with_channels(vec![Channel::sampler(0, &parent)]));
        let mut out = Vec::new();

        let report = bundle_project(&parser, &project, &mut out).unwrap();

        assert_eq!(report.missing, vec![parent]);
        assert_eq!(report.entries, vec!["song.flp"]);
        assert_eq!(String::from_utf8(out).unwrap().matches("Warning").count(), 1);
    }

    /// Writer whose every write fails, like a closed stdout.
    struct ClosedOutput;

    impl Write for ClosedOutput {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_closed_output_does_not_fail_bundle() {
        let (temp_dir, project) = setup();
        let parser = StubParser(Project::with_channels(vec![Channel::sampler(
            0,
            temp_dir.path().join("gone.wav"),
        )]));

        let outcome = process_project(&parser, &project, &mut ClosedOutput);

        match outcome {
            Outcome::Success(report) => assert_eq!(report.missing.len(), 1),
            Outcome::Failure(e) => panic!("bundle failed: {}", e),
        }
        assert!(temp_dir.path().join("song.zip").exists());
    }

    #[test]
    fn test_process_catches_parse_failure() {
        let (temp_dir, project) = setup();
        let mut out = Vec::new();

        let outcome = process_project(&FailingParser, &project, &mut out);

        assert!(!outcome.is_success());
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Error: Invalid FLP header length"));
        assert!(!temp_dir.path().join("song.zip").exists());
    }
}
