//! flpzip - FL Studio project bundler
//!
//! Reads an `.flp` project, finds the audio samples its sampler channels
//! reference, and packs the project together with every sample still on
//! disk into a flat zip archive beside it.
//!
//! # Architecture
//!
//! - [`flp`]: native parser for the FLP binary format
//! - [`project`]: the parsed project model and the [`ProjectParser`] seam
//! - [`bundle`]: archive writing and the top-level success/failure report
//! - [`cli`]: argument parsing and exit-code mapping

pub mod bundle;
pub mod cli;
pub mod error;
pub mod flp;
pub mod project;

pub use bundle::{archive_path_for, bundle_project, process_project, BundleReport, Outcome};
pub use error::{FlpZipError, Result};
pub use flp::FlpParser;
pub use project::{Channel, ChannelKind, Project, ProjectParser};
