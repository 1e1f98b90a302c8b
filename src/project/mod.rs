//! Project Model
//!
//! The in-memory view of a music project that the bundler consumes, and the
//! parser capability that produces it.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Kind of a project channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Plays back an external audio sample.
    Sampler,
    /// Hosts a native FL Studio generator plugin.
    NativePlugin,
    /// Layers other channels.
    Layer,
    /// Hosts a third-party instrument plugin.
    Instrument,
    /// Automation clip.
    Automation,
    /// A type id this crate does not know about.
    Unknown(u8),
}

impl ChannelKind {
    /// Map a raw channel type id to a kind.
    pub fn from_id(id: u8) -> Self {
        match id {
            0 => ChannelKind::Sampler,
            2 => ChannelKind::NativePlugin,
            3 => ChannelKind::Layer,
            4 => ChannelKind::Instrument,
            5 => ChannelKind::Automation,
            other => ChannelKind::Unknown(other),
        }
    }
}

/// One channel of the channel rack.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    /// Channel index as stored in the project.
    pub index: u16,
    /// Channel kind. Channels without a type event default to sampler.
    pub kind: ChannelKind,
    /// Display name, if the user renamed the channel.
    pub name: Option<String>,
    /// Path of the referenced audio sample, if any.
    pub sample_path: Option<PathBuf>,
}

impl Channel {
    /// Create an empty channel of the given kind.
    pub fn new(index: u16, kind: ChannelKind) -> Self {
        Self {
            index,
            kind,
            name: None,
            sample_path: None,
        }
    }

    /// Create a sampler channel pointing at `sample_path`.
    pub fn sampler(index: u16, sample_path: impl Into<PathBuf>) -> Self {
        Self {
            sample_path: Some(sample_path.into()),
            ..Self::new(index, ChannelKind::Sampler)
        }
    }

    /// Whether this channel plays back an external sample.
    pub fn is_sampler(&self) -> bool {
        self.kind == ChannelKind::Sampler
    }
}

/// A parsed music project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    /// FL Studio version that saved the project, e.g. `20.8.4.2576`.
    pub version: Option<String>,
    /// Header format field.
    pub format: i16,
    /// Channel count declared in the header.
    pub channel_count: u16,
    /// Pulses per quarter note.
    pub ppq: u16,
    /// All channels in the order they appear.
    pub channels: Vec<Channel>,
}

impl Project {
    /// Create a project from a list of channels.
    pub fn with_channels(channels: Vec<Channel>) -> Self {
        Self {
            channel_count: u16::try_from(channels.len()).unwrap_or(u16::MAX),
            channels,
            ..Self::default()
        }
    }

    /// Sampler channels only.
    pub fn samplers(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter().filter(|c| c.is_sampler())
    }

    /// Sample paths referenced by sampler channels, in channel order.
    pub fn sample_paths(&self) -> impl Iterator<Item = &Path> {
        self.samplers().filter_map(|c| c.sample_path.as_deref())
    }
}

/// Capability that turns a project file on disk into a [`Project`].
pub trait ProjectParser {
    /// Parse the project file at `path`.
    fn parse(&self, path: &Path) -> Result<Project>;
}
