//! FL Studio project parser
//!
//! Reads the `FLhd` header and walks the `FLdt` event stream, collecting the
//! channel rack. Only the events needed to locate sampler channels and their
//! samples are interpreted; everything else is skipped.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, trace};

use crate::error::{FlpZipError, Result};
use crate::flp::event::{Event, EventReader};
use crate::project::{Channel, ChannelKind, Project, ProjectParser};

const HEADER_MAGIC: &[u8; 4] = b"FLhd";
const DATA_MAGIC: &[u8; 4] = b"FLdt";
const HEADER_LEN: u32 = 6;
/// Magic, length, and header body.
const HEADER_SIZE: usize = 4 + 4 + HEADER_LEN as usize;

// Event ids
const CHANNEL_TYPE: u8 = 21;
const CHANNEL_NEW: u8 = 64;
const CHANNEL_SAMPLE_PATH: u8 = 196;
const PROJECT_VERSION: u8 = 199;
const CHANNEL_NAME: u8 = 203;

/// First version that stores text events as UTF-16LE.
const UNICODE_VERSION: (u32, u32) = (11, 5);

/// Native parser for `.flp` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlpParser;

impl FlpParser {
    pub fn new() -> Self {
        FlpParser
    }

    /// Parse a project already loaded into memory.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Project> {
        let mut project = parse_header(bytes)?;

        let (data_len, rest) = read_chunk_header(&bytes[HEADER_SIZE..], DATA_MAGIC, HEADER_SIZE)?;
        let data_start = HEADER_SIZE + 8;
        let data = rest
            .get(..data_len as usize)
            .ok_or(FlpZipError::UnexpectedEof {
                offset: bytes.len(),
            })?;

        let mut unicode = false;
        let mut current: Option<Channel> = None;
        // only the first sample path event of a channel counts
        let mut sample_seen = false;

        for event in EventReader::new(data, data_start) {
            let Event { id, value } = event?;
            match id {
                PROJECT_VERSION => {
                    let raw = value.as_data().unwrap_or_default();
                    let version = decode_ascii(raw);
                    unicode = is_unicode_version(&version);
                    debug!("project saved by FL Studio {} (unicode text: {})", version, unicode);
                    project.version = Some(version);
                }
                CHANNEL_NEW => {
                    if let Some(channel) = current.take() {
                        project.channels.push(channel);
                    }
                    let index = value.as_u32().unwrap_or_default() as u16;
                    current = Some(Channel::new(index, ChannelKind::Sampler));
                    sample_seen = false;
                }
                CHANNEL_TYPE => {
                    if let (Some(channel), Some(kind)) = (current.as_mut(), value.as_u32()) {
                        channel.kind = ChannelKind::from_id(kind as u8);
                    }
                }
                CHANNEL_NAME => {
                    if let (Some(channel), Some(raw)) = (current.as_mut(), value.as_data()) {
                        if channel.name.is_none() {
                            let name = decode_text(id, raw, unicode)?;
                            channel.name = (!name.is_empty()).then_some(name);
                        }
                    }
                }
                CHANNEL_SAMPLE_PATH => {
                    if let (Some(channel), Some(raw)) = (current.as_mut(), value.as_data()) {
                        if !sample_seen {
                            let path = decode_text(id, raw, unicode)?;
                            channel.sample_path = (!path.is_empty()).then(|| PathBuf::from(path));
                            sample_seen = true;
                        }
                    }
                }
                _ => trace!("skipping event {}", id),
            }
        }

        if let Some(channel) = current.take() {
            project.channels.push(channel);
        }

        debug!(
            "parsed {} channels ({} samplers)",
            project.channels.len(),
            project.samplers().count()
        );
        Ok(project)
    }
}

impl ProjectParser for FlpParser {
    fn parse(&self, path: &Path) -> Result<Project> {
        if !path.exists() {
            return Err(FlpZipError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let bytes = fs::read(path).map_err(|e| FlpZipError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.parse_bytes(&bytes)
    }
}

/// Read a chunk magic and its u32 length, returning the length and the
/// bytes that follow.
fn read_chunk_header<'a>(
    bytes: &'a [u8],
    magic: &'static [u8; 4],
    offset: usize,
) -> Result<(u32, &'a [u8])> {
    if bytes.len() < 8 {
        return Err(FlpZipError::UnexpectedEof {
            offset: offset + bytes.len(),
        });
    }
    let found = [bytes[0], bytes[1], bytes[2], bytes[3]];
    if &found != magic {
        return Err(FlpZipError::InvalidMagic {
            expected: if magic == HEADER_MAGIC { "FLhd" } else { "FLdt" },
            found,
        });
    }
    let len = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    Ok((len, &bytes[8..]))
}

fn parse_header(bytes: &[u8]) -> Result<Project> {
    let (len, body) = read_chunk_header(bytes, HEADER_MAGIC, 0)?;
    if len != HEADER_LEN {
        return Err(FlpZipError::InvalidHeaderLength { length: len });
    }
    if body.len() < HEADER_LEN as usize {
        return Err(FlpZipError::UnexpectedEof {
            offset: bytes.len(),
        });
    }
    Ok(Project {
        format: i16::from_le_bytes([body[0], body[1]]),
        channel_count: u16::from_le_bytes([body[2], body[3]]),
        ppq: u16::from_le_bytes([body[4], body[5]]),
        ..Project::default()
    })
}

/// Whether a version string like `20.8.4.2576` stores text as UTF-16.
fn is_unicode_version(version: &str) -> bool {
    let mut parts = version.split('.').map(|p| p.trim().parse::<u32>().ok());
    match (parts.next().flatten(), parts.next().flatten()) {
        (Some(major), Some(minor)) => (major, minor) >= UNICODE_VERSION,
        (Some(major), None) => major > UNICODE_VERSION.0,
        _ => false,
    }
}

/// Latin-1 text with trailing NULs removed.
fn decode_ascii(raw: &[u8]) -> String {
    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    raw[..end].iter().map(|&b| b as char).collect()
}

fn decode_text(event_id: u8, raw: &[u8], unicode: bool) -> Result<String> {
    if !unicode {
        return Ok(decode_ascii(raw));
    }
    if raw.len() % 2 != 0 {
        return Err(FlpZipError::InvalidText {
            event_id,
            reason: format!("odd UTF-16 byte length {}", raw.len()),
        });
    }
    let mut units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    while units.last() == Some(&0) {
        units.pop();
    }
    String::from_utf16(&units).map_err(|e| FlpZipError::InvalidText {
        event_id,
        reason: e.to_string(),
    })
}
