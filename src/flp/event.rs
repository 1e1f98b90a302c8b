//! FLP event stream decoding
//!
//! The data chunk of a project is a flat sequence of events. The id byte
//! selects the payload size:
//!
//! | id range   | payload                                  |
//! |------------|------------------------------------------|
//! | `0..=63`   | 1 byte                                   |
//! | `64..=127` | 2 bytes, little endian                   |
//! | `128..=191`| 4 bytes, little endian                   |
//! | `192..=255`| varint length, then that many bytes      |

use crate::error::{FlpZipError, Result};

const WORD_BASE: u8 = 64;
const DWORD_BASE: u8 = 128;
const DATA_BASE: u8 = 192;

/// Decoded payload of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventValue<'a> {
    Byte(u8),
    Word(u16),
    Dword(u32),
    Data(&'a [u8]),
}

impl EventValue<'_> {
    /// Numeric payload widened to `u32`, `None` for data events.
    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            EventValue::Byte(v) => Some(v as u32),
            EventValue::Word(v) => Some(v as u32),
            EventValue::Dword(v) => Some(v),
            EventValue::Data(_) => None,
        }
    }

    /// Raw payload of a data event.
    pub fn as_data(&self) -> Option<&[u8]> {
        match *self {
            EventValue::Data(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// One event from the data chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event<'a> {
    pub id: u8,
    pub value: EventValue<'a>,
}

/// Iterator over the events of a data chunk.
///
/// `base_offset` is only used to report absolute file offsets in errors.
pub struct EventReader<'a> {
    data: &'a [u8],
    pos: usize,
    base_offset: usize,
}

impl<'a> EventReader<'a> {
    pub fn new(data: &'a [u8], base_offset: usize) -> Self {
        Self {
            data,
            pos: 0,
            base_offset,
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(FlpZipError::UnexpectedEof {
                offset: self.base_offset + self.data.len(),
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_varint(&mut self) -> Result<usize> {
        let mut value: usize = 0;
        let mut shift = 0;
        loop {
            let byte = self.take(1)?[0];
            if shift < usize::BITS {
                value |= ((byte & 0x7f) as usize) << shift;
            }
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    fn read_event(&mut self) -> Result<Event<'a>> {
        let id = self.take(1)?[0];
        let value = if id < WORD_BASE {
            EventValue::Byte(self.take(1)?[0])
        } else if id < DWORD_BASE {
            let b = self.take(2)?;
            EventValue::Word(u16::from_le_bytes([b[0], b[1]]))
        } else if id < DATA_BASE {
            let b = self.take(4)?;
            EventValue::Dword(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        } else {
            let len = self.read_varint()?;
            EventValue::Data(self.take(len)?)
        };
        Ok(Event { id, value })
    }
}

impl<'a> Iterator for EventReader<'a> {
    type Item = Result<Event<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.data.len() {
            return None;
        }
        let event = self.read_event();
        if event.is_err() {
            // stop after the first malformed event
            self.pos = self.data.len();
        }
        Some(event)
    }
}

/// Encode `value` as a 7-bit little-endian varint.
#[cfg(test)]
pub(crate) fn encode_varint(mut value: usize, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(data: &[u8]) -> Result<Vec<Event<'_>>> {
        EventReader::new(data, 0).collect()
    }

    #[test]
    fn test_size_classes() {
        let data = [
            21, 0x00, // byte
            64, 0x34, 0x12, // word
            156, 0x78, 0x56, 0x34, 0x12, // dword
            196, 3, b'a', b'b', b'c', // data
        ];
        let events = read_all(&data).unwrap();

        assert_eq!(events.len(), 4);
        assert_eq!(events[0].value, EventValue::Byte(0));
        assert_eq!(events[1].value, EventValue::Word(0x1234));
        assert_eq!(events[2].value.as_u32(), Some(0x1234_5678));
        assert_eq!(events[3].id, 196);
        assert_eq!(events[3].value.as_data(), Some(&b"abc"[..]));
    }

    #[test]
    fn test_multi_byte_varint() {
        let payload = vec![7u8; 300];
        let mut data = vec![200];
        encode_varint(payload.len(), &mut data);
        assert_eq!(&data[1..], &[0xac, 0x02]);
        data.extend_from_slice(&payload);

        let events = read_all(&data).unwrap();
        assert_eq!(events[0].value.as_data().map(|d| d.len()), Some(300));
    }

    #[test]
    fn test_truncated_event_reports_offset() {
        let data = [21, 1, 64, 0x01];
        let mut reader = EventReader::new(&data, 100);

        assert!(reader.next().unwrap().is_ok());
        match reader.next() {
            Some(Err(FlpZipError::UnexpectedEof { offset })) => assert_eq!(offset, 104),
            other => panic!("expected eof error, got {:?}", other),
        }
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_data_length_past_end() {
        let data = [196, 10, b'x'];
        assert!(read_all(&data).is_err());
    }
}
