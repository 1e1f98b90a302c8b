//! FL Studio Project Format
//!
//! Native reader for `.flp` files, enough to recover the channel rack and
//! the samples its sampler channels point at.

pub mod event;
pub mod parser;

pub use event::{Event, EventReader, EventValue};
pub use parser::FlpParser;
