//! Wire protocol for the exporter's event stream.
//!
//! Layered bottom-up: `wire` reads little-endian fields out of one frame
//! payload, `records` turns a payload into a typed event record, `stream`
//! runs the resumable framing state machine over partial input.

pub mod records;
pub mod stream;
pub mod wire;

pub use records::{EventCodec, EventRecord, RecordType, StreamVersion};
pub use stream::{StreamDecoder, STREAM_MAGIC};
