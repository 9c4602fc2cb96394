//! Incremental frame decoder for the exporter's byte stream.
//!
//! The stream is `"QPERFSTREAM\0"`, a 4-byte little-endian version, then
//! length-framed event payloads. The decoder is fed whatever bytes are
//! currently available and polled for records; a poll with too few bytes
//! buffered makes no progress and simply waits for the next feed. Drivers
//! must poll until no progress is reported so every complete frame already
//! buffered is drained before waiting for more input.
//!
//! Any protocol violation moves the decoder into a terminal failed state:
//! no further work is performed and the parse is permanently failed.

use log::{debug, warn};

use super::records::{EventCodec, EventRecord, StreamVersion};
use crate::domain::ProtocolError;

/// Fixed stream prologue, including the trailing NUL.
pub const STREAM_MAGIC: &[u8; 12] = b"QPERFSTREAM\0";

/// Sanity cap on a single frame's declared length. Real frames are tiny;
/// anything this large means a desynchronized or hostile stream.
const MAX_FRAME_LEN: u32 = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy)]
enum State {
    Magic,
    Version,
    FrameHeader { codec: EventCodec },
    FrameBody { codec: EventCodec, len: usize },
    Failed,
}

/// Resumable state machine over a growing byte buffer.
pub struct StreamDecoder {
    state: State,
    buf: Vec<u8>,
    pos: usize,
}

impl StreamDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self { state: State::Magic, buf: Vec::with_capacity(1024), pos: 0 }
    }

    /// Append freshly read bytes to the internal buffer.
    pub fn feed(&mut self, bytes: &[u8]) {
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
        self.buf.extend_from_slice(bytes);
    }

    /// True once a protocol violation has permanently failed the decoder.
    #[must_use]
    pub fn failed(&self) -> bool {
        matches!(self.state, State::Failed)
    }

    /// Stream version, once the prologue has been decoded.
    #[must_use]
    pub fn version(&self) -> Option<StreamVersion> {
        match self.state {
            State::FrameHeader { codec } | State::FrameBody { codec, .. } => {
                Some(codec.version())
            }
            _ => None,
        }
    }

    fn buffered(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take_u32(&mut self) -> u32 {
        let bytes = [
            self.buf[self.pos],
            self.buf[self.pos + 1],
            self.buf[self.pos + 2],
            self.buf[self.pos + 3],
        ];
        self.pos += 4;
        u32::from_le_bytes(bytes)
    }

    fn take_i32(&mut self) -> i32 {
        self.take_u32() as i32
    }

    /// Decode the next record out of the buffered bytes.
    ///
    /// Returns `Ok(None)` when no complete frame is buffered (no progress);
    /// the prologue states are worked through internally without returning.
    pub fn poll(&mut self) -> Result<Option<EventRecord>, ProtocolError> {
        loop {
            match self.state {
                State::Magic => {
                    if self.buffered() < STREAM_MAGIC.len() {
                        return Ok(None);
                    }
                    let matches = {
                        let head = &self.buf[self.pos..self.pos + STREAM_MAGIC.len()];
                        head == STREAM_MAGIC
                    };
                    self.pos += STREAM_MAGIC.len();
                    if !matches {
                        warn!("failed to read stream magic");
                        self.state = State::Failed;
                        return Err(ProtocolError::BadMagic);
                    }
                    self.state = State::Version;
                }
                State::Version => {
                    if self.buffered() < 4 {
                        return Ok(None);
                    }
                    let version = StreamVersion(self.take_i32());
                    debug!("stream version is {}", version.0);
                    self.state = State::FrameHeader { codec: EventCodec::new(version) };
                }
                State::FrameHeader { codec } => {
                    if self.buffered() < 4 {
                        return Ok(None);
                    }
                    let len = self.take_u32();
                    if len > MAX_FRAME_LEN {
                        warn!("frame length {len} exceeds the sanity cap");
                        self.state = State::Failed;
                        return Err(ProtocolError::OversizedFrame { len });
                    }
                    debug!("next frame length is {len}");
                    self.state = State::FrameBody { codec, len: len as usize };
                }
                State::FrameBody { codec, len } => {
                    if self.buffered() < len {
                        return Ok(None);
                    }
                    let start = self.pos;
                    self.pos += len;
                    match codec.decode(&self.buf[start..start + len]) {
                        Ok(record) => {
                            debug!("decoded: {record:?}");
                            self.state = State::FrameHeader { codec };
                            return Ok(Some(record));
                        }
                        Err(err) => {
                            self.state = State::Failed;
                            return Err(err);
                        }
                    }
                }
                State::Failed => return Ok(None),
            }
        }
    }
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}
