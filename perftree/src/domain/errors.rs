//! Structured error types for perftree
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! The three enums mirror the three failure classes: protocol errors abort
//! the decoder permanently, session errors cover the environment and the
//! exporter process, export errors cover the optional JSON output.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal wire-protocol violations. Any of these moves the stream decoder
/// into its terminal failed state; the parse cannot be resumed.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("invalid magic bytes at stream start")]
    BadMagic,

    #[error("invalid record type tag {0}")]
    InvalidRecordType(i8),

    #[error("record type {tag} left {leftover} bytes unconsumed in its frame")]
    TrailingBytes { tag: i8, leftover: usize },

    #[error("record payload truncated: needed {needed} bytes, {remaining} available")]
    TruncatedRecord { needed: usize, remaining: usize },

    #[error("frame length {len} exceeds the sanity cap")]
    OversizedFrame { len: u32 },

    #[error("string definition id {id} does not match table size {expected}")]
    NonMonotonicStringId { id: i32, expected: usize },

    #[error("location definition id {id} does not match table size {expected}")]
    NonMonotonicLocationId { id: i32, expected: usize },

    #[error("symbol definition id {id} has no location entry ({defined} defined)")]
    UnknownSymbolId { id: i32, defined: usize },
}

/// Failures of a whole parse session: unusable input, exporter process
/// trouble, or a protocol error bubbled up from the decoder. Exactly one
/// of these is delivered to the caller in place of the results bundle.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("file '{}' does not exist", .0.display())]
    InputMissing(PathBuf),

    #[error("'{}' is not a file", .0.display())]
    InputNotAFile(PathBuf),

    #[error("file '{}' is not readable", .0.display())]
    InputNotReadable(PathBuf),

    #[error("failed to find the {0} binary")]
    ExporterNotFound(String),

    #[error("failed to start the {binary} process: {source}")]
    ExporterStart {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("the {binary} binary exited with code {code}")]
    ExporterExit { binary: String, code: i32 },

    #[error("i/o error while reading exporter output: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("parse session ended without delivering a result")]
    SessionAborted,
}

/// Errors from the optional JSON results export.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
