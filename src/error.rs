//! Error types for .osr decoding

use std::io;

use crate::header::GameMode;

/// Error type for replay decoding operations.
///
/// Decoding is all-or-nothing: any variant here means the input was rejected
/// as a whole and no partial replay is available.
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    /// A structurally valid replay for a game mode this decoder does not
    /// handle. The mode is named so batch callers can report it.
    #[error("{0} replays are not supported")]
    UnsupportedMode(GameMode),

    /// Structural damage in the fixed-layout header region.
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// A life-graph entry that is not `offset|fraction`.
    #[error("Malformed life graph entry: {0}")]
    MalformedLifeGraph(String),

    /// The LZMA payload could not be decompressed into valid text.
    #[error("Decompression error: {0}")]
    DecompressionFailure(String),

    /// An event record that is not `w|x|y|z` with parseable fields, or
    /// whose time delta overflows the cumulative clock.
    #[error("Malformed event record: {0}")]
    MalformedEventRecord(String),

    /// Input ended before a structure the header promised.
    #[error("Unexpected end of input")]
    TruncatedInput,

    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(io::Error),
}

// Short reads surface as `TruncatedInput`; every other IO failure passes
// through untouched. This lets `?` on byteorder reads produce the format
// error directly.
impl From<io::Error> for DecodeError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => DecodeError::TruncatedInput,
            _ => DecodeError::Io(e),
        }
    }
}

/// Result type for decoding operations
pub type Result<T> = std::result::Result<T, DecodeError>;
