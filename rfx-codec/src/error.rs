//! Error types for the RemoteFX codec.

use thiserror::Error;

/// Errors that can occur while reading or writing RemoteFX data.
///
/// Most wire-level problems never reach the caller of
/// [`process_message`](crate::RfxContext::process_message): the parser logs
/// them and degrades (skipping a block or truncating the message). These
/// variants surface from the lower-level cursor and pipeline entry points,
/// and internally drive the parser's degradation decisions.
#[derive(Debug, Error)]
pub enum RfxError {
    /// The input buffer ended before a read could be satisfied.
    #[error("Unexpected end of data: need {needed} bytes, have {available}")]
    UnexpectedEof { needed: usize, available: usize },

    /// A declared block length pointed outside the input buffer.
    #[error("Seek out of range: target {target}, buffer length {len}")]
    SeekOutOfRange { target: usize, len: usize },

    /// A tile referenced a quantization table index past the parsed count.
    #[error("Quantization index {index} out of range ({count} tables)")]
    QuantIndexOutOfRange { index: u8, count: usize },

    /// Compose was asked for a pixel buffer smaller than the frame.
    #[error("Pixel buffer too small: need {needed} bytes, have {available}")]
    SourceTooSmall { needed: usize, available: usize },
}

pub type Result<T> = std::result::Result<T, RfxError>;
