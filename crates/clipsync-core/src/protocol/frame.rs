//! Length-prefixed frame codec for the clipsync wire protocol.
//!
//! Wire format:
//! ```text
//! [length:4][content:length]
//! ```
//! `length` is an unsigned big-endian integer; `content` is UTF-8 text.
//!
//! A frame with `length == 0` carries no content.  It is the keepalive /
//! no-op frame and must never be read as "the clipboard became empty".
//!
//! The protocol has no handshake, version byte, or acknowledgment.  Each
//! frame is a complete, self-contained clipboard state update.

use thiserror::Error;

/// Size of the length prefix in bytes.
pub const FRAME_HEADER_SIZE: usize = 4;

/// Largest content length a reader accepts (10 MiB).
pub const MAX_FRAME_SIZE: usize = 10 * 1024 * 1024;

/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// The declared (or requested) content length exceeds [`MAX_FRAME_SIZE`].
    #[error("frame too large: {declared} bytes (maximum {max})")]
    FrameTooLarge { declared: usize, max: usize },

    /// The byte slice does not yet hold a complete frame.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The stream ended part-way through a frame.
    #[error("truncated frame: expected {expected} bytes, received {received}")]
    Truncated { expected: usize, received: usize },

    /// The stream ended cleanly on a frame boundary.
    #[error("connection closed")]
    ConnectionClosed,

    /// The content bytes are not valid UTF-8.
    #[error("frame content is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    /// The underlying stream failed.
    #[error("stream I/O error ({kind:?}): {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
    },
}

impl FrameError {
    /// Returns `true` when the remote side simply closed the stream between frames.
    pub fn is_clean_close(&self) -> bool {
        matches!(self, FrameError::ConnectionClosed)
    }
}

impl From<std::io::Error> for FrameError {
    fn from(e: std::io::Error) -> Self {
        FrameError::Io {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes `content` as one frame: the 4-byte length header followed by the
/// UTF-8 bytes.
///
/// The empty string encodes to the bare 4-byte zero header (a keepalive).
///
/// # Errors
///
/// Returns [`FrameError::FrameTooLarge`] if `content` is longer than
/// [`MAX_FRAME_SIZE`] bytes, since the peer would reject such a frame.
///
/// # Examples
///
/// ```rust
/// use clipsync_core::protocol::{decode_frame, encode_frame};
///
/// let bytes = encode_frame("hello").unwrap();
/// assert_eq!(&bytes[..4], &[0, 0, 0, 5]);
/// let (decoded, consumed) = decode_frame(&bytes).unwrap();
/// assert_eq!(decoded, "hello");
/// assert_eq!(consumed, bytes.len());
/// ```
pub fn encode_frame(content: &str) -> Result<Vec<u8>, FrameError> {
    let len = content.len();
    check_length(len)?;

    let mut buf = Vec::with_capacity(FRAME_HEADER_SIZE + len);
    buf.extend_from_slice(&(len as u32).to_be_bytes());
    buf.extend_from_slice(content.as_bytes());
    Ok(buf)
}

/// Decodes one frame from the beginning of `bytes`.
///
/// Returns the content and the total number of bytes consumed (header +
/// content), so a caller holding an accumulation buffer can advance past it.
///
/// # Errors
///
/// - [`FrameError::InsufficientData`] if `bytes` holds less than one frame.
/// - [`FrameError::FrameTooLarge`] if the header declares more than
///   [`MAX_FRAME_SIZE`] bytes.  This is reported as soon as the header is
///   available, before any content is required.
/// - [`FrameError::InvalidUtf8`] if the content is not UTF-8.
pub fn decode_frame(bytes: &[u8]) -> Result<(String, usize), FrameError> {
    if bytes.len() < FRAME_HEADER_SIZE {
        return Err(FrameError::InsufficientData {
            needed: FRAME_HEADER_SIZE,
            available: bytes.len(),
        });
    }

    let len = parse_header([bytes[0], bytes[1], bytes[2], bytes[3]])?;
    let total = FRAME_HEADER_SIZE + len;
    if bytes.len() < total {
        return Err(FrameError::InsufficientData {
            needed: total,
            available: bytes.len(),
        });
    }

    let content = content_from_bytes(bytes[FRAME_HEADER_SIZE..total].to_vec())?;
    Ok((content, total))
}

/// Interprets a 4-byte header and validates the declared length.
///
/// # Errors
///
/// Returns [`FrameError::FrameTooLarge`] when the length exceeds the maximum.
pub fn parse_header(header: [u8; FRAME_HEADER_SIZE]) -> Result<usize, FrameError> {
    let len = u32::from_be_bytes(header) as usize;
    check_length(len)?;
    Ok(len)
}

pub(crate) fn content_from_bytes(body: Vec<u8>) -> Result<String, FrameError> {
    String::from_utf8(body).map_err(|e| FrameError::InvalidUtf8(e.utf8_error().to_string()))
}

fn check_length(len: usize) -> Result<(), FrameError> {
    if len > MAX_FRAME_SIZE {
        return Err(FrameError::FrameTooLarge {
            declared: len,
            max: MAX_FRAME_SIZE,
        });
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
