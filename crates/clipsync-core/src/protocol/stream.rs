//! Async frame reader and writer over any tokio byte stream.
//!
//! TCP is a *stream* protocol: one `read()` may return part of a frame or
//! several frames at once.  [`read_frame`] loops until it has exactly the
//! 4-byte header and then exactly the declared number of content bytes, so
//! callers always see whole frames.
//!
//! Both helpers are generic over `AsyncRead` / `AsyncWrite`, which lets the
//! same code run over a `TcpStream`, one half of a split stream, or an
//! in-memory `tokio::io::duplex` pipe in tests.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::frame::{
    content_from_bytes, encode_frame, parse_header, FrameError, FRAME_HEADER_SIZE,
};

/// Reads exactly one frame from `reader`.
///
/// An empty string is a keepalive frame.
///
/// # Errors
///
/// - [`FrameError::ConnectionClosed`] if the stream ends before any header byte.
/// - [`FrameError::Truncated`] if the stream ends inside the header or body.
/// - [`FrameError::FrameTooLarge`] if the header declares more than the
///   maximum; the body is neither allocated nor read, and the connection
///   must be considered unusable.
/// - [`FrameError::InvalidUtf8`] if the content is not UTF-8.
/// - [`FrameError::Io`] for any other stream failure.
pub async fn read_frame<R>(reader: &mut R) -> Result<String, FrameError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut header = [0u8; FRAME_HEADER_SIZE];
    let got = read_until_full(reader, &mut header).await?;
    if got == 0 {
        return Err(FrameError::ConnectionClosed);
    }
    if got < FRAME_HEADER_SIZE {
        return Err(FrameError::Truncated {
            expected: FRAME_HEADER_SIZE,
            received: got,
        });
    }

    let len = parse_header(header)?;
    if len == 0 {
        return Ok(String::new());
    }

    let mut body = vec![0u8; len];
    let got = read_until_full(reader, &mut body).await?;
    if got < len {
        return Err(FrameError::Truncated {
            expected: len,
            received: got,
        });
    }

    content_from_bytes(body)
}

/// Encodes `content` and writes the whole frame to `writer`, then flushes.
///
/// Passing an empty string sends a keepalive frame.
///
/// # Errors
///
/// Returns [`FrameError::FrameTooLarge`] for oversized content and
/// [`FrameError::Io`] if the write fails.
pub async fn write_frame<W>(writer: &mut W, content: &str) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let bytes = encode_frame(content)?;
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// Fills `buf` from `reader`, stopping early only at end of stream.
///
/// Returns the number of bytes actually read.
async fn read_until_full<R>(reader: &mut R, buf: &mut [u8]) -> Result<usize, FrameError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
