//! Line codec for the stdio transport.
//!
//! One JSON-RPC message per line, UTF-8, terminated by `\n`. A line longer
//! than the configured cap is discarded up to its newline and reported as
//! [`Frame::TooLarge`]; the stream stays usable.

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Default cap on a single inbound message.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 4 * 1024 * 1024;

/// One inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Message(String),
    /// The line exceeded the cap and was skipped.
    TooLarge,
    /// The line was not valid UTF-8.
    InvalidUtf8,
}

/// Read one line. Returns `None` on clean EOF; `Err` only for I/O failures.
pub async fn read_message<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    max_message_bytes: usize,
) -> std::io::Result<Option<Frame>> {
    let mut buf = Vec::new();
    let limit = max_message_bytes as u64 + 1;
    let read = (&mut *reader).take(limit).read_until(b'\n', &mut buf).await?;
    if read == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if buf.len() > max_message_bytes {
        discard_line(reader).await?;
        return Ok(Some(Frame::TooLarge));
    }

    Ok(Some(match String::from_utf8(buf) {
        Ok(line) => Frame::Message(line),
        Err(_) => Frame::InvalidUtf8,
    }))
}

/// Consume input through the next `\n` (or EOF) without buffering it.
async fn discard_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<()> {
    loop {
        let (consumed, done) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(());
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (available.len(), false),
            }
        };
        reader.consume(consumed);
        if done {
            return Ok(());
        }
    }
}

/// Write one message followed by `\n` and flush.
pub async fn write_message<W: AsyncWrite + Unpin, T: Serialize>(
    writer: &mut W,
    message: &T,
) -> std::io::Result<()> {
    let mut payload = serde_json::to_vec(message).map_err(|e| {
        tracing::error!("JSON encoding failed: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidData, e)
    })?;
    payload.push(b'\n');
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}
