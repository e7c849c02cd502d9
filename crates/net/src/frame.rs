//! Length-prefixed frame encoding/decoding
//!
//! Wire format: [4-byte big-endian length][JSON payload]
//! Maximum frame size: 256KB - a full snapshot for the largest hall is a
//! few kilobytes, anything bigger is a broken peer.
//!
//! A frame that carries invalid JSON surfaces as `Error::Protocol` *after*
//! the payload bytes have been consumed, so callers may skip it and keep
//! reading - the stream stays framed.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};
use crate::protocol::Message;

/// Maximum allowed frame size (256KB)
const MAX_FRAME_SIZE: usize = 256 * 1024;

fn close_on_eof(e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        Error::ConnectionClosed
    } else {
        Error::Io(e)
    }
}

/// Read a length-prefixed frame from a stream
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Message> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await.map_err(close_on_eof)?;

    let len = u32::from_be_bytes(len_buf) as usize;
    if len == 0 || len > MAX_FRAME_SIZE {
        return Err(Error::Protocol(format!(
            "Bad frame length {} (max {})",
            len, MAX_FRAME_SIZE
        )));
    }

    // The payload is consumed in full before parsing, so a bad payload
    // still leaves the stream positioned at the next frame.
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await.map_err(close_on_eof)?;
    Message::from_bytes(&payload).map_err(|e| Error::Protocol(format!("Invalid JSON: {e}")))
}

/// Write a length-prefixed frame to a stream
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, msg: &Message) -> Result<()> {
    let payload = msg
        .to_bytes()
        .map_err(|e| Error::Protocol(format!("Serialization failed: {e}")))?;
    if payload.len() > MAX_FRAME_SIZE {
        return Err(Error::Protocol(format!(
            "Message too large: {} bytes (max {})",
            payload.len(),
            MAX_FRAME_SIZE
        )));
    }

    writer.write_all(&(payload.len() as u32).to_be_bytes()).await?;
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}
