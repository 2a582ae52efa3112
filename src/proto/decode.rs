//! Body decoding: fixed-length and chunked transfer-encoding.
//!
//! Mirrors the chunk-size/chunk-data/trailer scan in the original's
//! `pbnc_fsm` body-reading states, but expressed as a small incremental
//! decoder driven by whatever the transport hands it, rather than a
//! character-at-a-time state machine. Overflow of the destination buffer is
//! always an error, never a truncation (§3 invariant 6).

use crate::buffer::BoundedBuffer;
use crate::error::{Error, Result};
use crate::transport::Socket;

/// Read exactly `len` bytes of body into `out`.
pub async fn read_fixed_length(socket: &mut Socket, len: usize, out: &mut BoundedBuffer) -> Result<()> {
    let mut remaining = len;
    let mut chunk = [0u8; 4096];
    while remaining > 0 {
        let want = remaining.min(chunk.len());
        let n = socket.read(&mut chunk[..want]).await?;
        if n == 0 {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed before content-length bytes were read",
            )));
        }
        out.append(&chunk[..n])?;
        remaining -= n;
    }
    Ok(())
}

/// Read until the peer closes the connection (no framing header present).
/// Used for the rare response that is neither chunked nor has a declared
/// length.
pub async fn read_until_close(socket: &mut Socket, out: &mut BoundedBuffer) -> Result<()> {
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        out.append(&chunk[..n])?;
    }
}

/// Read a chunked-encoding body to completion: each chunk is `<hex
/// size>\r\n<data>\r\n`, terminated by a zero-size chunk and an (ignored)
/// trailer section.
pub async fn read_chunked(socket: &mut Socket, out: &mut BoundedBuffer) -> Result<()> {
    loop {
        let size_line = socket.read_line(32).await?;
        let size_str = size_line.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_str, 16).map_err(|_| Error::BadChunkSize)?;
        if size == 0 {
            // Trailer headers, terminated by a blank line; none are acted on.
            loop {
                let trailer = socket.read_line(1024).await?;
                if trailer.is_empty() {
                    break;
                }
            }
            return Ok(());
        }

        let mut remaining = size;
        let mut buf = [0u8; 4096];
        while remaining > 0 {
            let want = remaining.min(buf.len());
            let n = socket.read(&mut buf[..want]).await?;
            if n == 0 {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed mid-chunk",
                )));
            }
            out.append(&buf[..n])?;
            remaining -= n;
        }
        // Each chunk's data is followed by a bare CRLF.
        let trailing = socket.read_line(2).await?;
        if !trailing.is_empty() {
            return Err(Error::BadChunkSize);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_size_line_parsing_ignores_extensions() {
        let line = "1a;ignored-extension";
        let size_str = line.split(';').next().unwrap().trim();
        assert_eq!(usize::from_str_radix(size_str, 16).unwrap(), 0x1a);
    }
}
