//! Bounded byte buffers backing a [`crate::context::Context`].
//!
//! The request buffer holds the formatted HTTP path (and, for POST/PATCH, a
//! JSON body) before it is written to the socket. The reply buffer
//! accumulates the response body across possibly many short reads or
//! chunks. Both are fixed-capacity: exceeding capacity is a protocol-level
//! error (`TX_BUFF_TOO_SMALL` / `IO_ERROR`), never a silent reallocation —
//! mirrors the fixed on-stack buffers of the original design (§3 invariant
//! 6) without actually using fixed-size arrays, since Rust gives us a
//! cheaper way to enforce the same ceiling.

use crate::error::{Error, Result};

/// Default capacity for [`Context`](crate::context::Context) request
/// buffers: enough for a long channel/group list URL-encoded into a query
/// string.
pub const DEFAULT_REQUEST_CAPACITY: usize = 8 * 1024;

/// Default capacity for reply buffers: enough for a subscribe-v2 long-poll
/// response carrying a modest batch of messages.
pub const DEFAULT_REPLY_CAPACITY: usize = 64 * 1024;

/// A byte buffer with a hard capacity ceiling.
#[derive(Debug, Clone)]
pub struct BoundedBuffer {
    data: Vec<u8>,
    capacity: usize,
}

impl BoundedBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        BoundedBuffer {
            data: Vec::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.data).map_err(|_| Error::Format("reply is not valid utf-8"))
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Set the buffer contents wholesale, failing if they don't fit.
    pub fn set(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > self.capacity {
            return Err(Error::RequestBufferOverrun {
                capacity: self.capacity,
                needed: bytes.len(),
            });
        }
        self.data.clear();
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Append bytes, failing (without partial mutation) if the result would
    /// exceed capacity. Used while accumulating a response body.
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        if self.data.len() + bytes.len() > self.capacity {
            return Err(Error::ReplyBufferOverrun {
                capacity: self.capacity,
                needed: self.data.len() + bytes.len(),
            });
        }
        self.data.extend_from_slice(bytes);
        Ok(())
    }
}

impl Default for BoundedBuffer {
    fn default() -> Self {
        BoundedBuffer::with_capacity(DEFAULT_REQUEST_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_respects_capacity() {
        let mut buf = BoundedBuffer::with_capacity(4);
        assert!(buf.append(b"ab").is_ok());
        assert!(buf.append(b"cd").is_ok());
        assert_eq!(buf.len(), 4);
        let err = buf.append(b"e").unwrap_err();
        assert_eq!(err.as_outcome(), crate::error::Outcome::IoError);
    }

    #[test]
    fn set_overflow_is_tx_buff_too_small() {
        let mut buf = BoundedBuffer::with_capacity(4);
        let err = buf.set(b"too long").unwrap_err();
        assert_eq!(err.as_outcome(), crate::error::Outcome::TxBuffTooSmall);
    }
}
