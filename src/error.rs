//! Transaction outcomes and the internal error type.
//!
//! [`Outcome`] is the terminal classification of a transaction (§7 of the
//! design): every public transaction method resolves to one of these, and it
//! is returned *by value*, not wrapped in a `Result` — `PUBLISH_FAILED`,
//! `HTTP_ERROR` and friends are ordinary outcomes a caller inspects, not
//! failures of the Rust API itself.
//!
//! [`Error`] is the ordinary `std::error::Error` used internally by the
//! transport and parsing layers; it gets folded into an `Outcome` at the
//! point a transaction finishes.

use std::fmt;

/// The terminal classification of a transaction.
///
/// Mirrors the outcome alphabet: every transaction ends in exactly one of
/// these, latched onto the context and readable via
/// [`crate::context::Context::last_result`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Transaction completed; response parsed.
    Ok,
    /// In-flight. Never observed by a caller outside the engine; internal
    /// bookkeeping value between "kicked the state machine" and "latched".
    Started,
    /// Rejected: another transaction is already running on this context.
    InProgress,
    /// No outcome arrived within the configured transaction timeout.
    Timeout,
    /// DNS resolution failed.
    AddrResolutionFailed,
    /// TCP connect failed.
    ConnectFailed,
    /// Framing or truncation error on the wire.
    IoError,
    /// Non-2xx status on an otherwise well-formed response.
    HttpError,
    /// Response body did not match the expected JSON shape.
    FormatError,
    /// `cancel()` was invoked before natural completion.
    Cancelled,
    /// Server rejected a publish; a sub-reason may be recoverable from the
    /// response body via [`crate::context::Context::last_http_response_body`].
    PublishFailed,
    /// Caller gave no channel and no group.
    InvalidChannel,
    /// Request URL or body does not fit the request buffer.
    TxBuffTooSmall,
    /// Allocation failed.
    OutOfMemory,
    /// Invariant violation; always a bug, never a recoverable condition.
    InternalError,
}

impl Outcome {
    /// True for every outcome other than `Started` — i.e. the context's
    /// last-result slot holds something a caller can act on.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::Started)
    }

    pub fn is_ok(self) -> bool {
        matches!(self, Outcome::Ok)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Ok => "ok",
            Outcome::Started => "started",
            Outcome::InProgress => "in progress",
            Outcome::Timeout => "timeout",
            Outcome::AddrResolutionFailed => "address resolution failed",
            Outcome::ConnectFailed => "connect failed",
            Outcome::IoError => "i/o error",
            Outcome::HttpError => "http error",
            Outcome::FormatError => "format error",
            Outcome::Cancelled => "cancelled",
            Outcome::PublishFailed => "publish failed",
            Outcome::InvalidChannel => "invalid channel",
            Outcome::TxBuffTooSmall => "request buffer too small",
            Outcome::OutOfMemory => "out of memory",
            Outcome::InternalError => "internal error",
        };
        f.write_str(s)
    }
}

/// Errors raised by the transport and protocol layers before a transaction
/// has an [`Outcome`] to latch. Every variant has an obvious mapping to one;
/// see [`Error::as_outcome`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("dns resolution failed: {0}")]
    Resolve(#[source] std::io::Error),

    #[error("connect failed: {0}")]
    Connect(#[source] std::io::Error),

    #[error("socket i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("status line did not start with HTTP/1.x")]
    BadStatusLine,

    #[error("chunk size line was not valid hex")]
    BadChunkSize,

    #[error("reply buffer capacity ({capacity}) exceeded by response of {needed} bytes")]
    ReplyBufferOverrun { capacity: usize, needed: usize },

    #[error("request buffer capacity ({capacity}) exceeded by request of {needed} bytes")]
    RequestBufferOverrun { capacity: usize, needed: usize },

    #[error("response body did not match the expected shape: {0}")]
    Format(&'static str),

    #[error("transaction was cancelled")]
    Cancelled,
}

impl Error {
    /// Folds a transport/protocol failure into the outcome alphabet a
    /// caller actually sees.
    pub fn as_outcome(&self) -> Outcome {
        match self {
            Error::Resolve(_) => Outcome::AddrResolutionFailed,
            Error::Connect(_) => Outcome::ConnectFailed,
            Error::Io(_) => Outcome::IoError,
            Error::BadStatusLine | Error::BadChunkSize => Outcome::IoError,
            Error::ReplyBufferOverrun { .. } => Outcome::IoError,
            Error::RequestBufferOverrun { .. } => Outcome::TxBuffTooSmall,
            Error::Format(_) => Outcome::FormatError,
            Error::Cancelled => Outcome::Cancelled,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
