//! The per-transaction request/response cycle (§4.1).
//!
//! This is the direct replacement for `pbnc_fsm`: connect-or-reuse, write
//! the request, read the status line, fold the headers, then drain the
//! body with whichever framing the headers declared. Every `.await` here is
//! a point the original would re-enter `pbnc_fsm` on the next socket-ready
//! event; an `async fn` gives the same resumption behavior for free (§9).

use crate::buffer::BoundedBuffer;
use crate::config::Config;
use crate::error::{Outcome, Result};
use crate::proto::decode::{read_chunked, read_fixed_length, read_until_close};
use crate::proto::encode::{encode_request, Method};
use crate::proto::parse::{fold_header_line, parse_status_line, BodyFraming, Connection, Headers};
use crate::transport::{connect, Socket};

/// The result of running one transaction's request/response cycle. Owns
/// the reply buffer it filled, so the caller can hand one in and get it
/// back regardless of which branch of a `select!` resolves first.
pub struct Reply {
    pub status_code: u16,
    pub keep_socket: Option<Socket>,
    pub reply_buf: BoundedBuffer,
}

/// Run one HTTP exchange to completion.
///
/// `socket` is `Some` when the caller is reusing a kept-alive connection
/// from a previous transaction on this context (§4.5's idle-timer
/// collaborator decides when that socket gets closed instead of reused).
pub async fn run(
    config: &Config,
    socket: Option<Socket>,
    method: Method,
    path_and_query: &str,
    body: Option<&str>,
    mut reply_buf: BoundedBuffer,
) -> Result<Reply> {
    let mut socket = match socket {
        Some(s) => s,
        None => connect(config).await?,
    };

    let request = encode_request(config, method, path_and_query, body)?;
    socket.write_all(&request).await?;

    let status_line = socket.read_line(256).await?;
    let status = parse_status_line(&status_line)?;

    let mut headers = Headers::default();
    loop {
        let line = socket.read_line(4096).await?;
        if line.is_empty() {
            break;
        }
        fold_header_line(&line, &mut headers)?;
    }

    reply_buf.clear();
    match headers.framing {
        Some(BodyFraming::Fixed(len)) => read_fixed_length(&mut socket, len, &mut reply_buf).await?,
        Some(BodyFraming::Chunked) => read_chunked(&mut socket, &mut reply_buf).await?,
        None => read_until_close(&mut socket, &mut reply_buf).await?,
    }

    let keep_socket = if config.keep_alive && headers.connection != Some(Connection::Close) {
        Some(socket)
    } else {
        socket.shutdown().await.ok();
        None
    };

    Ok(Reply {
        status_code: status.code,
        keep_socket,
        reply_buf,
    })
}

/// Fold an HTTP status code into the outcome alphabet: only 2xx is
/// `Outcome::Ok`, matching `pbnc_parse_http_code`'s caller in the original
/// (anything else latches `PNR_HTTP_ERROR` and leaves the body for the
/// specific operation to interpret, e.g. a publish failure reason).
pub fn status_to_outcome(code: u16) -> Outcome {
    if (200..300).contains(&code) {
        Outcome::Ok
    } else {
        Outcome::HttpError
    }
}

/// What a transaction settled to, plus everything the caller needs to
/// latch back onto the context: the outcome, the kept-alive socket (if
/// any), and the reply buffer (refilled on success, handed back empty on
/// failure so the caller never loses ownership of it).
pub struct Settled {
    pub outcome: Outcome,
    pub status_code: Option<u16>,
    pub keep_socket: Option<Socket>,
    pub reply_buf: BoundedBuffer,
}

/// Run a transaction to its [`Outcome`].
pub async fn run_to_outcome(
    config: &Config,
    socket: Option<Socket>,
    method: Method,
    path_and_query: &str,
    body: Option<&str>,
    reply_buf: BoundedBuffer,
) -> Settled {
    let capacity = reply_buf.capacity();
    match run(config, socket, method, path_and_query, body, reply_buf).await {
        Ok(reply) => Settled {
            outcome: status_to_outcome(reply.status_code),
            status_code: Some(reply.status_code),
            keep_socket: reply.keep_socket,
            reply_buf: reply.reply_buf,
        },
        Err(e) => {
            tracing::debug!(error = %e, "transaction i/o failed");
            Settled {
                outcome: e.as_outcome(),
                status_code: None,
                keep_socket: None,
                reply_buf: BoundedBuffer::with_capacity(capacity),
            }
        }
    }
}
