//! The single-socket, non-blocking transport underneath a context's
//! transaction FSM (§4.2).
//!
//! Where the original expresses "non-blocking" as an explicit
//! connect/send/read state pair driven by repeated `poll()` wakeups, this
//! reimplementation leans on the design note in §9: native `async`/`await`
//! gives the same contract — a transaction suspends at an `.await` point and
//! resumes "from the same logical point" when the runtime next wakes it —
//! without hand-rolling a state enum per I/O step. The socket itself is
//! still owned by exactly one context at a time and touched by exactly one
//! task at a time (the watcher runtime's own task for that context).

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::config::{Config, TlsOption};
use crate::error::{Error, Result};

/// Either a plain TCP stream or a TLS stream over one, behind a single
/// `AsyncRead`/`AsyncWrite` façade. The FSM and parser never need to know
/// which.
pub enum Socket {
    Plain(BufReader<TcpStream>),
    #[cfg(feature = "tls")]
    Tls(BufReader<tokio_rustls::client::TlsStream<TcpStream>>),
}

impl Socket {
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = match self {
            Socket::Plain(s) => s.read(buf).await?,
            #[cfg(feature = "tls")]
            Socket::Tls(s) => s.read(buf).await?,
        };
        Ok(n)
    }

    /// Read up to and including the next `\r\n`, returning the line without
    /// the terminator. Used for the status line and each header line
    /// (§4.1's `HTTP_READ_LINE` state).
    pub async fn read_line(&mut self, max_len: usize) -> Result<String> {
        use tokio::io::AsyncBufReadExt;
        let mut line = String::new();
        let n = match self {
            Socket::Plain(s) => s.read_line(&mut line).await?,
            #[cfg(feature = "tls")]
            Socket::Tls(s) => s.read_line(&mut line).await?,
        };
        if n == 0 {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed while reading a header line",
            )));
        }
        if line.len() > max_len {
            return Err(Error::ReplyBufferOverrun {
                capacity: max_len,
                needed: line.len(),
            });
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }

    pub async fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        match self {
            Socket::Plain(s) => s.write_all(bytes).await?,
            #[cfg(feature = "tls")]
            Socket::Tls(s) => s.write_all(bytes).await?,
        }
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        match self {
            Socket::Plain(s) => s.get_mut().shutdown().await?,
            #[cfg(feature = "tls")]
            Socket::Tls(s) => s.get_mut().shutdown().await?,
        }
        Ok(())
    }
}

/// Resolve + connect (+ optional TLS handshake), honoring `config`'s
/// connect timeout. Mirrors `pbpal_resolv_and_connect` / the `TRYING` state
/// of the original FSM collapsed into one async call.
pub async fn connect(config: &Config) -> Result<Socket> {
    let addr = (config.origin.as_str(), config.port);
    let connect_fut = TcpStream::connect(addr);
    let stream = match tokio::time::timeout(config.connect_timeout, connect_fut).await {
        Ok(Ok(s)) => s,
        Ok(Err(e)) => return Err(Error::Connect(e)),
        Err(_) => {
            return Err(Error::Connect(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "connect timed out",
            )))
        }
    };
    stream.set_nodelay(true).map_err(Error::Connect)?;

    match config.tls {
        TlsOption::Disabled => Ok(Socket::Plain(BufReader::new(stream))),
        TlsOption::Enabled | TlsOption::FallbackToPlain => {
            #[cfg(feature = "tls")]
            {
                tls_connect(config, stream).await
            }
            #[cfg(not(feature = "tls"))]
            {
                Ok(Socket::Plain(BufReader::new(stream)))
            }
        }
    }
}

// Trust anchor provisioning (a system cert store, a pinned bundle, or a
// custom CA) is TLS-provider plumbing and stays out of scope here; callers
// that enable the `tls` feature are expected to populate `root_store`
// through a future `Config` hook before this sees real traffic.
#[cfg(feature = "tls")]
async fn tls_connect(config: &Config, stream: TcpStream) -> Result<Socket> {
    use std::sync::Arc;
    use tokio_rustls::rustls::{self, RootCertStore};
    use tokio_rustls::TlsConnector;

    let root_store = RootCertStore::empty();
    let client_config = rustls::ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(root_store)
        .with_no_client_auth();
    let connector = TlsConnector::from(Arc::new(client_config));
    let server_name = rustls::ServerName::try_from(config.origin.as_str()).map_err(|_| {
        Error::Connect(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "bad server name",
        ))
    })?;
    let tls_stream = connector
        .connect(server_name, stream)
        .await
        .map_err(Error::Connect)?;
    Ok(Socket::Tls(BufReader::new(tls_stream)))
}

/// The default idle duration a kept-alive socket is allowed to sit unused
/// before the watcher closes it (§4.5/§9; mirrors `KeepAliveIdle`).
pub const DEFAULT_KEEP_ALIVE_IDLE: Duration = Duration::from_secs(60);
