//! The central entity of the engine: one context per logical connection to
//! the service (§3).
//!
//! A context owns its configuration, its in-flight transaction state, its
//! subscribe cursor, and (when kept alive) its socket. Exactly one
//! transaction runs on a context at a time; a second call while one is
//! in-flight is rejected with [`Outcome::InProgress`] rather than queued or
//! blocked (§4.3) — mirrors the original's single `pb` struct instance per
//! context, guarded by a mutex the watcher thread and the calling thread
//! both take.

pub mod dispatch;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, Notify};

use crate::buffer::{BoundedBuffer, DEFAULT_REPLY_CAPACITY};
use crate::config::Config;
use crate::cursor::Cursor;
use crate::error::Outcome;
use crate::kind::TransactionKind;
use crate::proto::ConnState;
use crate::transport::Socket;

pub(crate) struct Inner {
    pub(crate) config: Config,
    pub(crate) kind: TransactionKind,
    pub(crate) conn_state: ConnState,
    pub(crate) cursor: Cursor,
    pub(crate) reply_buf: BoundedBuffer,
    pub(crate) socket: Option<Socket>,
    pub(crate) last_result: Outcome,
    /// The HTTP status of the most recently completed transaction, if it
    /// got as far as a response (§7, `last_http_code()`).
    pub(crate) status_code: Option<u16>,
    /// The raw server reply body of the most recently completed `publish`
    /// call, `None` if no publish has run yet or the call never reached a
    /// response (§7, `last_publish_result()`).
    pub(crate) last_publish_reply: Option<String>,
    /// The channel/group list the auto-heartbeat subsystem reads when
    /// deciding what to thump on this context's behalf (§4.5).
    pub(crate) channels: Vec<String>,
    pub(crate) groups: Vec<String>,
    /// Set once a subscribe or subscribe-v2 reply is sitting in
    /// `reply_buf` waiting to be drained via `get`/`get_channel`/`get_v2`.
    pub(crate) pending_v1: Option<crate::cursor::MessageQueueV1>,
    pub(crate) pending_v2: Option<crate::cursor::MessageQueueV2>,
}

/// A handle to a context. Cheaply cloneable; clones share the same
/// underlying state (the same "one in-flight transaction" discipline
/// applies across all of them, same as the original's pointer-to-struct
/// context handle).
///
/// `busy`/`cancel_requested`/`cancel_notify` live outside the data mutex on
/// purpose: a transaction holds `inner`'s lock for its entire run (it needs
/// the reply buffer and socket the whole time), so `cancel()` must be able
/// to signal it without waiting on that same lock (§4.4).
#[derive(Clone)]
pub struct Context {
    pub(crate) inner: Arc<Mutex<Inner>>,
    pub(crate) busy: Arc<AtomicBool>,
    pub(crate) cancel_requested: Arc<AtomicBool>,
    pub(crate) cancel_notify: Arc<Notify>,
}

impl Context {
    pub fn new(config: Config) -> Self {
        Context {
            inner: Arc::new(Mutex::new(Inner {
                config,
                kind: TransactionKind::None,
                conn_state: ConnState::Idle,
                cursor: Cursor::default(),
                reply_buf: BoundedBuffer::with_capacity(DEFAULT_REPLY_CAPACITY),
                socket: None,
                last_result: Outcome::Ok,
                status_code: None,
                last_publish_reply: None,
                channels: Vec::new(),
                groups: Vec::new(),
                pending_v1: None,
                pending_v2: None,
            })),
            busy: Arc::new(AtomicBool::new(false)),
            cancel_requested: Arc::new(AtomicBool::new(false)),
            cancel_notify: Arc::new(Notify::new()),
        }
    }

    /// The outcome of the most recently completed transaction. `Ok` before
    /// any transaction has ever run (§7).
    pub async fn last_result(&self) -> Outcome {
        self.inner.lock().await.last_result
    }

    /// What this context is doing right now, or `None` if idle.
    pub async fn kind(&self) -> TransactionKind {
        self.inner.lock().await.kind
    }

    /// The coarse connection state of this context's in-flight (or most
    /// recently finished) transaction (§9).
    pub async fn conn_state(&self) -> ConnState {
        self.inner.lock().await.conn_state
    }

    pub async fn cursor(&self) -> Cursor {
        self.inner.lock().await.cursor.clone()
    }

    /// The raw response body of the last completed transaction, as UTF-8.
    /// Used by callers that need to interpret a `PublishFailed`/`HttpError`
    /// body themselves rather than through a parsed message queue (§4.3).
    pub async fn last_http_response_body(&self) -> crate::error::Result<String> {
        let guard = self.inner.lock().await;
        guard.reply_buf.as_str().map(str::to_string)
    }

    /// The HTTP status code of the last completed transaction, or `None` if
    /// it never reached a response (connect/resolve/cancel/timeout) (§7).
    pub async fn last_http_code(&self) -> Option<u16> {
        self.inner.lock().await.status_code
    }

    /// The raw server reply body of the most recently completed
    /// `publish()` call (e.g. `[1,"Sent","1521..."]`). `None` if no publish
    /// has completed on this context yet (§7).
    pub async fn last_publish_result(&self) -> Option<String> {
        self.inner.lock().await.last_publish_reply.clone()
    }

    /// A best-effort human-readable message pulled out of the last
    /// response body, for callers that want to surface more than the
    /// outcome alphabet gives them. `None` if the body doesn't match either
    /// of the shapes the engine recognizes (§7).
    pub async fn get_error_message(&self) -> Option<String> {
        let guard = self.inner.lock().await;
        let body = guard.reply_buf.as_str().ok()?;
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        if let Some(message) = value.get(1).and_then(|v| v.as_str()) {
            return Some(message.to_string());
        }
        value
            .get("error")
            .and_then(|e| e.get("message").or(Some(e)))
            .and_then(|m| m.as_str())
            .map(str::to_string)
    }

    /// Request cancellation of an in-flight transaction. A no-op if the
    /// context is idle; takes effect at the next suspension point inside
    /// the running transaction (§4.4).
    pub fn cancel(&self) {
        if self.busy.load(Ordering::SeqCst) {
            self.cancel_requested.store(true, Ordering::SeqCst);
            self.cancel_notify.notify_waiters();
        }
    }

    /// Snapshot of the channel/group list this context last subscribed (or
    /// heartbeat-ed) to, used by the auto-heartbeat pairing logic (§4.5).
    pub async fn channel_info(&self) -> (Vec<String>, Vec<String>) {
        let guard = self.inner.lock().await;
        (guard.channels.clone(), guard.groups.clone())
    }

    pub(crate) async fn config_snapshot(&self) -> Config {
        self.inner.lock().await.config.clone()
    }
}
