//! Client transaction engine for a publish/subscribe messaging network.
//!
//! The crate is organized around [`context::Context`]: one context is one
//! logical connection to the service, driving exactly one transaction at a
//! time through [`proto::conn::run`]'s request/response cycle. A
//! [`watcher::Watcher`] runs the auto-heartbeat pool in the background;
//! everything else — what URL a given operation formats, how the response
//! body is framed and decoded, where the subscribe cursor lives — is a
//! module of its own so that the pieces can be tested (and read)
//! independently of the network.

pub mod buffer;
pub mod config;
pub mod context;
pub mod cursor;
pub mod error;
pub mod heartbeat;
pub mod kind;
pub mod ops;
pub mod proto;
#[cfg(feature = "test-util")]
pub mod tests_support;
pub mod transport;
pub mod url_encode;
pub mod watcher;

pub use config::{Config, Keys, ProxyConfig, TlsOption};
pub use context::Context;
pub use cursor::{Cursor, MessageQueueV1, MessageQueueV2, MessageV2};
pub use error::{Error, Outcome, Result};
pub use kind::TransactionKind;
pub use watcher::Watcher;
