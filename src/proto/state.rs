//! The coarse connection state a context's transaction is in.
//!
//! The original FSM (`enum pubnub_state` in `pubnub_netcore.h`) has roughly
//! thirty states because it has to encode every point a non-blocking
//! `connect()`/`send()`/`recv()` call can return `EWOULDBLOCK` and need a
//! re-poll. Driving the same protocol with `async`/`await` collapses most of
//! that into the suspension points of [`crate::proto::conn::run`] itself;
//! what's left to track explicitly is the handful of states a caller can
//! observe or that the cancel/timeout paths need to reason about (§9).

/// Where a context's in-flight transaction currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnState {
    /// No transaction running.
    Idle,
    /// Resolving + connecting (or reusing a kept-alive socket).
    Connecting,
    /// Request written, waiting for the status line.
    AwaitingResponse,
    /// Status line and headers read; draining the body.
    ReadingBody,
    /// Body fully read; outcome latched, context ready for `finish()`.
    Finished,
    /// `cancel()` observed; unwinding to `Finished` with `Outcome::Cancelled`.
    Cancelling,
}

impl Default for ConnState {
    fn default() -> Self {
        ConnState::Idle
    }
}

impl ConnState {
    pub fn is_idle(self) -> bool {
        matches!(self, ConnState::Idle)
    }

    pub fn is_in_progress(self) -> bool {
        matches!(
            self,
            ConnState::Connecting | ConnState::AwaitingResponse | ConnState::ReadingBody | ConnState::Cancelling
        )
    }
}
