//! Transaction dispatch discipline (§4.3): lock, reject if busy, validate
//! and format, kick the FSM, latch the outcome, unlock.
//!
//! Every public transaction method on [`Context`] is a thin wrapper around
//! [`Context::dispatch`] that only differs in which `ops::*` formatter it
//! calls and what it does with the reply body afterward.

use std::sync::atomic::Ordering;

use crate::context::Context;
use crate::cursor::{MessageQueueV1, MessageQueueV2};
use crate::error::{Error, Outcome};
use crate::kind::TransactionKind;
use crate::ops;
use crate::proto::{self, ConnState, Method};

/// Why a transaction's `select!` resolved before `run` did.
enum Interrupted {
    Cancelled,
    TimedOut,
}

impl Context {
    /// The shared dispatch path every transaction method funnels through.
    /// Returns `Outcome::InProgress` immediately, without blocking, if
    /// another transaction already owns this context (§4.3 step 2,
    /// `pbnc_can_start_transaction`).
    async fn dispatch(
        &self,
        kind: TransactionKind,
        method: Method,
        path_and_query: &str,
        body: Option<&str>,
    ) -> Outcome {
        if self.busy.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
            return Outcome::InProgress;
        }
        self.cancel_requested.store(false, Ordering::SeqCst);

        let outcome = self.dispatch_locked(kind, method, path_and_query, body).await;

        self.busy.store(false, Ordering::SeqCst);
        outcome
    }

    async fn dispatch_locked(
        &self,
        kind: TransactionKind,
        method: Method,
        path_and_query: &str,
        body: Option<&str>,
    ) -> Outcome {
        let mut guard = self.inner.lock().await;
        guard.kind = kind;
        guard.conn_state = if guard.socket.is_some() {
            ConnState::AwaitingResponse
        } else {
            ConnState::Connecting
        };
        let socket = guard.socket.take();
        let config = guard.config.clone();
        let reply_buf = std::mem::replace(
            &mut guard.reply_buf,
            crate::buffer::BoundedBuffer::with_capacity(crate::buffer::DEFAULT_REPLY_CAPACITY),
        );
        drop(guard);

        let timeout = config.transaction_timeout;
        let run = proto::run_to_outcome(&config, socket, method, path_and_query, body, reply_buf);
        tokio::pin!(run);

        // `cancel()` only calls `notify_waiters` after setting
        // `cancel_requested`; a call landing in the narrow window before
        // this `select!` starts polling is simply not observed, and the
        // transaction runs to its ordinary completion instead (§4.4).
        let settled = tokio::select! {
            biased;
            _ = self.cancel_notify.notified() => {
                self.inner.lock().await.conn_state = ConnState::Cancelling;
                Err(Interrupted::Cancelled)
            }
            _ = tokio::time::sleep(timeout) => {
                Err(Interrupted::TimedOut)
            }
            settled = &mut run => Ok(settled),
        };

        let mut guard = self.inner.lock().await;
        let outcome = match settled {
            Ok(settled) => {
                guard.socket = settled.keep_socket;
                guard.reply_buf = settled.reply_buf;
                guard.status_code = settled.status_code;
                settled.outcome
            }
            Err(Interrupted::Cancelled) => Outcome::Cancelled,
            Err(Interrupted::TimedOut) => Outcome::Timeout,
        };
        guard.last_result = outcome;
        guard.kind = TransactionKind::None;
        guard.conn_state = ConnState::Finished;
        outcome
    }

    /// Formats-then-fails-fast wrapper: a format error never touches the
    /// socket and is latched the same way a wire failure would be (§4.3
    /// step 3, "validate inputs").
    async fn dispatch_formatted(
        &self,
        kind: TransactionKind,
        formatted: Result<(Method, String, Option<String>), Error>,
    ) -> Outcome {
        match formatted {
            Ok((method, path, body)) => self.dispatch(kind, method, &path, body.as_deref()).await,
            Err(e) => {
                let outcome = e.as_outcome();
                let mut guard = self.inner.lock().await;
                guard.last_result = outcome;
                outcome
            }
        }
    }

    pub async fn publish(&self, channel: &str, message: &str, opts: ops::publish::PublishOptions) -> Outcome {
        let config = self.config_snapshot().await;
        let formatted = ops::publish::format(&config, channel, message, opts);
        let outcome = self.dispatch_formatted(TransactionKind::Publish, formatted).await;
        if outcome.is_ok() {
            self.latch_publish_response().await
        } else {
            outcome
        }
    }

    /// The per-kind response parser for publish (§4.1): a 2xx HTTP status
    /// only means the wire exchange succeeded, not that the server accepted
    /// the message — the ack's leading element still has to be checked.
    async fn latch_publish_response(&self) -> Outcome {
        let mut guard = self.inner.lock().await;
        let body = match guard.reply_buf.as_str() {
            Ok(s) => s.to_string(),
            Err(_) => {
                guard.last_result = Outcome::FormatError;
                return Outcome::FormatError;
            }
        };
        let outcome = match ops::publish::parse_publish_ack(&body) {
            Ok(true) => Outcome::Ok,
            Ok(false) => Outcome::PublishFailed,
            Err(_) => Outcome::FormatError,
        };
        guard.last_publish_reply = Some(body);
        guard.last_result = outcome;
        outcome
    }

    pub async fn subscribe(&self, channels: &[String], groups: &[String]) -> Outcome {
        let config = self.config_snapshot().await;
        let cursor = self.cursor().await;
        let formatted = ops::subscribe::format_v1(&config, channels, groups, &cursor).map(|(m, p)| (m, p, None));
        let outcome = self.dispatch_formatted(TransactionKind::Subscribe, formatted).await;
        if outcome.is_ok() {
            self.latch_v1_response(channels, groups).await
        } else {
            outcome
        }
    }

    pub async fn subscribe_v2(&self, channels: &[String], groups: &[String]) -> Outcome {
        let config = self.config_snapshot().await;
        let cursor = self.cursor().await;
        let formatted = ops::subscribe::format_v2(&config, channels, groups, &cursor).map(|(m, p)| (m, p, None));
        let outcome = self.dispatch_formatted(TransactionKind::SubscribeV2, formatted).await;
        if outcome.is_ok() {
            self.latch_v2_response(channels, groups).await
        } else {
            outcome
        }
    }

    /// Parse failures latch `FormatError` and never touch the cursor (§4.1,
    /// §7): a malformed envelope must not be mistaken for an empty one.
    async fn latch_v1_response(&self, channels: &[String], groups: &[String]) -> Outcome {
        let mut guard = self.inner.lock().await;
        let body = match guard.reply_buf.as_str() {
            Ok(s) => s.to_string(),
            Err(_) => {
                guard.last_result = Outcome::FormatError;
                return Outcome::FormatError;
            }
        };
        match MessageQueueV1::parse(&body) {
            Ok(queue) => {
                guard.cursor = queue.cursor.clone();
                guard.pending_v1 = Some(queue);
                guard.channels = channels.to_vec();
                guard.groups = groups.to_vec();
                Outcome::Ok
            }
            Err(_) => {
                guard.last_result = Outcome::FormatError;
                Outcome::FormatError
            }
        }
    }

    async fn latch_v2_response(&self, channels: &[String], groups: &[String]) -> Outcome {
        let mut guard = self.inner.lock().await;
        let body = match guard.reply_buf.as_str() {
            Ok(s) => s.to_string(),
            Err(_) => {
                guard.last_result = Outcome::FormatError;
                return Outcome::FormatError;
            }
        };
        match MessageQueueV2::parse(&body) {
            Ok(queue) => {
                guard.cursor = queue.cursor.clone();
                guard.pending_v2 = Some(queue);
                guard.channels = channels.to_vec();
                guard.groups = groups.to_vec();
                Outcome::Ok
            }
            Err(_) => {
                guard.last_result = Outcome::FormatError;
                Outcome::FormatError
            }
        }
    }

    /// Destructively pop the next v1 message (§4.6, `pubnub_get`).
    pub async fn get(&self) -> Option<String> {
        let mut guard = self.inner.lock().await;
        guard.pending_v1.as_mut().and_then(|q| q.get())
    }

    /// Destructively pop the channel the most recent `get()` call's
    /// message arrived on (§4.6, `pubnub_get_channel`).
    pub async fn get_channel(&self) -> Option<String> {
        let mut guard = self.inner.lock().await;
        guard.pending_v1.as_mut().and_then(|q| q.get_channel())
    }

    /// Destructively pop the next v2 message (§4.6, `pubnub_get_v2`).
    pub async fn get_v2(&self) -> Option<crate::cursor::MessageV2> {
        let mut guard = self.inner.lock().await;
        guard.pending_v2.as_mut().and_then(|q| q.next())
    }

    pub async fn leave(&self, channels: &[String], groups: &[String]) -> Outcome {
        let config = self.config_snapshot().await;
        let formatted = ops::presence::format_leave(&config, channels, groups).map(|(m, p)| (m, p, None));
        let outcome = self.dispatch_formatted(TransactionKind::Leave, formatted).await;
        if outcome.is_ok() {
            let mut guard = self.inner.lock().await;
            let remove_channels: std::collections::HashSet<&String> = channels.iter().collect();
            let remove_groups: std::collections::HashSet<&String> = groups.iter().collect();
            guard.channels.retain(|c| !remove_channels.contains(c));
            guard.groups.retain(|g| !remove_groups.contains(g));
        }
        outcome
    }

    pub async fn heartbeat(&self, channels: &[String], groups: &[String]) -> Outcome {
        let config = self.config_snapshot().await;
        let formatted = ops::presence::format_heartbeat(&config, channels, groups).map(|(m, p)| (m, p, None));
        self.dispatch_formatted(TransactionKind::Heartbeat, formatted).await
    }

    pub async fn here_now(&self, channel: &str) -> Outcome {
        let config = self.config_snapshot().await;
        let formatted = ops::presence::format_here_now(&config, channel).map(|(m, p)| (m, p, None));
        self.dispatch_formatted(TransactionKind::HereNow, formatted).await
    }

    pub async fn global_here_now(&self) -> Outcome {
        let config = self.config_snapshot().await;
        let formatted = ops::presence::format_global_here_now(&config).map(|(m, p)| (m, p, None));
        self.dispatch_formatted(TransactionKind::GlobalHereNow, formatted).await
    }

    pub async fn where_now(&self, user_id: &str) -> Outcome {
        let config = self.config_snapshot().await;
        let formatted = ops::presence::format_where_now(&config, user_id).map(|(m, p)| (m, p, None));
        self.dispatch_formatted(TransactionKind::WhereNow, formatted).await
    }

    pub async fn set_state(&self, channel: &str, state_json: &str) -> Outcome {
        let config = self.config_snapshot().await;
        let formatted = ops::presence::format_set_state(&config, channel, state_json).map(|(m, p)| (m, p, None));
        self.dispatch_formatted(TransactionKind::SetState, formatted).await
    }

    pub async fn state_get(&self, channel: &str, user_id: &str) -> Outcome {
        let config = self.config_snapshot().await;
        let formatted = ops::presence::format_state_get(&config, channel, user_id).map(|(m, p)| (m, p, None));
        self.dispatch_formatted(TransactionKind::StateGet, formatted).await
    }

    pub async fn history(&self, channel: &str, opts: ops::history::HistoryOptions) -> Outcome {
        let config = self.config_snapshot().await;
        let formatted = ops::history::format_history(&config, channel, &opts).map(|(m, p)| (m, p, None));
        self.dispatch_formatted(TransactionKind::History, formatted).await
    }

    pub async fn history_v2(&self, channels: &[String], opts: ops::history::HistoryOptions) -> Outcome {
        let config = self.config_snapshot().await;
        let formatted = ops::history::format_history_v2(&config, channels, &opts).map(|(m, p)| (m, p, None));
        self.dispatch_formatted(TransactionKind::HistoryV2, formatted).await
    }

    pub async fn time(&self) -> Outcome {
        let config = self.config_snapshot().await;
        let formatted = ops::time::format_time(&config).map(|(m, p)| (m, p, None));
        self.dispatch_formatted(TransactionKind::Time, formatted).await
    }

    pub async fn add_channel_to_group(&self, group: &str, channels: &[String]) -> Outcome {
        let config = self.config_snapshot().await;
        let formatted = ops::channel_group::format_add_channels(&config, group, channels).map(|(m, p)| (m, p, None));
        self.dispatch_formatted(TransactionKind::AddChannelToGroup, formatted).await
    }

    pub async fn remove_channel_from_group(&self, group: &str, channels: &[String]) -> Outcome {
        let config = self.config_snapshot().await;
        let formatted =
            ops::channel_group::format_remove_channels(&config, group, channels).map(|(m, p)| (m, p, None));
        self.dispatch_formatted(TransactionKind::RemoveChannelFromGroup, formatted).await
    }

    pub async fn list_channel_group(&self, group: &str) -> Outcome {
        let config = self.config_snapshot().await;
        let formatted = ops::channel_group::format_list_channels(&config, group).map(|(m, p)| (m, p, None));
        self.dispatch_formatted(TransactionKind::ListChannelGroup, formatted).await
    }

    pub async fn remove_channel_group(&self, group: &str) -> Outcome {
        let config = self.config_snapshot().await;
        let formatted = ops::channel_group::format_remove_group(&config, group).map(|(m, p)| (m, p, None));
        self.dispatch_formatted(TransactionKind::RemoveChannelGroup, formatted).await
    }

    pub async fn grant_token(&self, permission_spec_json: &str) -> Outcome {
        let config = self.config_snapshot().await;
        let formatted = ops::tokens::format_grant_token(&config, permission_spec_json);
        self.dispatch_formatted(TransactionKind::GrantToken, formatted).await
    }

    pub async fn revoke_token(&self, token: &str) -> Outcome {
        let config = self.config_snapshot().await;
        let formatted = ops::tokens::format_revoke_token(&config, token).map(|(m, p)| (m, p, None));
        self.dispatch_formatted(TransactionKind::RevokeToken, formatted).await
    }

    pub async fn object_get(&self, kind: ops::objects::ObjectKind, id: &str) -> Outcome {
        let config = self.config_snapshot().await;
        let formatted = ops::objects::format_get(&config, kind, id).map(|(m, p)| (m, p, None));
        self.dispatch_formatted(TransactionKind::ObjectOps, formatted).await
    }

    pub async fn object_set(&self, kind: ops::objects::ObjectKind, id: &str, body_json: &str) -> Outcome {
        let config = self.config_snapshot().await;
        let formatted = ops::objects::format_set(&config, kind, id, body_json);
        self.dispatch_formatted(TransactionKind::ObjectOps, formatted).await
    }

    pub async fn object_remove(&self, kind: ops::objects::ObjectKind, id: &str) -> Outcome {
        let config = self.config_snapshot().await;
        let formatted = ops::objects::format_remove(&config, kind, id).map(|(m, p)| (m, p, None));
        self.dispatch_formatted(TransactionKind::ObjectOps, formatted).await
    }

    pub async fn add_message_action(
        &self,
        channel: &str,
        message_timetoken: &str,
        action_json: &str,
    ) -> Outcome {
        let config = self.config_snapshot().await;
        let formatted = ops::actions::format_add(&config, channel, message_timetoken, action_json);
        self.dispatch_formatted(TransactionKind::MessageActionOps, formatted).await
    }

    pub async fn remove_message_action(
        &self,
        channel: &str,
        message_timetoken: &str,
        action_timetoken: &str,
    ) -> Outcome {
        let config = self.config_snapshot().await;
        let formatted = ops::actions::format_remove(&config, channel, message_timetoken, action_timetoken)
            .map(|(m, p)| (m, p, None));
        self.dispatch_formatted(TransactionKind::MessageActionOps, formatted).await
    }

    pub async fn message_action_history(&self, channel: &str) -> Outcome {
        let config = self.config_snapshot().await;
        let formatted = ops::actions::format_history(&config, channel).map(|(m, p)| (m, p, None));
        self.dispatch_formatted(TransactionKind::MessageActionOps, formatted).await
    }
}
