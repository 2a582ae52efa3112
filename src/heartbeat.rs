//! Auto-heartbeat: a pool of auxiliary "thumper" contexts that periodically
//! re-announce presence on behalf of a user context's subscribed
//! channels/groups, so the caller doesn't have to run heartbeats by hand.
//!
//! Grounded in `pbauto_heartbeat.c`. The original pairs a thumper to its
//! user context by storing the user context's pointer inside the thumper
//! and vice versa; this reimplementation pairs them **by index** into a
//! fixed-size table instead (§9's anti-ownership-cycle design note), since
//! two `Context` handles holding `Arc`s of each other would never drop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::context::Context;
use crate::error::Outcome;
use crate::watcher::timer_list::{TimerHandle, TimerList};

/// Hard ceiling on the number of concurrently auto-heartbeat-enabled
/// contexts one watcher can service, mirroring `MAX_HEARTBEAT_THUMPERS` —
/// a fixed table, not an unbounded `Vec`, keeps thumper lookup by index
/// O(1) and keeps a runaway caller from starving the watcher thread.
pub const MAX_HEARTBEAT_THUMPERS: usize = 64;

/// The minimum heartbeat period, derived from the minimum transaction
/// timeout (§4.5): a thumper firing faster than a transaction can
/// plausibly complete would just pile up `InProgress` rejections.
pub fn min_heartbeat_period() -> Duration {
    crate::config::Config::MIN_TRANSACTION_TIMEOUT
}

struct Slot {
    /// The thumper's own context, configured via `clone_for_thumper`.
    thumper: Context,
    /// The user context this thumper announces presence for.
    user: Context,
    period: Duration,
    /// The currently armed timer for this slot (§9's `TimerList`).
    timer: TimerHandle,
    /// True while this thumper's own heartbeat transaction is in flight;
    /// prevents a tick from re-arming a thumper against itself mid-transaction
    /// (`is_exempted` in the original).
    exempted: Arc<AtomicBool>,
}

/// The table of active thumpers, indexed by slot rather than linked by
/// pointer. Lock order is always `slots` before `timers`, to avoid a
/// deadlock between a caller enabling/disabling a slot and the watcher
/// thread ticking it at the same time.
#[derive(Default)]
pub struct ThumperPool {
    slots: Mutex<Vec<Option<Slot>>>,
    timers: Mutex<TimerList<usize>>,
}

impl ThumperPool {
    pub fn new() -> Self {
        ThumperPool {
            slots: Mutex::new((0..MAX_HEARTBEAT_THUMPERS).map(|_| None).collect()),
            timers: Mutex::new(TimerList::new()),
        }
    }

    /// Enable auto-heartbeat for `user`, forming a new thumper context from
    /// `user`'s own settings (`copy_context_settings`) at the given period.
    /// Returns `None` if the table is full.
    pub async fn enable(&self, user: Context, period: Duration) -> Option<usize> {
        let period = period.max(min_heartbeat_period());
        let user_config = user.config_snapshot().await;
        let thumper_config = user_config.clone_for_thumper();
        let thumper = Context::new(thumper_config);

        let mut slots = self.slots.lock().await;
        let index = slots.iter().position(|s| s.is_none())?;
        let mut timers = self.timers.lock().await;
        let timer = timers.insert(Instant::now() + period, index);
        drop(timers);
        slots[index] = Some(Slot {
            thumper,
            user,
            period,
            timer,
            exempted: Arc::new(AtomicBool::new(false)),
        });
        Some(index)
    }

    /// Disable and free the slot (`pubnub_disable_auto_heartbeat`).
    /// Cancels any in-flight thumper transaction rather than letting it run
    /// to completion against a slot that no longer exists.
    pub async fn disable(&self, index: usize) {
        let mut slots = self.slots.lock().await;
        let Some(slot) = slots.get_mut(index).and_then(|s| s.take()) else {
            return;
        };
        let mut timers = self.timers.lock().await;
        timers.remove(slot.timer);
        drop(timers);
        drop(slots);
        slot.thumper.cancel();
    }

    pub async fn is_enabled(&self, index: usize) -> bool {
        self.slots.lock().await.get(index).map_or(false, |s| s.is_some())
    }

    /// Called once per watcher tick: thump every slot whose period has
    /// elapsed (`handle_heartbeat_timers`).
    pub async fn tick(&self, now: Instant) {
        let due: Vec<usize> = {
            let mut timers = self.timers.lock().await;
            timers.drain_expired(now).into_iter().map(|(_, index)| index).collect()
        };

        for index in due {
            self.fire(index, now).await;
        }
    }

    /// Fire one slot's due timer and rearm it (§4.5,
    /// `handle_heartbeat_timers`): on success, wait a full period; on a
    /// recoverable failure, retry immediately instead of waiting out the
    /// period; on `Cancelled`, re-form the thumper if the paired user
    /// context's keys changed out from under it, then thump again.
    async fn fire(&self, index: usize, now: Instant) {
        let snapshot = {
            let slots = self.slots.lock().await;
            slots
                .get(index)
                .and_then(|s| s.as_ref())
                .map(|s| (s.thumper.clone(), s.user.clone(), s.period, s.exempted.clone()))
        };
        let Some((thumper, user, period, exempted)) = snapshot else {
            return;
        };

        if exempted.load(Ordering::SeqCst) {
            // Still mid-thump from a previous tick; don't pile another one
            // on top of it, just come back next period.
            self.reschedule(index, now + period).await;
            return;
        }

        let (channels, groups) = user.channel_info().await;
        if channels.is_empty() && groups.is_empty() {
            self.reschedule(index, now + period).await;
            return;
        }

        exempted.store(true, Ordering::SeqCst);
        let outcome = thumper.heartbeat(&channels, &groups).await;
        exempted.store(false, Ordering::SeqCst);

        match outcome {
            Outcome::Ok => self.reschedule(index, now + period).await,
            Outcome::Cancelled => {
                let user_keys = user.config_snapshot().await.keys;
                let thumper_keys = thumper.config_snapshot().await.keys;
                if user_keys != thumper_keys {
                    self.reinit_thumper(index, &user).await;
                    self.reschedule(index, now).await;
                } else {
                    self.reschedule(index, now + period).await;
                }
            }
            _ => self.reschedule(index, now).await,
        }
    }

    /// Re-form a slot's thumper from its user context's current settings
    /// (`copy_context_settings`), used when a pub/sub key rotation is
    /// discovered after a cancelled thump.
    async fn reinit_thumper(&self, index: usize, user: &Context) {
        let thumper_config = user.config_snapshot().await.clone_for_thumper();
        let new_thumper = Context::new(thumper_config);
        let mut slots = self.slots.lock().await;
        if let Some(Some(slot)) = slots.get_mut(index) {
            slot.thumper = new_thumper;
        }
    }

    async fn reschedule(&self, index: usize, deadline: Instant) {
        let mut slots = self.slots.lock().await;
        let mut timers = self.timers.lock().await;
        let handle = timers.insert(deadline, index);
        drop(timers);
        if let Some(Some(slot)) = slots.get_mut(index) {
            slot.timer = handle;
        }
    }

    /// The next instant any live slot needs another tick, for the
    /// watcher's own sleep scheduling.
    pub async fn next_due(&self) -> Option<Instant> {
        self.timers.lock().await.next_deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn enable_forms_a_thumper_from_user_settings() {
        let pool = ThumperPool::new();
        let user = Context::new(Config::new("origin").with_user_id("alice"));
        let index = pool.enable(user, Duration::from_secs(5)).await.unwrap();
        assert!(pool.is_enabled(index).await);
    }

    #[tokio::test]
    async fn disable_frees_the_slot() {
        let pool = ThumperPool::new();
        let user = Context::new(Config::new("origin"));
        let index = pool.enable(user, Duration::from_secs(5)).await.unwrap();
        pool.disable(index).await;
        assert!(!pool.is_enabled(index).await);
    }

    #[tokio::test]
    async fn disable_clears_its_timer() {
        let pool = ThumperPool::new();
        let user = Context::new(Config::new("origin"));
        let index = pool.enable(user, Duration::from_secs(5)).await.unwrap();
        assert!(pool.next_due().await.is_some());
        pool.disable(index).await;
        assert!(pool.next_due().await.is_none());
    }

    #[tokio::test]
    async fn pool_rejects_beyond_capacity() {
        let pool = ThumperPool::new();
        for _ in 0..MAX_HEARTBEAT_THUMPERS {
            let user = Context::new(Config::new("origin"));
            assert!(pool.enable(user, Duration::from_secs(5)).await.is_some());
        }
        let overflow = Context::new(Config::new("origin"));
        assert!(pool.enable(overflow, Duration::from_secs(5)).await.is_none());
    }

    #[tokio::test]
    async fn tick_before_due_time_does_not_fire() {
        let pool = ThumperPool::new();
        let user = Context::new(Config::new("origin"));
        let index = pool.enable(user, Duration::from_secs(300)).await.unwrap();
        pool.tick(Instant::now()).await;
        assert!(pool.is_enabled(index).await);
        assert!(pool.next_due().await.is_some());
    }
}
