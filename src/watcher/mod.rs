//! The single background thread that multiplexes every context's sockets
//! and timers (§9).
//!
//! The original spins one OS thread that polls a `SocketWatcherData` set
//! plus a sorted timer list plus a work queue (`pbntf_*` in
//! `pubnub_ntf_callback_posix.c`). A dedicated single-threaded Tokio
//! runtime gives the same shape for free: Tokio's own reactor *is* a
//! poll-based single-thread socket multiplexer, so what's left to build by
//! hand is just the timer list ([`timer_list`]) driving the
//! auto-heartbeat pool, and a work queue for callbacks the caller wants run
//! on the watcher thread rather than inline.

pub mod timer_list;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::heartbeat::ThumperPool;

enum Command {
    Shutdown,
}

/// A handle to the running watcher thread. Dropping the last handle stops
/// the thread (mirrors `pbntf_init`/shutdown pairing, minus the explicit
/// stop call — Rust's ownership does that part for us).
pub struct Watcher {
    thread: Option<std::thread::JoinHandle<()>>,
    command_tx: mpsc::UnboundedSender<Command>,
    pub heartbeats: Arc<ThumperPool>,
}

impl Watcher {
    /// Start the watcher thread with a tick interval for the heartbeat
    /// pool (`pbauto_heartbeat_watcher_thread`'s polling cadence).
    pub fn start(tick: Duration) -> Watcher {
        let (command_tx, mut command_rx) = mpsc::unbounded_channel();
        let heartbeats = Arc::new(ThumperPool::new());
        let heartbeats_for_thread = heartbeats.clone();

        let thread = std::thread::Builder::new()
            .name("meshline-watcher".to_string())
            .spawn(move || {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("failed to start watcher runtime");

                runtime.block_on(async move {
                    let mut interval = tokio::time::interval(tick);
                    loop {
                        tokio::select! {
                            _ = interval.tick() => {
                                heartbeats_for_thread.tick(std::time::Instant::now()).await;
                            }
                            cmd = command_rx.recv() => {
                                match cmd {
                                    Some(Command::Shutdown) | None => break,
                                }
                            }
                        }
                    }
                });
            })
            .expect("failed to spawn watcher thread");

        Watcher {
            thread: Some(thread),
            command_tx,
            heartbeats,
        }
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        let _ = self.command_tx.send(Command::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watcher_starts_and_stops_cleanly() {
        let watcher = Watcher::start(Duration::from_millis(50));
        std::thread::sleep(Duration::from_millis(120));
        drop(watcher);
    }
}
