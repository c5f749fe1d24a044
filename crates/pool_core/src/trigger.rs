//! Run scheduling: a worker thread that executes matchmaking passes on a
//! recurring timer and on booking signals.
//!
//! The booking path never executes a pass inline; it sends a signal
//! through a single-slot channel and returns immediately, so request
//! creation latency is never coupled to a full matching pass. A signal
//! arriving while a run is in flight is coalesced into the already queued
//! one, which will observe the new request anyway.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Utc;
use tracing::warn;

use crate::engine::Matchmaker;

/// Cheap cloneable handle for requesting a matchmaking pass.
#[derive(Debug, Clone)]
pub struct MatchmakerHandle {
    trigger: SyncSender<()>,
}

impl MatchmakerHandle {
    /// Signal that a pass should run soon. Non-blocking; a full signal
    /// buffer or a stopped worker drops the signal, which is safe because
    /// the pending run (or the next timer tick) covers the pool anyway.
    pub fn request_run(&self) {
        let _ = self.trigger.try_send(());
    }

    /// Handle wired to nothing, for exercising callers without a worker.
    #[cfg(feature = "test-helpers")]
    pub fn detached() -> Self {
        let (trigger, _receiver) = mpsc::sync_channel(1);
        Self { trigger }
    }
}

/// Owns the background matchmaking thread.
pub struct MatchmakerWorker {
    handle: MatchmakerHandle,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl MatchmakerWorker {
    /// Spawn the worker. A pass executes on every timer tick and on every
    /// received signal; passes run strictly one after another.
    pub fn spawn(matchmaker: Arc<Matchmaker>, run_interval: Duration) -> Self {
        let (trigger, receiver) = mpsc::sync_channel::<()>(1);
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();

        let thread = thread::Builder::new()
            .name("matchmaking".to_string())
            .spawn(move || loop {
                match receiver.recv_timeout(run_interval) {
                    Ok(()) | Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
                if stop_flag.load(Ordering::SeqCst) {
                    break;
                }
                if let Err(err) = matchmaker.run_once(Utc::now()) {
                    warn!(error = %err, "matchmaking run aborted, will retry on next trigger");
                }
            })
            .expect("failed to spawn matchmaking worker thread");

        Self {
            handle: MatchmakerHandle { trigger },
            stop,
            thread: Some(thread),
        }
    }

    pub fn handle(&self) -> MatchmakerHandle {
        self.handle.clone()
    }

    /// Stop the worker and wait for the in-flight pass, if any, to finish.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        self.stop.store(true, Ordering::SeqCst);
        let _ = self.handle.trigger.try_send(());
        let _ = thread.join();
    }
}

impl Drop for MatchmakerWorker {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
