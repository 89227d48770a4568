//! Status synchronization: a slow poll loop keeps the authoritative playback
//! snapshot, a fast tick loop interpolates the displayed position between polls.
//!
//! - `task`: the start/stop handle both loops run on

mod task;

pub use task::PeriodicTask;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::time::Instant;

use crate::gateway::GatewayError;
use crate::model::{NowPlaying, PlaybackSnapshot, TouneClient};
use crate::render::{Indicator, Renderer, StaleSnapshotWarning, TimeDisplay};

#[derive(Clone, Copy, Debug)]
pub struct SyncConfig {
    pub poll_interval: Duration,
    pub tick_interval: Duration,
    /// Deadline for a status call; `None` uses the gateway default.
    pub poll_timeout: Option<Duration>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
            tick_interval: Duration::from_millis(250),
            poll_timeout: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PollOutcome {
    /// Snapshot replaced.
    Applied,
    /// Another poll was outstanding; nothing was sent.
    Skipped,
    /// Call failed; previous snapshot kept.
    Failed(GatewayError),
}

#[derive(Default)]
struct SyncState {
    snapshot: PlaybackSnapshot,
    now_playing: NowPlaying,
    /// Last value emitted to the progress control.
    displayed: f64,
    consecutive_failures: u32,
}

struct EngineInner {
    client: TouneClient,
    renderer: Arc<dyn Renderer>,
    config: SyncConfig,
    state: Mutex<SyncState>,
    poll_in_flight: AtomicBool,
    repoll_requested: AtomicBool,
    /// Number of status requests started so far.
    poll_seq: AtomicU64,
    /// Sequence number and outcome of the last completed poll.
    completed: watch::Sender<Option<(u64, PollOutcome)>>,
    scrub_lock: AtomicBool,
    poll_task: Mutex<PeriodicTask>,
    tick_task: Mutex<PeriodicTask>,
}

/// Clears a flag when dropped, including when the owning future is cancelled.
struct FlagGuard<'a>(&'a AtomicBool);

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Releases the single-flight flag and wakes anyone waiting on a forced poll,
/// also when the poll was cancelled midway.
struct PollFlight<'a>(&'a EngineInner);

impl Drop for PollFlight<'_> {
    fn drop(&mut self) {
        self.0.poll_in_flight.store(false, Ordering::SeqCst);
        self.0.completed.send_modify(|_| {});
    }
}

#[derive(Clone)]
pub struct StatusSyncEngine {
    inner: Arc<EngineInner>,
}

impl StatusSyncEngine {
    pub fn new(client: TouneClient, renderer: Arc<dyn Renderer>, config: SyncConfig) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                client,
                renderer,
                config,
                state: Mutex::new(SyncState::default()),
                poll_in_flight: AtomicBool::new(false),
                repoll_requested: AtomicBool::new(false),
                poll_seq: AtomicU64::new(0),
                completed: watch::Sender::new(None),
                scrub_lock: AtomicBool::new(false),
                poll_task: Mutex::new(PeriodicTask::new("status-poll")),
                tick_task: Mutex::new(PeriodicTask::new("position-tick")),
            }),
        }
    }

    fn from_weak(weak: &Weak<EngineInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Start both loops; loops already running are left alone. The poll loop
    /// polls immediately.
    pub async fn start(&self) {
        self.start_poll_loop().await;
        self.start_tick_loop().await;
    }

    /// Tear both loops down completely.
    pub async fn stop(&self) {
        self.stop_poll_loop().await;
        self.stop_tick_loop().await;
    }

    /// Surface visibility: inactive stops everything, active restarts with an
    /// immediate poll.
    pub async fn set_active(&self, active: bool) {
        tracing::debug!(active, "Status sync visibility changed");
        if active {
            self.start().await;
        } else {
            self.stop().await;
        }
    }

    pub async fn start_poll_loop(&self) {
        let mut task = self.inner.poll_task.lock().await;
        if task.is_running() {
            return;
        }
        let weak = Arc::downgrade(&self.inner);
        task.start(self.inner.config.poll_interval, move || {
            let engine = Self::from_weak(&weak);
            async move {
                if let Some(engine) = engine {
                    engine.poll_once().await;
                }
            }
        });
    }

    pub async fn stop_poll_loop(&self) {
        self.inner.poll_task.lock().await.stop();
    }

    pub async fn start_tick_loop(&self) {
        let mut task = self.inner.tick_task.lock().await;
        if task.is_running() {
            return;
        }
        let weak = Arc::downgrade(&self.inner);
        task.start(self.inner.config.tick_interval, move || {
            let engine = Self::from_weak(&weak);
            async move {
                if let Some(engine) = engine {
                    engine.tick().await;
                }
            }
        });
    }

    pub async fn stop_tick_loop(&self) {
        self.inner.tick_task.lock().await.stop();
    }

    pub async fn is_polling(&self) -> bool {
        self.inner.poll_task.lock().await.is_running()
    }

    pub async fn is_ticking(&self) -> bool {
        self.inner.tick_task.lock().await.is_running()
    }

    // ========================================================================
    // Polling
    // ========================================================================

    /// One status poll, single-flight: returns `Skipped` without sending
    /// anything while another poll is outstanding.
    pub async fn poll_once(&self) -> PollOutcome {
        if self.inner.poll_in_flight.swap(true, Ordering::SeqCst) {
            tracing::trace!("Status poll skipped, previous poll still outstanding");
            return PollOutcome::Skipped;
        }

        loop {
            let outcome = {
                let _flight = PollFlight(&self.inner);
                self.inner.repoll_requested.store(false, Ordering::SeqCst);
                self.fetch_and_apply().await
            };
            // A force may land after the fetch but before the flag was released
            if !self.inner.repoll_requested.load(Ordering::SeqCst)
                || self.inner.poll_in_flight.swap(true, Ordering::SeqCst)
            {
                return outcome;
            }
            tracing::debug!("Running coalesced out-of-band poll");
        }
    }

    /// Out-of-band poll. Returns once a poll sent after this call has
    /// completed; an outstanding poll is waited for and followed by another.
    pub async fn force_poll(&self) -> PollOutcome {
        let wanted = self.inner.poll_seq.load(Ordering::SeqCst) + 1;
        let mut completed = self.inner.completed.subscribe();

        loop {
            match self.poll_once().await {
                PollOutcome::Skipped => {}
                outcome => return outcome,
            }
            // An outstanding poll started after this call already serves it
            if self.inner.poll_seq.load(Ordering::SeqCst) < wanted {
                self.inner.repoll_requested.store(true, Ordering::SeqCst);
            }

            loop {
                if let Some((seq, outcome)) = completed.borrow_and_update().clone() {
                    if seq >= wanted {
                        return outcome;
                    }
                }
                if !self.inner.poll_in_flight.load(Ordering::SeqCst) {
                    // The outstanding poll ended without serving the request
                    break;
                }
                if completed.changed().await.is_err() {
                    return PollOutcome::Skipped;
                }
            }
        }
    }

    async fn fetch_and_apply(&self) -> PollOutcome {
        let seq = self.inner.poll_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let outcome = self.fetch_status().await;
        self.inner.completed.send_replace(Some((seq, outcome.clone())));
        outcome
    }

    async fn fetch_status(&self) -> PollOutcome {
        let result = self.inner.client.status(self.inner.config.poll_timeout).await;
        let captured_at = Instant::now();

        match result {
            Ok(report) => {
                let (snapshot, now_playing) = report.into_parts(captured_at);
                let scrubbing = self.inner.scrub_lock.load(Ordering::SeqCst);

                let (was_stale, time) = {
                    let mut state = self.inner.state.lock().await;
                    let was_stale = state.consecutive_failures > 0;
                    state.snapshot = snapshot;
                    state.now_playing = now_playing.clone();
                    state.consecutive_failures = 0;
                    if !scrubbing {
                        state.displayed = snapshot.elapsed_seconds;
                    }
                    (
                        was_stale,
                        TimeDisplay {
                            elapsed_seconds: state.displayed,
                            duration_seconds: snapshot.duration_seconds,
                        },
                    )
                };

                tracing::trace!(
                    state = ?snapshot.state,
                    elapsed = snapshot.elapsed_seconds,
                    duration = snapshot.duration_seconds,
                    "Status snapshot applied"
                );

                self.inner.renderer.render_now_playing(&snapshot, &now_playing);
                if !scrubbing {
                    self.inner.renderer.render_time(time);
                }
                if was_stale {
                    tracing::info!("Status polling recovered");
                    self.inner.renderer.render_indicator(Indicator::StaleCleared);
                }
                PollOutcome::Applied
            }
            Err(e) => {
                let consecutive_failures = {
                    let mut state = self.inner.state.lock().await;
                    state.consecutive_failures += 1;
                    state.consecutive_failures
                };

                if consecutive_failures == 1 {
                    tracing::warn!(error = %e, "Status poll failed, keeping previous snapshot");
                } else {
                    tracing::debug!(error = %e, consecutive_failures, "Status poll failed again");
                }

                self.inner
                    .renderer
                    .render_indicator(Indicator::Stale(StaleSnapshotWarning {
                        consecutive_failures,
                        last_error: e.clone(),
                    }));
                PollOutcome::Failed(e)
            }
        }
    }

    // ========================================================================
    // Interpolation
    // ========================================================================

    /// One interpolation step. Emits and returns the displayed elapsed time.
    pub async fn tick(&self) -> f64 {
        let now = Instant::now();
        let time = {
            let mut state = self.inner.state.lock().await;
            if !self.inner.scrub_lock.load(Ordering::SeqCst) {
                state.displayed = state.snapshot.interpolated_elapsed(now);
            }
            TimeDisplay {
                elapsed_seconds: state.displayed,
                duration_seconds: state.snapshot.duration_seconds,
            }
        };
        self.inner.renderer.render_time(time);
        time.elapsed_seconds
    }

    // ========================================================================
    // Scrub / seek
    // ========================================================================

    /// The user grabbed the position control; interpolation stops writing.
    pub fn begin_scrub(&self) {
        self.inner.scrub_lock.store(true, Ordering::SeqCst);
    }

    pub fn is_scrubbing(&self) -> bool {
        self.inner.scrub_lock.load(Ordering::SeqCst)
    }

    /// Move the displayed position while scrubbing.
    pub async fn scrub_to(&self, seconds: f64) {
        self.begin_scrub();
        let time = {
            let mut state = self.inner.state.lock().await;
            let duration = state.snapshot.duration_seconds;
            let mut target = seconds.max(0.0);
            if duration > 0.0 {
                target = target.min(duration);
            }
            state.displayed = target;
            TimeDisplay {
                elapsed_seconds: target,
                duration_seconds: duration,
            }
        };
        self.inner.renderer.render_time(time);
    }

    /// Release the control: seek to the scrubbed position, then re-anchor
    /// with an out-of-band poll. The lock is held until a poll sent after the
    /// seek has completed, so a poll already in flight cannot pull the display
    /// back to the old position.
    pub async fn release_scrub(&self) -> Result<(), GatewayError> {
        let _lock = FlagGuard(&self.inner.scrub_lock);
        let target = self.inner.state.lock().await.displayed;

        tracing::debug!(seconds = target, "Seeking");
        if let Err(e) = self.inner.client.seek(target).await {
            tracing::error!(error = %e, seconds = target, "Seek failed");
            return Err(e);
        }

        // Interpolate from the seek target until the backend confirms it
        {
            let mut state = self.inner.state.lock().await;
            let previous = state.snapshot;
            state.snapshot = PlaybackSnapshot::new(
                previous.state,
                target,
                previous.duration_seconds,
                Instant::now(),
            );
        }

        if let PollOutcome::Failed(e) = self.force_poll().await {
            tracing::debug!(error = %e, "Re-anchoring poll after seek failed");
        }
        Ok(())
    }

    pub async fn seek(&self, seconds: f64) -> Result<(), GatewayError> {
        self.scrub_to(seconds).await;
        self.release_scrub().await
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub async fn snapshot(&self) -> PlaybackSnapshot {
        self.inner.state.lock().await.snapshot
    }

    pub async fn now_playing(&self) -> NowPlaying {
        self.inner.state.lock().await.now_playing.clone()
    }

    pub async fn displayed_elapsed(&self) -> f64 {
        self.inner.state.lock().await.displayed
    }

    pub async fn is_stale(&self) -> bool {
        self.inner.state.lock().await.consecutive_failures > 0
    }
}
