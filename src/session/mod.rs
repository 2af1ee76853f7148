//! Scan session: lifecycle, decode pipeline and fan-out
//!
//! A [`ScanSession`] sits between a platform scanner and the application:
//!
//! ```text
//! platform callback -> ingest(frame) -> decode -> dedup filter -> sinks
//! ```
//!
//! Lifecycle is `Idle -> Scanning -> Stopped`. Status, filter and sink list
//! share one mutex; sinks run after it is released, so a sink may call
//! [`stop`](ScanSession::stop) from inside its callback.
//!
//! Reports are queued in the order the filter approved them and drained by
//! one thread at a time. Sinks therefore never see an older color for a
//! device after a newer one, even when scanner callbacks race. A report
//! raised from inside a sink is delivered after the current one finishes.
//!
//! ```rust
//! use bleamit::{AdvertisementFrame, DecodedColor, DeviceId, ScanConfig, ScanSession};
//! use std::sync::{Arc, Mutex};
//! use std::time::Instant;
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = {
//!     let seen = Arc::clone(&seen);
//!     Arc::new(move |_: &DeviceId, color: DecodedColor| seen.lock().unwrap().push(color))
//! };
//!
//! let session = ScanSession::new(ScanConfig::default());
//! session.subscribe(&sink);
//! session.start().unwrap();
//!
//! session.ingest(AdvertisementFrame::new("lamp-1", 0xFFFF, vec![0xAB, 10, 20, 30], -60, Instant::now()));
//! assert_eq!(seen.lock().unwrap().as_slice(), &[DecodedColor::new(10, 20, 30)]);
//! ```

mod stats;

pub use stats::StatsSnapshot;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::{debug, info, trace, warn};

use crate::config::ScanConfig;
use crate::decoder::{DecodeFailure, PayloadDecoder};
use crate::filter::DedupFilter;
use crate::sink::EventSink;
use crate::types::{AdvertisementFrame, DecodedColor, DeviceId, ScanStatus};
use crate::{Result, ScanError};
use stats::SessionStats;

/// What happened to one ingested frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Session was not scanning; frame dropped
    Inactive,
    /// Payload failed validation; frame dropped
    Rejected(DecodeFailure),
    /// Duplicate inside the dedup window
    Suppressed,
    /// Delivered to this many live sinks
    Reported(usize),
}

struct SessionState {
    status: ScanStatus,
    filter: DedupFilter,
    sinks: Vec<Weak<dyn EventSink>>,
    /// Approved reports not yet handed to sinks, in decision order
    pending: VecDeque<(DeviceId, DecodedColor)>,
    /// Set while some thread is draining `pending`
    delivering: bool,
}

impl SessionState {
    fn live_sinks(&mut self) -> Vec<Arc<dyn EventSink>> {
        let mut live = Vec::with_capacity(self.sinks.len());
        self.sinks.retain(|weak| match weak.upgrade() {
            Some(sink) => {
                live.push(sink);
                true
            }
            None => false,
        });
        live
    }
}

/// Releases the delivery slot if a sink panics mid-drain.
struct DeliveryGuard<'a> {
    session: &'a ScanSession,
}

impl Drop for DeliveryGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            warn!("Sink panicked during delivery");
            self.session.lock().delivering = false;
        }
    }
}

/// Stateful ingestion core for one logical scan.
pub struct ScanSession {
    decoder: PayloadDecoder,
    state: Mutex<SessionState>,
    stats: SessionStats,
    stopped: CancellationToken,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}

impl std::fmt::Debug for ScanSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanSession")
            .field("decoder", &self.decoder)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl ScanSession {
    /// Create an idle session.
    pub fn new(config: ScanConfig) -> Self {
        Self {
            decoder: config.decoder(),
            state: Mutex::new(SessionState {
                status: ScanStatus::Idle,
                filter: DedupFilter::from_config(&config),
                sinks: Vec::new(),
                pending: VecDeque::new(),
                delivering: false,
            }),
            stats: SessionStats::default(),
            stopped: CancellationToken::new(),
        }
    }

    // A sink panicking on another thread must not wedge the session.
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a sink. The session keeps only a weak reference; once the
    /// caller drops its `Arc` the sink stops receiving updates.
    pub fn subscribe<S: EventSink + 'static>(&self, sink: &Arc<S>) {
        let sink: Arc<dyn EventSink> = sink.clone();
        let mut state = self.lock();
        state.sinks.retain(|s| s.strong_count() > 0);
        state.sinks.push(Arc::downgrade(&sink));
    }

    /// Begin accepting frames.
    ///
    /// Only valid on an idle session; does not touch any radio hardware.
    pub fn start(&self) -> Result<()> {
        let mut state = self.lock();
        if state.status != ScanStatus::Idle {
            return Err(ScanError::invalid_state("start", state.status));
        }
        state.status = ScanStatus::Scanning;
        info!(window = ?state.filter.window(), policy = ?state.filter.policy(), "Scan session started");
        Ok(())
    }

    /// Stop accepting frames and forget all sightings. Stopped is terminal.
    pub fn stop(&self) -> Result<()> {
        let mut state = self.lock();
        if state.status != ScanStatus::Scanning {
            return Err(ScanError::invalid_state("stop", state.status));
        }
        state.status = ScanStatus::Stopped;
        state.filter.clear();
        drop(state);
        self.stopped.cancel();

        let stats = self.stats.snapshot();
        info!(frames = stats.frames, reported = stats.reported, "Scan session stopped");
        Ok(())
    }

    /// Replace the dedup window. Allowed in any state.
    pub fn configure(&self, window_millis: u32) {
        let window = Duration::from_millis(u64::from(window_millis));
        self.lock().filter.set_window(window);
        debug!(?window, "Dedup window reconfigured");
    }

    pub fn status(&self) -> ScanStatus {
        self.lock().status
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Resolves once the session has been stopped.
    pub fn stopped(&self) -> WaitForCancellationFuture<'_> {
        self.stopped.cancelled()
    }

    /// Run one advertisement through the pipeline.
    ///
    /// Never fails: frames arriving outside `Scanning`, undecodable payloads
    /// and duplicates are dropped silently and only show up in [`stats`](Self::stats).
    pub fn ingest(&self, frame: AdvertisementFrame) -> IngestOutcome {
        self.stats.frame();
        let decoded = self.decoder.decode(frame.manufacturer_id, &frame.payload);

        let mut state = self.lock();
        if !state.status.accepts_frames() {
            drop(state);
            self.stats.inactive();
            trace!(device = %frame.device_id, "Dropped frame outside scanning state");
            return IngestOutcome::Inactive;
        }

        let color = match decoded {
            Ok(color) => color,
            Err(failure) => {
                drop(state);
                self.stats.decode_failure(failure);
                trace!(device = %frame.device_id, %failure, "Rejected advertisement");
                return IngestOutcome::Rejected(failure);
            }
        };

        if !state.filter.should_report(&frame.device_id, color, frame.observed_at) {
            drop(state);
            self.stats.suppressed();
            return IngestOutcome::Suppressed;
        }

        let live = state.live_sinks().len();
        state.pending.push_back((frame.device_id.clone(), color));
        self.stats.reported();
        trace!(device = %frame.device_id, %color, rssi = frame.rssi, sinks = live, "Reporting color");

        // Another thread (or an outer call on this one) is draining and will
        // pick this report up in order.
        if state.delivering {
            return IngestOutcome::Reported(live);
        }
        state.delivering = true;
        drop(state);

        self.deliver_pending();
        IngestOutcome::Reported(live)
    }

    /// Hand queued reports to sinks until the queue is empty.
    fn deliver_pending(&self) {
        let _guard = DeliveryGuard { session: self };
        loop {
            let mut state = self.lock();
            let Some((device_id, color)) = state.pending.pop_front() else {
                state.delivering = false;
                return;
            };
            let sinks = state.live_sinks();
            drop(state);

            for sink in &sinks {
                sink.on_color_update(&device_id, color);
            }
        }
    }
}
