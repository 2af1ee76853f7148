//! Driver pumps a scan source into a session

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::session::{IngestOutcome, ScanSession};
use crate::source::ScanSource;
use crate::types::ScanStatus;
use crate::{Result, ScanError};

/// Consecutive source errors tolerated before the driver gives up
const MAX_ERRORS: u32 = 10;

/// Exponential backoff: 50ms after the first error, then 100ms, 200ms, up to 1.6s
fn backoff_after(consecutive_errors: u32) -> Duration {
    Duration::from_millis(50 << consecutive_errors.saturating_sub(1).min(5))
}

/// Why a driver task finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverExit {
    /// Source returned `Ok(None)`
    SourceExhausted,
    /// Cancellation token fired
    Cancelled,
    /// Session reached `Stopped`
    SessionStopped,
    /// Source failed `MAX_ERRORS` times in a row
    TooManyErrors,
}

/// Totals reported when a driver task ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverSummary {
    /// Frames handed to the session
    pub frames: u64,
    /// Frames delivered to sinks
    pub reported: u64,
    /// Source errors over the task's lifetime
    pub errors: u32,
    pub exit: DriverExit,
}

/// Handle to a spawned driver task
#[derive(Debug)]
pub struct DriverHandle {
    cancel: CancellationToken,
    task: JoinHandle<DriverSummary>,
}

impl DriverHandle {
    /// Token that stops the driver when cancelled
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the driver to finish on its own
    pub async fn join(self) -> Result<DriverSummary> {
        self.task
            .await
            .map_err(|e| ScanError::source_failed_with("driver task failed", Box::new(e)))
    }

    /// Cancel the driver and wait for it to finish
    pub async fn shutdown(self) -> Result<DriverSummary> {
        self.cancel.cancel();
        self.join().await
    }
}

/// Driver spawns the task that feeds a session from a source
///
/// Platform adapters that can call [`ScanSession::ingest`] directly do not
/// need a driver. It exists for sources that are naturally async: replays,
/// channel bridges, desktop scanners.
pub struct Driver;

impl Driver {
    /// Spawn a task pumping `source` into `session`
    ///
    /// Must be called within a tokio runtime.
    pub fn spawn<S>(source: S, session: Arc<ScanSession>) -> DriverHandle
    where
        S: ScanSource,
    {
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();

        let task = tokio::spawn(async move { Self::pump(source, session, cancel_task).await });

        DriverHandle { cancel, task }
    }

    async fn pump<S>(mut source: S, session: Arc<ScanSession>, cancel: CancellationToken) -> DriverSummary
    where
        S: ScanSource,
    {
        info!("Driver task started");
        let mut frames = 0u64;
        let mut reported = 0u64;
        let mut errors = 0u32;
        let mut consecutive_errors = 0u32;

        let exit = loop {
            if session.status() == ScanStatus::Stopped {
                debug!("Session stopped, ending driver");
                break DriverExit::SessionStopped;
            }

            let result = tokio::select! {
                _ = cancel.cancelled() => break DriverExit::Cancelled,
                _ = session.stopped() => {
                    debug!("Session stopped while waiting on source");
                    break DriverExit::SessionStopped;
                }
                result = source.next_advertisement() => result,
            };

            match result {
                Ok(Some(frame)) => {
                    frames += 1;
                    consecutive_errors = 0;
                    let outcome = session.ingest(frame);
                    if matches!(outcome, IngestOutcome::Reported(_)) {
                        reported += 1;
                    }
                    trace!(frames, ?outcome, "Frame ingested");
                }
                Ok(None) => {
                    info!("Source ended after {} frames", frames);
                    break DriverExit::SourceExhausted;
                }
                Err(e) => {
                    errors += 1;
                    consecutive_errors += 1;
                    error!("Source error ({}/{}): {}", consecutive_errors, MAX_ERRORS, e);

                    if consecutive_errors >= MAX_ERRORS {
                        error!("Too many source errors, shutting down");
                        break DriverExit::TooManyErrors;
                    }

                    let backoff = backoff_after(consecutive_errors);
                    tokio::select! {
                        _ = cancel.cancelled() => break DriverExit::Cancelled,
                        _ = session.stopped() => break DriverExit::SessionStopped,
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        };

        info!(?exit, frames, reported, errors, "Driver task ended");
        DriverSummary { frames, reported, errors, exit }
    }
}
