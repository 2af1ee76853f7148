//! Diagnostic counters for a scan session

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::decoder::DecodeFailure;

/// Lock-free counters updated on every ingest.
#[derive(Debug, Default)]
pub(crate) struct SessionStats {
    frames: AtomicU64,
    inactive: AtomicU64,
    wrong_vendor: AtomicU64,
    too_short: AtomicU64,
    bad_magic: AtomicU64,
    suppressed: AtomicU64,
    reported: AtomicU64,
}

impl SessionStats {
    pub(crate) fn frame(&self) {
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inactive(&self) {
        self.inactive.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn decode_failure(&self, failure: DecodeFailure) {
        let counter = match failure {
            DecodeFailure::WrongVendorId => &self.wrong_vendor,
            DecodeFailure::TooShort => &self.too_short,
            DecodeFailure::BadMagicByte => &self.bad_magic,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn suppressed(&self) {
        self.suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn reported(&self) {
        self.reported.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames: self.frames.load(Ordering::Relaxed),
            inactive: self.inactive.load(Ordering::Relaxed),
            wrong_vendor: self.wrong_vendor.load(Ordering::Relaxed),
            too_short: self.too_short.load(Ordering::Relaxed),
            bad_magic: self.bad_magic.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
            reported: self.reported.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of a session's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Frames passed to `ingest`
    pub frames: u64,
    /// Frames dropped because the session was not scanning
    pub inactive: u64,
    pub wrong_vendor: u64,
    pub too_short: u64,
    pub bad_magic: u64,
    /// Decoded frames held back by the dedup filter
    pub suppressed: u64,
    /// Decoded frames delivered to sinks
    pub reported: u64,
}

impl StatsSnapshot {
    /// Total frames rejected by the decoder
    pub fn decode_failures(&self) -> u64 {
        self.wrong_vendor + self.too_short + self.bad_magic
    }
}
