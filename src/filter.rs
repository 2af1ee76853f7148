//! Duplicate advertisement suppression
//!
//! Scanners deliver the same advertisement many times per second for a
//! stationary advertiser. [`DedupFilter`] remembers when each key was last
//! reported and suppresses repeats inside a window. Expiry is checked lazily
//! on lookup; there is no background sweep.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::config::{DEFAULT_PRUNE_FACTOR, ScanConfig};
use crate::types::{DecodedColor, DeviceId};

/// How repeated sightings are suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Keyed by device. A color change is reported immediately; a repeat of
    /// the last color only after the window expires.
    #[default]
    ReportOnChange,

    /// Keyed by device. At most one report per window, color changes included.
    WindowOnly,

    /// Keyed by device and color. Each color has its own window.
    PerColor,
}

/// Lookup key into the sightings table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub device_id: DeviceId,
    /// Present only under [`DedupPolicy::PerColor`]
    pub color: Option<DecodedColor>,
}

impl DedupKey {
    /// Derive the key a policy uses for an observation.
    pub fn new(policy: DedupPolicy, device_id: &DeviceId, color: DecodedColor) -> Self {
        let color = match policy {
            DedupPolicy::PerColor => Some(color),
            DedupPolicy::ReportOnChange | DedupPolicy::WindowOnly => None,
        };
        Self { device_id: device_id.clone(), color }
    }
}

#[derive(Debug, Clone, Copy)]
struct Sighting {
    color: DecodedColor,
    reported_at: Instant,
}

/// Recent-sightings table with a suppression window.
#[derive(Debug, Clone)]
pub struct DedupFilter {
    window: Duration,
    policy: DedupPolicy,
    prune_factor: u32,
    sightings: HashMap<DedupKey, Sighting>,
}

impl DedupFilter {
    pub fn new(window: Duration, policy: DedupPolicy) -> Self {
        Self { window, policy, prune_factor: DEFAULT_PRUNE_FACTOR, sightings: HashMap::new() }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            window: config.window(),
            policy: config.policy,
            prune_factor: config.prune_factor.max(1),
            sightings: HashMap::new(),
        }
    }

    /// Decide whether an observation should reach the sinks.
    ///
    /// A `true` result records the observation as the latest report for its key.
    pub fn should_report(&mut self, device_id: &DeviceId, color: DecodedColor, now: Instant) -> bool {
        let key = DedupKey::new(self.policy, device_id, color);

        let report = match self.sightings.get(&key) {
            None => true,
            Some(last) if self.is_expired(last, now) => true,
            Some(last) => self.policy == DedupPolicy::ReportOnChange && last.color != color,
        };

        if report {
            self.record(key, color, now);
        } else {
            trace!(device = %device_id, %color, "Suppressed duplicate sighting");
        }

        report
    }

    fn record(&mut self, key: DedupKey, color: DecodedColor, now: Instant) {
        if !self.sightings.contains_key(&key) {
            self.prune(now);
        }
        self.sightings.insert(key, Sighting { color, reported_at: now });
    }

    fn is_expired(&self, sighting: &Sighting, now: Instant) -> bool {
        now.saturating_duration_since(sighting.reported_at) >= self.window
    }

    /// Drop sightings older than `prune_factor` windows. Returns how many were dropped.
    pub fn prune(&mut self, now: Instant) -> usize {
        let horizon = self.window.saturating_mul(self.prune_factor);
        let before = self.sightings.len();
        self.sightings.retain(|_, s| now.saturating_duration_since(s.reported_at) < horizon);

        let pruned = before - self.sightings.len();
        if pruned > 0 {
            debug!(pruned, remaining = self.sightings.len(), "Pruned stale sightings");
        }
        pruned
    }

    /// Forget every sighting.
    pub fn clear(&mut self) {
        self.sightings.clear();
    }

    pub fn set_window(&mut self, window: Duration) {
        self.window = window;
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn policy(&self) -> DedupPolicy {
        self.policy
    }

    /// Number of tracked keys
    pub fn len(&self) -> usize {
        self.sightings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sightings.is_empty()
    }
}
