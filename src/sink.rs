//! Event sinks consuming decoded color updates
//!
//! A platform adapter implements [`EventSink`] and forwards updates to its UI
//! thread however the platform requires. Plain closures are sinks too, and
//! [`ChannelSink`] bridges updates into async code.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::stream::UpdateStream;
use crate::types::{DecodedColor, DeviceId};

/// Consumer of decoded color updates.
///
/// Called from whichever thread delivered the advertisement, never while the
/// session lock is held, so implementations may call back into the session.
pub trait EventSink: Send + Sync {
    fn on_color_update(&self, device_id: &DeviceId, color: DecodedColor);
}

impl<F> EventSink for F
where
    F: Fn(&DeviceId, DecodedColor) + Send + Sync,
{
    fn on_color_update(&self, device_id: &DeviceId, color: DecodedColor) {
        self(device_id, color)
    }
}

/// A single reported update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct ColorUpdate {
    pub device_id: DeviceId,
    pub color: DecodedColor,
}

/// Sink that fans updates out over a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: broadcast::Sender<ColorUpdate>,
}

impl ChannelSink {
    /// Create a sink buffering up to `capacity` updates per lagging receiver.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to updates reported after this call.
    pub fn updates(&self) -> UpdateStream {
        UpdateStream::new(self.tx.subscribe())
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl EventSink for ChannelSink {
    fn on_color_update(&self, device_id: &DeviceId, color: DecodedColor) {
        let update = ColorUpdate { device_id: device_id.clone(), color };
        if self.tx.send(update).is_err() {
            trace!(device = %device_id, "No update receivers, dropping update");
        }
    }
}
