//! Advertisement frame type delivered by scan sources

use std::sync::Arc;
use std::time::Instant;

use super::DeviceId;

/// One raw BLE advertisement event.
///
/// This is the fundamental data unit that flows into a scan session. It is
/// built once per platform scan callback and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct AdvertisementFrame {
    /// Advertiser identifier
    pub device_id: DeviceId,

    /// Company identifier of the manufacturer-specific data field
    pub manufacturer_id: u16,

    /// Manufacturer-specific bytes following the company identifier
    pub payload: Arc<[u8]>,

    /// Received signal strength in dBm
    pub rssi: i16,

    /// Monotonic time the advertisement was observed
    pub observed_at: Instant,
}

impl AdvertisementFrame {
    /// Create a new advertisement frame
    pub fn new(
        device_id: impl Into<DeviceId>,
        manufacturer_id: u16,
        payload: impl Into<Arc<[u8]>>,
        rssi: i16,
        observed_at: Instant,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            manufacturer_id,
            payload: payload.into(),
            rssi,
            observed_at,
        }
    }
}
