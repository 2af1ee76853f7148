//! Replay source for recorded advertisement captures
//!
//! A capture is a YAML document listing advertisements with their offset
//! from the start of the recording:
//!
//! ```yaml
//! description: bench lamp cycling red/green
//! frames:
//!   - device: "C4:7F:51:0A:22:9E"
//!     manufacturer_id: 65535
//!     payload: [171, 255, 0, 0]
//!     rssi: -58
//!     offset_ms: 0
//!   - device: "C4:7F:51:0A:22:9E"
//!     payload: [171, 0, 255, 0]
//!     offset_ms: 120
//! ```
//!
//! Timestamps handed to the session are derived from the recorded offsets,
//! so deduplication behaves the same whether the capture is paced or not.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::time::sleep_until;
use tracing::{debug, info, trace};

use crate::decoder::VENDOR_ID;
use crate::source::ScanSource;
use crate::types::{AdvertisementFrame, DeviceId};
use crate::{Result, ScanError};

fn default_manufacturer_id() -> u16 {
    VENDOR_ID
}

/// One recorded advertisement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedFrame {
    pub device: DeviceId,
    #[serde(default = "default_manufacturer_id")]
    pub manufacturer_id: u16,
    pub payload: Vec<u8>,
    #[serde(default)]
    pub rssi: i16,
    /// Milliseconds since the start of the recording
    pub offset_ms: u64,
}

/// A recorded scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub frames: Vec<CapturedFrame>,
}

impl Capture {
    /// Parse a capture document, rejecting frames that go back in time.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let capture: Capture = serde_yaml_ng::from_str(yaml)
            .map_err(|e| ScanError::parse("advertisement capture", e.to_string()))?;

        if let Some(index) =
            capture.frames.windows(2).position(|pair| pair[1].offset_ms < pair[0].offset_ms)
        {
            return Err(ScanError::parse(
                "advertisement capture",
                format!("frame {} has an offset earlier than frame {}", index + 1, index),
            ));
        }

        Ok(capture)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| ScanError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml_str(&yaml)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml_ng::to_string(self)
            .map_err(|e| ScanError::parse("advertisement capture", e.to_string()))
    }

    /// Recording length
    pub fn duration(&self) -> Duration {
        self.frames.last().map(|f| Duration::from_millis(f.offset_ms)).unwrap_or_default()
    }
}

/// Clock anchors taken when the first frame is requested
#[derive(Debug, Clone, Copy)]
struct Origin {
    wall: tokio::time::Instant,
    observed: Instant,
}

/// Source replaying a [`Capture`].
#[derive(Debug)]
pub struct ReplaySource {
    capture: Capture,

    /// Next frame to emit
    cursor: usize,

    /// Playback speed multiplier; `None` replays as fast as it is polled
    speed: Option<f64>,

    origin: Option<Origin>,
}

impl ReplaySource {
    /// Create a real-time replay of a capture
    pub fn new(capture: Capture) -> Self {
        info!(
            "Loaded capture: {} frames over {:?}",
            capture.frames.len(),
            capture.duration()
        );
        Self { capture, cursor: 0, speed: Some(1.0), origin: None }
    }

    /// Open a capture file for replay
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(Capture::from_file(path)?))
    }

    /// Set playback speed
    pub fn set_speed(&mut self, speed: f64) {
        let speed = speed.clamp(0.1, 10.0);
        self.speed = Some(speed);
        debug!("Playback speed set to {}x", speed);
    }

    /// Emit frames without waiting between them
    pub fn unpaced(mut self) -> Self {
        self.speed = None;
        self
    }

    /// Frames not yet emitted
    pub fn remaining(&self) -> usize {
        self.capture.frames.len() - self.cursor
    }

    pub fn capture(&self) -> &Capture {
        &self.capture
    }
}

#[async_trait::async_trait]
impl ScanSource for ReplaySource {
    async fn next_advertisement(&mut self) -> Result<Option<AdvertisementFrame>> {
        let Some(recorded) = self.capture.frames.get(self.cursor) else {
            debug!("Reached end of capture");
            return Ok(None);
        };

        let origin = *self.origin.get_or_insert_with(|| Origin {
            wall: tokio::time::Instant::now(),
            observed: Instant::now(),
        });
        let offset = Duration::from_millis(recorded.offset_ms);

        if let Some(speed) = self.speed {
            sleep_until(origin.wall + offset.div_f64(speed)).await;
        }

        trace!(
            "Frame {}/{}: device={}, offset={}ms",
            self.cursor + 1,
            self.capture.frames.len(),
            recorded.device,
            recorded.offset_ms
        );

        let frame = AdvertisementFrame::new(
            recorded.device.clone(),
            recorded.manufacturer_id,
            recorded.payload.clone(),
            recorded.rssi,
            origin.observed + offset,
        );
        self.cursor += 1;

        Ok(Some(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPTURE: &str = r#"
description: two lamps
frames:
  - device: "lamp-1"
    manufacturer_id: 65535
    payload: [171, 255, 0, 0]
    rssi: -58
    offset_ms: 0
  - device: "lamp-2"
    payload: [171, 0, 255, 0]
    offset_ms: 500
"#;

    #[test]
    fn parses_capture_with_defaults() {
        let capture = Capture::from_yaml_str(CAPTURE).unwrap();
        assert_eq!(capture.description.as_deref(), Some("two lamps"));
        assert_eq!(capture.frames.len(), 2);
        assert_eq!(capture.frames[1].manufacturer_id, VENDOR_ID);
        assert_eq!(capture.frames[1].rssi, 0);
        assert_eq!(capture.duration(), Duration::from_millis(500));
    }

    #[test]
    fn rejects_frames_out_of_order() {
        let yaml = r#"
frames:
  - { device: a, payload: [171, 1, 2, 3], offset_ms: 100 }
  - { device: a, payload: [171, 1, 2, 3], offset_ms: 50 }
"#;
        let err = Capture::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ScanError::Parse { .. }));
        assert!(err.to_string().contains("frame 1"));
    }

    #[test]
    fn capture_round_trips_through_yaml() {
        let capture = Capture::from_yaml_str(CAPTURE).unwrap();
        let yaml = capture.to_yaml_string().unwrap();
        assert_eq!(Capture::from_yaml_str(&yaml).unwrap(), capture);
    }

    #[tokio::test]
    async fn unpaced_replay_keeps_recorded_spacing() {
        let capture = Capture::from_yaml_str(CAPTURE).unwrap();
        let mut source = ReplaySource::new(capture).unpaced();

        let first = source.next_advertisement().await.unwrap().unwrap();
        let second = source.next_advertisement().await.unwrap().unwrap();

        assert_eq!(second.observed_at - first.observed_at, Duration::from_millis(500));
        assert_eq!(&*first.payload, &[171, 255, 0, 0]);
        assert_eq!(source.remaining(), 0);
        assert!(source.next_advertisement().await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn paced_replay_waits_for_offsets() {
        let capture = Capture::from_yaml_str(CAPTURE).unwrap();
        let mut source = ReplaySource::new(capture);
        source.set_speed(2.0);

        let start = tokio::time::Instant::now();
        source.next_advertisement().await.unwrap().unwrap();
        source.next_advertisement().await.unwrap().unwrap();

        assert!(start.elapsed() >= Duration::from_millis(250));
    }

    #[test]
    fn speed_is_clamped() {
        let mut source = ReplaySource::new(Capture::default());
        source.set_speed(1000.0);
        assert_eq!(source.speed, Some(10.0));
        source.set_speed(0.0);
        assert_eq!(source.speed, Some(0.1));
    }
}
