//! Channel-backed source for platform callback threads

use tokio::sync::mpsc;
use tracing::debug;

use crate::Result;
use crate::source::ScanSource;
use crate::types::AdvertisementFrame;

/// Sending half handed to a platform scan callback.
///
/// Pushing never blocks, so it is safe on OS-managed Bluetooth threads.
#[derive(Debug, Clone)]
pub struct FrameFeeder {
    tx: mpsc::UnboundedSender<AdvertisementFrame>,
}

impl FrameFeeder {
    /// Queue a frame. Returns `false` once the source has been dropped.
    pub fn push(&self, frame: AdvertisementFrame) -> bool {
        self.tx.send(frame).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Source yielding frames pushed through its [`FrameFeeder`]s.
///
/// Ends once every feeder has been dropped and the queue is drained.
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::UnboundedReceiver<AdvertisementFrame>,
}

impl ChannelSource {
    pub fn new() -> (FrameFeeder, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (FrameFeeder { tx }, Self { rx })
    }
}

#[async_trait::async_trait]
impl ScanSource for ChannelSource {
    async fn next_advertisement(&mut self) -> Result<Option<AdvertisementFrame>> {
        let frame = self.rx.recv().await;
        if frame.is_none() {
            debug!("All frame feeders dropped");
        }
        Ok(frame)
    }
}
