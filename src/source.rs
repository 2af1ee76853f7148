//! Scan source trait for advertisement producers

use crate::Result;
use crate::types::AdvertisementFrame;

/// Producer of raw advertisements.
///
/// A source wraps whatever actually hears the radio: a platform scanner
/// bridged through a [`ChannelSource`](crate::sources::ChannelSource), or a
/// recorded capture replayed by [`ReplaySource`](crate::sources::ReplaySource).
/// The [`Driver`](crate::Driver) pulls from it and feeds a session.
#[async_trait::async_trait]
pub trait ScanSource: Send + 'static {
    /// Wait for the next advertisement
    ///
    /// Returns:
    /// - `Ok(Some(frame))` - Advertisement received
    /// - `Ok(None)` - Source finished (normal termination)
    /// - `Err(e)` - Error occurred; the driver may retry
    async fn next_advertisement(&mut self) -> Result<Option<AdvertisementFrame>>;
}
