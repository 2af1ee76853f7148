//! Core value types for advertisement ingestion.
//!
//! These are the data structures that flow through the pipeline:
//! - [`AdvertisementFrame`] is one raw advertisement event as delivered by a scan source
//! - [`DecodedColor`] is the validated color carried by a vendor payload
//! - [`DeviceId`] is the opaque advertiser identifier (usually an address string)
//! - [`ScanStatus`] is the lifecycle state of a scan session
//!
//! ## Usage Example
//!
//! ```rust
//! use bleamit::types::{AdvertisementFrame, DecodedColor, DeviceId};
//! use std::time::Instant;
//!
//! let frame = AdvertisementFrame::new(
//!     DeviceId::from("C4:7F:51:0A:22:9E"),
//!     0xFFFF,
//!     vec![0xAB, 10, 20, 30],
//!     -61,
//!     Instant::now(),
//! );
//!
//! assert_eq!(frame.payload.len(), 4);
//! assert_eq!(DecodedColor::new(10, 20, 30).to_string(), "#0A141E");
//! ```

mod color;
mod frame;
mod status;

pub use color::DecodedColor;
pub use frame::AdvertisementFrame;
pub use status::ScanStatus;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Opaque identifier of an advertising device.
///
/// Platforms hand out different identifiers (a MAC address on Android, a
/// per-app UUID on iOS); the core only compares and hashes them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(transparent)]
pub struct DeviceId(Arc<str>);

impl DeviceId {
    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DeviceId {
    fn from(value: &str) -> Self {
        Self(Arc::from(value))
    }
}

impl From<String> for DeviceId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl AsRef<str> for DeviceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
