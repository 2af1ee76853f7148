//! Platform-independent BLE advertisement ingestion and color decoding.
//!
//! Bleamit lamps broadcast their current color in the manufacturer-specific
//! data of BLE advertisements. This crate is the core that platform scanners
//! (Android `ScanCallback`, iOS `CBCentralManagerDelegate`, desktop stacks)
//! feed raw advertisements into; it validates them, suppresses the flood of
//! duplicates a scanner delivers, and reports color changes to the
//! application.
//!
//! # Features
//!
//! - **Pure decoding**: [`decode`] never panics; rejections are values
//! - **Deduplication**: configurable suppression window and policy
//! - **Thread-safe sessions**: ingest from any callback thread, sinks may re-enter
//! - **Async plumbing**: scan sources, a pumping [`Driver`], and broadcast streams
//! - **Capture replay**: replay recorded scans without hardware
//!
//! # Quick Start
//!
//! ```rust
//! use bleamit::{AdvertisementFrame, DecodedColor, DeviceId, ScanConfig, ScanSession};
//! use std::sync::Arc;
//! use std::time::Instant;
//!
//! let sink = Arc::new(|device: &DeviceId, color: DecodedColor| {
//!     println!("{device} is now {color}");
//! });
//!
//! let session = ScanSession::new(ScanConfig::default());
//! session.subscribe(&sink);
//! session.start()?;
//!
//! // Called from the platform scan callback
//! session.ingest(AdvertisementFrame::new(
//!     "C4:7F:51:0A:22:9E",
//!     0xFFFF,
//!     vec![0xAB, 255, 64, 0],
//!     -58,
//!     Instant::now(),
//! ));
//!
//! session.stop()?;
//! # Ok::<(), bleamit::ScanError>(())
//! ```
//!
//! ## Example (capture replay)
//!
//! ```rust,no_run
//! use bleamit::{ChannelSink, Driver, ScanSession};
//! use bleamit::sources::ReplaySource;
//! use futures::StreamExt;
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> bleamit::Result<()> {
//!     let sink = Arc::new(ChannelSink::new(64));
//!     let mut updates = sink.updates();
//!
//!     let session = Arc::new(ScanSession::default());
//!     session.subscribe(&sink);
//!     session.start()?;
//!
//!     let driver = Driver::spawn(ReplaySource::open("lamp.capture.yaml")?, Arc::clone(&session));
//!     while let Some(update) = updates.next().await {
//!         println!("{} -> {}", update.device_id, update.color);
//!     }
//!     driver.shutdown().await?;
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod ad;
pub mod config;
pub mod decoder;
mod error;
pub mod filter;
pub mod types;

// Session pipeline
pub mod session;
pub mod sink;
pub mod stream;

// Sources feeding sessions
pub mod driver;
pub mod source;
pub mod sources;

// Core exports
pub use config::ScanConfig;
pub use decoder::{DecodeFailure, DecodeOutcome, PayloadDecoder, decode, encode};
pub use error::*;
pub use filter::{DedupFilter, DedupKey, DedupPolicy};
pub use types::*;

// Session exports
pub use session::{IngestOutcome, ScanSession, StatsSnapshot};
pub use sink::{ChannelSink, ColorUpdate, EventSink};
pub use stream::UpdateStream;

// Source exports
pub use driver::{Driver, DriverExit, DriverHandle, DriverSummary};
pub use source::ScanSource;
