//! Scan session configuration
//!
//! Every field has a default, so an empty document yields the stock
//! configuration:
//!
//! ```yaml
//! window_ms: 1000
//! policy: report_on_change
//! prune_factor: 10
//! vendor_id: 65535
//! magic_byte: 171
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::decoder::{MAGIC_BYTE, PayloadDecoder, VENDOR_ID};
use crate::filter::DedupPolicy;
use crate::{Result, ScanError};

/// Default dedup window in milliseconds.
pub const DEFAULT_WINDOW_MS: u32 = 1_000;

/// Default multiple of the window after which sightings are pruned.
pub const DEFAULT_PRUNE_FACTOR: u32 = 10;

/// Configuration for a [`ScanSession`](crate::ScanSession).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Dedup window in milliseconds; zero disables suppression
    pub window_ms: u32,

    /// Suppression policy
    pub policy: DedupPolicy,

    /// Sightings older than `prune_factor * window` are dropped on insert
    pub prune_factor: u32,

    /// Company identifier of vendor frames
    pub vendor_id: u16,

    /// First byte of vendor frames
    pub magic_byte: u8,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
            policy: DedupPolicy::default(),
            prune_factor: DEFAULT_PRUNE_FACTOR,
            vendor_id: VENDOR_ID,
            magic_byte: MAGIC_BYTE,
        }
    }
}

impl ScanConfig {
    /// Parse and validate a YAML configuration document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: ScanConfig = serde_yaml_ng::from_str(yaml)
            .map_err(|e| ScanError::parse("scan configuration", e.to_string()))?;
        config.validate()?;
        debug!(?config, "Loaded scan configuration");
        Ok(config)
    }

    /// Read, parse and validate a YAML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| ScanError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml_str(&yaml)
    }

    /// Check values that serde cannot express as types.
    pub fn validate(&self) -> Result<()> {
        if self.prune_factor == 0 {
            return Err(ScanError::config("prune_factor must be at least 1"));
        }
        Ok(())
    }

    pub fn with_window_ms(mut self, window_ms: u32) -> Self {
        self.window_ms = window_ms;
        self
    }

    pub fn with_policy(mut self, policy: DedupPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(u64::from(self.window_ms))
    }

    /// Decoder matching the configured vendor constants
    pub fn decoder(&self) -> PayloadDecoder {
        PayloadDecoder::new(self.vendor_id, self.magic_byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = ScanConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, ScanConfig::default());
        assert_eq!(config.window(), Duration::from_secs(1));
        assert_eq!(config.decoder(), PayloadDecoder::default());
    }

    #[test]
    fn partial_document_overrides_named_fields() {
        let config = ScanConfig::from_yaml_str("window_ms: 250\npolicy: per_color\n").unwrap();
        assert_eq!(config.window_ms, 250);
        assert_eq!(config.policy, DedupPolicy::PerColor);
        assert_eq!(config.prune_factor, DEFAULT_PRUNE_FACTOR);
        assert_eq!(config.vendor_id, VENDOR_ID);
    }

    #[test]
    fn zero_prune_factor_is_rejected() {
        let err = ScanConfig::from_yaml_str("prune_factor: 0").unwrap_err();
        assert!(matches!(err, ScanError::Config { .. }));
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        let err = ScanConfig::from_yaml_str("policy: sometimes").unwrap_err();
        assert!(matches!(err, ScanError::Parse { .. }));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = ScanConfig::from_file("/nonexistent/bleamit.yaml").unwrap_err();
        match err {
            ScanError::File { path, .. } => assert!(path.ends_with("bleamit.yaml")),
            other => panic!("Expected File error, got {other:?}"),
        }
    }

    #[test]
    fn round_trips_through_yaml() {
        let config = ScanConfig::default().with_window_ms(40).with_policy(DedupPolicy::WindowOnly);
        let yaml = serde_yaml_ng::to_string(&config).unwrap();
        assert_eq!(ScanConfig::from_yaml_str(&yaml).unwrap(), config);
    }
}
