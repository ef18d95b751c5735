//! Log rotation configuration

use dirwatch_core::SinkPolicy;
use std::time::Duration;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Log rotation configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationConfig {
    /// Maximum log file size in bytes
    pub max_size_bytes: u64,
    /// Rotated files older than this are removed; `None` keeps them forever
    pub retention: Option<Duration>,
    /// Gzip files as they are rotated out
    pub compress: bool,
}

impl RotationConfig {
    pub fn new(max_size_bytes: u64) -> Self {
        Self {
            max_size_bytes,
            retention: None,
            compress: false,
        }
    }

    /// Keep rotated files for `days`; absurdly long windows clamp to forever
    pub fn with_retention_days(mut self, days: u64) -> Self {
        self.retention = Some(Duration::from_secs(days.saturating_mul(SECS_PER_DAY)));
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Policy for `monitor.log`
    pub fn master(policy: &SinkPolicy) -> Self {
        Self::new(policy.master_max_size)
            .with_retention_days(policy.retention_days)
            .with_compression(policy.compress)
    }

    /// Policy for `monitor-error.log`
    pub fn error(policy: &SinkPolicy) -> Self {
        Self::new(policy.error_max_size)
            .with_retention_days(policy.retention_days)
            .with_compression(policy.compress)
    }

    /// Policy for per-folder logs; these carry no retention window
    pub fn folder(policy: &SinkPolicy) -> Self {
        Self::new(policy.folder_max_size).with_compression(policy.compress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policies() {
        let policy = SinkPolicy::default();

        let master = RotationConfig::master(&policy);
        assert_eq!(master.max_size_bytes, 100 * 1024 * 1024);
        assert_eq!(master.retention, Some(Duration::from_secs(30 * SECS_PER_DAY)));
        assert!(master.compress);

        let error = RotationConfig::error(&policy);
        assert_eq!(error.max_size_bytes, 10 * 1024 * 1024);

        let folder = RotationConfig::folder(&policy);
        assert_eq!(folder.max_size_bytes, 5 * 1024 * 1024);
        assert_eq!(folder.retention, None);
        assert!(folder.compress);
    }

    #[test]
    fn test_huge_retention_saturates() {
        let config = RotationConfig::new(1024).with_retention_days(u64::MAX);
        assert_eq!(config.retention, Some(Duration::from_secs(u64::MAX)));

        let policy = SinkPolicy {
            retention_days: 300_000_000_000_000,
            ..SinkPolicy::default()
        };
        assert_eq!(
            RotationConfig::master(&policy).retention,
            Some(Duration::from_secs(u64::MAX))
        );
    }
}
