//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the node manager.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Operator management API address (e.g., "127.0.0.1:13009").
    pub http_address: String,

    /// Side gRPC server address, required when a block reader is present.
    pub grpc_address: Option<String>,

    /// Delay before launching subsystems, in milliseconds.
    pub startup_delay_ms: u64,

    /// Launch the connection watchdog.
    pub connection_watchdog: bool,

    /// Automatic backups.
    pub backup: ScheduleConfig,

    /// Automatic node snapshots.
    pub snapshot: ScheduleConfig,

    /// Automatic volume snapshots.
    pub volume_snapshot: VolumeSnapshotConfig,

    /// Metrics exporter and readiness polling.
    pub metrics: MetricsConfig,

    /// Log filter settings.
    pub logging: LoggingConfig,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            http_address: "127.0.0.1:13009".to_string(),
            grpc_address: None,
            startup_delay_ms: 0,
            connection_watchdog: false,
            backup: ScheduleConfig::default(),
            snapshot: ScheduleConfig::default(),
            volume_snapshot: VolumeSnapshotConfig::default(),
            metrics: MetricsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ManagerConfig {
    /// Startup delay, `None` when not configured.
    pub fn startup_delay(&self) -> Option<Duration> {
        (self.startup_delay_ms > 0).then(|| Duration::from_millis(self.startup_delay_ms))
    }
}

/// Schedule for a periodic maintenance job (backup or snapshot).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Run every `period_secs` seconds (0 = no time-based trigger).
    pub period_secs: u64,

    /// Run every Nth block (0 = no block-based trigger).
    pub modulo: u64,

    /// Only apply on the host with this name.
    pub hostname_match: Option<String>,
}

impl ScheduleConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }

    /// A job is enabled when either trigger is set.
    pub fn is_enabled(&self) -> bool {
        self.period_secs != 0 || self.modulo != 0
    }
}

/// Schedule for volume snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct VolumeSnapshotConfig {
    pub period_secs: u64,
    pub modulo: u64,

    /// Explicit block numbers to snapshot at.
    pub specific_blocks: Vec<u64>,
}

impl VolumeSnapshotConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }

    pub fn is_enabled(&self) -> bool {
        self.period_secs != 0 || self.modulo != 0 || !self.specific_blocks.is_empty()
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Install the Prometheus exporter.
    pub enabled: bool,

    /// Prometheus exporter listen address.
    pub listen_address: String,

    /// Readiness polling interval in milliseconds.
    pub readiness_poll_ms: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_address: "0.0.0.0:9102".to_string(),
            readiness_poll_ms: 1_000,
        }
    }
}

impl MetricsConfig {
    /// Never zero, `tokio::time::interval` rejects it.
    pub fn readiness_poll_interval(&self) -> Duration {
        Duration::from_millis(self.readiness_poll_ms.max(1))
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "node_manager=info".to_string(),
        }
    }
}
