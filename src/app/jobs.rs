//! Forwarding of scheduled maintenance jobs to the operator.

use crate::config::ManagerConfig;
use crate::modules::Operator;
use crate::observability::metrics;

/// Forward every enabled job's schedule to `operator`.
///
/// The three jobs are independent; disabled ones are not forwarded at all.
/// Returns the names of the jobs that were configured.
pub fn configure(
    config: &ManagerConfig,
    operator: &dyn Operator,
    hostname: &str,
) -> Vec<&'static str> {
    let mut configured = Vec::new();

    let backup = &config.backup;
    if backup.is_enabled() {
        tracing::info!(
            period_secs = backup.period_secs,
            modulo = backup.modulo,
            hostname_match = ?backup.hostname_match,
            "Configuring auto backup"
        );
        operator.configure_auto_backup(
            backup.period(),
            backup.modulo,
            backup.hostname_match.as_deref(),
            hostname,
        );
        configured.push("backup");
    }

    let snapshot = &config.snapshot;
    if snapshot.is_enabled() {
        tracing::info!(
            period_secs = snapshot.period_secs,
            modulo = snapshot.modulo,
            hostname_match = ?snapshot.hostname_match,
            "Configuring auto snapshot"
        );
        operator.configure_auto_snapshot(
            snapshot.period(),
            snapshot.modulo,
            snapshot.hostname_match.as_deref(),
            hostname,
        );
        configured.push("snapshot");
    }

    let volume = &config.volume_snapshot;
    if volume.is_enabled() {
        tracing::info!(
            period_secs = volume.period_secs,
            modulo = volume.modulo,
            specific_blocks = volume.specific_blocks.len(),
            "Configuring auto volume snapshot"
        );
        operator.configure_auto_volume_snapshot(
            volume.period(),
            volume.modulo,
            &volume.specific_blocks,
        );
        configured.push("volume_snapshot");
    }

    for &job in &configured {
        metrics::record_scheduled_job(job);
    }

    configured
}
