//! Metrics collection.
//!
//! # Metrics
//! - `node_manager_up` (gauge): 1 while the App runs
//! - `node_manager_ready` (gauge): 1=operator ready, 0=not ready
//! - `node_manager_readiness_checks_total` (counter): probes by result
//! - `node_manager_terminations_total` (counter): App terminations by cause
//! - `node_manager_scheduled_jobs` (gauge): 1 per configured maintenance job
//!
//! # Design Decisions
//! - Descriptions are registered once per process; repeated calls are no-ops
//! - Recording goes through the `metrics` facade, the exporter is optional

use std::sync::Once;

use metrics::{counter, describe_counter, describe_gauge, gauge};

pub const UP: &str = "node_manager_up";
pub const READY: &str = "node_manager_ready";
pub const READINESS_CHECKS: &str = "node_manager_readiness_checks_total";
pub const TERMINATIONS: &str = "node_manager_terminations_total";
pub const SCHEDULED_JOBS: &str = "node_manager_scheduled_jobs";

static REGISTER: Once = Once::new();

/// Describe the process-wide metric set.
pub fn register() {
    REGISTER.call_once(|| {
        describe_gauge!(UP, "Whether the node manager app is running");
        describe_gauge!(READY, "Whether the operator reports ready on /healthz");
        describe_counter!(READINESS_CHECKS, "Readiness probes by result");
        describe_counter!(TERMINATIONS, "App terminations by cause");
        describe_gauge!(SCHEDULED_JOBS, "Configured maintenance jobs");
        tracing::debug!("Metric descriptions registered");
    });
}

pub fn set_up(up: bool) {
    gauge!(UP).set(if up { 1.0 } else { 0.0 });
}

pub fn set_ready(ready: bool) {
    gauge!(READY).set(if ready { 1.0 } else { 0.0 });
}

pub fn record_readiness_check(ready: bool) {
    let result = if ready { "ready" } else { "not_ready" };
    counter!(READINESS_CHECKS, "result" => result).increment(1);
}

pub fn record_termination(clean: bool) {
    let cause = if clean { "clean" } else { "error" };
    counter!(TERMINATIONS, "cause" => cause).increment(1);
}

pub fn record_scheduled_job(job: &'static str) {
    gauge!(SCHEDULED_JOBS, "job" => job).set(1.0);
}
