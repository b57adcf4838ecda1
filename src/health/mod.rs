//! Readiness subsystem.
//!
//! # Data Flow
//! ```text
//! External orchestrator / load balancer
//!     → App::is_ready()
//!     → readiness.rs (GET /healthz on the operator, 100ms bound)
//!     → bool
//!
//! monitor.rs:
//!     Periodic timer → readiness.rs → node_manager_ready gauge
//! ```
//!
//! # Design Decisions
//! - Probe failures never propagate as errors
//! - The monitor stops on the App's terminating notification

pub mod monitor;
pub mod readiness;

pub use monitor::ReadinessMonitor;
pub use readiness::{ReadinessProber, READINESS_TIMEOUT};
