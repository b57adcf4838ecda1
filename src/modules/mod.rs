//! External collaborators driven by the orchestrator.
//!
//! # Responsibilities
//! - Describe the interface the App consumes from each collaborator
//! - Group the already-constructed collaborators into a `Modules` set
//!
//! # Design Decisions
//! - Collaborators are shared (`Arc`), their lifetime belongs to whoever built them
//! - Optional features are `Option` fields: presence is the switch, not a flag

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use tonic::service::{Routes, RoutesBuilder};
use tracing::Span;

use crate::http::HttpOption;
use crate::lifecycle::{BoxError, Shutter, Terminating};

/// Process supervisor managing the node process.
#[async_trait]
pub trait Operator: Send + Sync {
    /// Termination signal of the supervisor.
    fn shutter(&self) -> &Shutter;

    fn configure_auto_backup(
        &self,
        period: Duration,
        modulo: u64,
        hostname_match: Option<&str>,
        hostname: &str,
    );

    fn configure_auto_snapshot(
        &self,
        period: Duration,
        modulo: u64,
        hostname_match: Option<&str>,
        hostname: &str,
    );

    fn configure_auto_volume_snapshot(
        &self,
        period: Duration,
        modulo: u64,
        specific_blocks: &[u64],
    );

    /// Serve the management API on `http_address` with the given extra routes and
    /// supervise the node until terminated. Resolves with the terminal error.
    async fn launch(&self, http_address: String, options: Vec<HttpOption>) -> Result<(), BoxError>;
}

/// Block-reader plugin streaming decoded blocks out of the node.
#[async_trait]
pub trait BlockReader: Send + Sync {
    /// Start the side gRPC server. Resolves once the listener is bound.
    async fn run_grpc_server(
        &self,
        routes: Routes,
        address: SocketAddr,
        span: Span,
    ) -> Result<(), BoxError>;

    /// Run the plugin until it stops.
    async fn launch(&self);

    fn has_continuity_checker(&self) -> bool;

    fn reset_continuity_checker(&self);
}

/// Detects gaps and reorderings in the block stream.
pub trait ContinuityChecker: Send + Sync {
    fn reset(&self);
}

/// Log/telemetry plugin attached to the node output.
pub trait LogPlugin: Send + Sync {
    /// Termination signal, present only if the plugin supports graceful shutdown.
    fn graceful_shutdown(&self) -> Option<&Shutter> {
        None
    }
}

/// Publishes process metrics and readiness.
#[async_trait]
pub trait MetricsAndReadinessManager: Send + Sync {
    /// Run until `terminating` fires.
    async fn launch(&self, terminating: Terminating);
}

/// Launches the connection watchdog; it should stop once `terminating` fires.
pub type WatchdogLauncher = Arc<dyn Fn(Terminating) -> BoxFuture<'static, ()> + Send + Sync>;

/// Registers an extra gRPC service on the side server.
pub type GrpcServiceRegistrar =
    Arc<dyn Fn(&mut RoutesBuilder) -> Result<(), BoxError> + Send + Sync>;

/// Called when the operator launch fails.
pub type FailureHandler = Arc<dyn Fn() + Send + Sync>;

/// Already-constructed collaborators handed to the App.
#[derive(Clone)]
pub struct Modules {
    pub operator: Arc<dyn Operator>,
    pub metrics_and_readiness: Arc<dyn MetricsAndReadinessManager>,
    pub block_reader: Option<Arc<dyn BlockReader>>,
    pub continuity_checker: Option<Arc<dyn ContinuityChecker>>,
    pub log_plugin: Option<Arc<dyn LogPlugin>>,
    pub launch_connection_watchdog: Option<WatchdogLauncher>,
    pub register_grpc_service: Option<GrpcServiceRegistrar>,
    pub start_failure_handler: Option<FailureHandler>,
}

impl Modules {
    /// Module set with only the required collaborators.
    pub fn new(
        operator: Arc<dyn Operator>,
        metrics_and_readiness: Arc<dyn MetricsAndReadinessManager>,
    ) -> Self {
        Self {
            operator,
            metrics_and_readiness,
            block_reader: None,
            continuity_checker: None,
            log_plugin: None,
            launch_connection_watchdog: None,
            register_grpc_service: None,
            start_failure_handler: None,
        }
    }

    /// Continuity checker to expose, from the block reader or a standalone module.
    pub fn resolve_continuity_checker(&self) -> Option<Arc<dyn ContinuityChecker>> {
        if let Some(reader) = &self.block_reader {
            if reader.has_continuity_checker() {
                return Some(Arc::new(BlockReaderChecker(reader.clone())));
            }
        }
        self.continuity_checker.clone()
    }
}

impl fmt::Debug for Modules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modules")
            .field("block_reader", &self.block_reader.is_some())
            .field("continuity_checker", &self.continuity_checker.is_some())
            .field("log_plugin", &self.log_plugin.is_some())
            .field("connection_watchdog", &self.launch_connection_watchdog.is_some())
            .field("register_grpc_service", &self.register_grpc_service.is_some())
            .field("start_failure_handler", &self.start_failure_handler.is_some())
            .finish()
    }
}

struct BlockReaderChecker(Arc<dyn BlockReader>);

impl ContinuityChecker for BlockReaderChecker {
    fn reset(&self) {
        self.0.reset_continuity_checker();
    }
}
