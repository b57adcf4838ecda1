//! Lifecycle orchestration of the managed node.
//!
//! # Startup sequence (`App::run`)
//! ```text
//! hostname → metric set → scheduled jobs → termination chain
//!     → startup delay → block reader (gRPC server, launch)
//!     → route list → readiness manager → operator launch → watchdog
//! ```
//!
//! # Design Decisions
//! - `run` returns once every launch is dispatched; callers wait on `terminated()`
//! - Setup errors abort `run` without rolling back earlier steps, and every later
//!   `run` on the same App reports `StartupFailed`
//! - The operator's launch result and its termination hook both feed the App's
//!   shutter; whichever arrives first decides the terminal cause

pub mod jobs;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tonic::service::RoutesBuilder;

use crate::config::ManagerConfig;
use crate::error::{AppError, AppResult};
use crate::health::ReadinessProber;
use crate::http::{http_options, Features, HttpOption};
use crate::lifecycle::{chain, Cause, Shutter, Terminating};
use crate::modules::{BlockReader, Modules};
use crate::net::hostname;
use crate::observability::metrics;

/// Orchestrator owning the App's termination signal and driving the modules.
pub struct App {
    shutter: Shutter,
    config: Arc<ManagerConfig>,
    modules: Modules,
    prober: ReadinessProber,
    started: AtomicBool,
    failed: AtomicBool,
}

impl App {
    pub fn new(config: ManagerConfig, modules: Modules) -> Self {
        let prober = ReadinessProber::new(&config.http_address);
        Self {
            shutter: Shutter::new(),
            config: Arc::new(config),
            modules,
            prober,
            started: AtomicBool::new(false),
            failed: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn shutter(&self) -> &Shutter {
        &self.shutter
    }

    /// Request termination of the App and, through the chain, of the operator.
    pub fn shutdown(&self, cause: Option<Cause>) {
        self.shutter.shutdown(cause);
    }

    pub fn terminating(&self) -> Terminating {
        self.shutter.terminating()
    }

    /// Wait for the App to terminate and return its terminal cause.
    pub async fn terminated(&self) -> Option<Cause> {
        self.shutter.terminated().await
    }

    /// Run the startup sequence. Subsystems keep running after this returns.
    pub async fn run(&self) -> AppResult<()> {
        if self.config.connection_watchdog && self.modules.launch_connection_watchdog.is_none() {
            return Err(AppError::MissingWatchdog);
        }

        if self.started.swap(true, Ordering::SeqCst) {
            if self.failed.load(Ordering::SeqCst) {
                return Err(AppError::StartupFailed);
            }
            tracing::warn!("App already running, ignoring run request");
            return Ok(());
        }

        let result = self.start().await;
        if result.is_err() {
            self.failed.store(true, Ordering::SeqCst);
        }
        result
    }

    async fn start(&self) -> AppResult<()> {
        let block_reader = self.modules.block_reader.clone();
        tracing::info!(
            config = ?self.config,
            modules = ?self.modules,
            "Running node manager app"
        );

        let hostname = hostname::resolve();
        tracing::info!(hostname = %hostname, "Retrieved hostname from os");

        metrics::register();
        metrics::set_up(true);

        jobs::configure(&self.config, self.modules.operator.as_ref(), &hostname);

        self.wire_termination_chain();

        if let Some(delay) = self.config.startup_delay() {
            tracing::info!(delay_ms = delay.as_millis() as u64, "Delaying startup");
            tokio::time::sleep(delay).await;
        }

        if let Some(reader) = &block_reader {
            self.start_block_reader(reader).await?;
        }

        let options = self.http_options();

        let manager = self.modules.metrics_and_readiness.clone();
        let terminating = self.terminating();
        tokio::spawn(async move {
            manager.launch(terminating).await;
        });

        self.launch_operator(options);

        if self.config.connection_watchdog {
            if let Some(launch_watchdog) = &self.modules.launch_connection_watchdog {
                tracing::info!("Launching connection watchdog");
                tokio::spawn(launch_watchdog(self.terminating()));
            }
        }

        Ok(())
    }

    /// Whether the operator answers its health check. Never fails, never waits past 100ms.
    pub async fn is_ready(&self) -> bool {
        self.prober.is_ready().await
    }

    fn wire_termination_chain(&self) {
        let operator = self.modules.operator.shutter();

        if let Some(plugin) = self.modules.log_plugin.as_ref().and_then(|p| p.graceful_shutdown()) {
            tracing::info!("Log plugin supports graceful shutdown, draining it before operator");
            chain::drain_before(operator, plugin, "log_plugin");
        }

        chain::cascade(&self.shutter, operator, "operator");

        self.shutter.on_terminated(|cause| {
            metrics::set_up(false);
            metrics::record_termination(cause.is_none());
            match cause {
                Some(err) => {
                    tracing::error!(error = %err, "Node manager app terminated with error")
                }
                None => tracing::info!("Node manager app terminated"),
            }
        });
    }

    fn http_options(&self) -> Vec<HttpOption> {
        let features = Features {
            continuity_checker: self.modules.resolve_continuity_checker(),
        };
        http_options(&features)
    }

    async fn start_block_reader(&self, reader: &Arc<dyn BlockReader>) -> AppResult<()> {
        let address: SocketAddr = self
            .config
            .grpc_address
            .as_deref()
            .and_then(|addr| addr.parse().ok())
            .ok_or_else(|| AppError::GrpcAddress(self.config.grpc_address.clone()))?;

        let mut routes = RoutesBuilder::default();
        if let Some(register) = &self.modules.register_grpc_service {
            register(&mut routes).map_err(AppError::RegisterGrpcService)?;
        }

        tracing::info!(address = %address, "Starting block reader gRPC server");
        reader
            .run_grpc_server(routes.routes(), address, tracing::Span::current())
            .await
            .map_err(AppError::GrpcServer)?;

        tracing::info!("Launching block reader plugin");
        let reader = reader.clone();
        tokio::spawn(async move {
            reader.launch().await;
            tracing::info!("Block reader plugin stopped");
        });

        Ok(())
    }

    fn launch_operator(&self, options: Vec<HttpOption>) {
        tracing::info!(
            address = %self.config.http_address,
            routes = options.len(),
            "Launching operator"
        );

        let operator = self.modules.operator.clone();
        let shutter = self.shutter.clone();
        let failure_handler = self.modules.start_failure_handler.clone();
        let address = self.config.http_address.clone();

        tokio::spawn(async move {
            let cause = match operator.launch(address, options).await {
                Ok(()) => None,
                Err(e) => {
                    tracing::error!(error = %e, "Operator launch returned an error");
                    if let Some(handler) = failure_handler {
                        handler();
                    }
                    Some(Cause::from(e))
                }
            };
            shutter.shutdown(cause);
        });
    }
}
