//! Shared fakes and utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{routing::get, Router};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tonic::service::Routes;
use tracing::Span;

use node_manager::http::{apply, HttpOption, HEALTHZ_PATH};
use node_manager::lifecycle::{BoxError, Shutter, Terminating};
use node_manager::modules::{BlockReader, LogPlugin, MetricsAndReadinessManager, Operator};
use node_manager::net::grpc::serve_routes;

/// Ordered record of what the fakes did.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == event).count()
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.0.lock().unwrap().iter().position(|e| e == event)
    }

    pub fn starting_with(&self, prefix: &str) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .cloned()
            .collect()
    }
}

/// Operator serving `/healthz` plus the App's routes until its shutter terminates.
pub struct FakeOperator {
    shutter: Shutter,
    events: EventLog,
    crash: Option<&'static str>,
}

impl FakeOperator {
    pub fn new(events: EventLog) -> Arc<Self> {
        Self::build(events, None)
    }

    /// Operator whose launch fails right away with `message`.
    pub fn crashing(events: EventLog, message: &'static str) -> Arc<Self> {
        Self::build(events, Some(message))
    }

    // Teardown is installed at construction, before the App wires any chain.
    fn build(events: EventLog, crash: Option<&'static str>) -> Arc<Self> {
        let shutter = Shutter::new();
        let teardown = events.clone();
        shutter.on_terminating(move |_| async move {
            teardown.push("operator.teardown");
            None
        });

        Arc::new(Self { shutter, events, crash })
    }
}

#[async_trait]
impl Operator for FakeOperator {
    fn shutter(&self) -> &Shutter {
        &self.shutter
    }

    fn configure_auto_backup(
        &self,
        period: Duration,
        modulo: u64,
        hostname_match: Option<&str>,
        hostname: &str,
    ) {
        self.events.push(format!(
            "configure.backup {:?} {} {:?} {}",
            period, modulo, hostname_match, hostname
        ));
    }

    fn configure_auto_snapshot(
        &self,
        period: Duration,
        modulo: u64,
        hostname_match: Option<&str>,
        hostname: &str,
    ) {
        self.events.push(format!(
            "configure.snapshot {:?} {} {:?} {}",
            period, modulo, hostname_match, hostname
        ));
    }

    fn configure_auto_volume_snapshot(
        &self,
        period: Duration,
        modulo: u64,
        specific_blocks: &[u64],
    ) {
        self.events.push(format!(
            "configure.volume_snapshot {:?} {} {:?}",
            period, modulo, specific_blocks
        ));
    }

    async fn launch(
        &self,
        http_address: String,
        options: Vec<HttpOption>,
    ) -> Result<(), BoxError> {
        self.events.push("operator.launch");

        if let Some(message) = self.crash {
            return Err(message.into());
        }

        let router = apply(Router::new().route(HEALTHZ_PATH, get(|| async { "ok" })), options);
        let listener = TcpListener::bind(&http_address).await?;
        let mut terminating = self.shutter.terminating();

        axum::serve(listener, router)
            .with_graceful_shutdown(async move { terminating.notified().await })
            .await?;

        Ok(())
    }
}

/// Block reader that serves the side gRPC routes and counts checker resets.
pub struct FakeBlockReader {
    with_checker: bool,
    pub resets: AtomicUsize,
    pub grpc_started: AtomicBool,
    pub launched: AtomicBool,
}

impl FakeBlockReader {
    pub fn new(with_checker: bool) -> Arc<Self> {
        Arc::new(Self {
            with_checker,
            resets: AtomicUsize::new(0),
            grpc_started: AtomicBool::new(false),
            launched: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl BlockReader for FakeBlockReader {
    async fn run_grpc_server(
        &self,
        routes: Routes,
        address: SocketAddr,
        _span: Span,
    ) -> Result<(), BoxError> {
        serve_routes(routes, address).await?;
        self.grpc_started.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn launch(&self) {
        self.launched.store(true, Ordering::SeqCst);
    }

    fn has_continuity_checker(&self) -> bool {
        self.with_checker
    }

    fn reset_continuity_checker(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

/// Log plugin that needs to flush before the operator goes away.
pub struct FakeLogPlugin {
    shutter: Shutter,
}

impl FakeLogPlugin {
    pub fn new(events: EventLog) -> Arc<Self> {
        let shutter = Shutter::new();
        shutter.on_terminating(move |_| async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            events.push("log_plugin.flush");
            None
        });
        Arc::new(Self { shutter })
    }
}

impl LogPlugin for FakeLogPlugin {
    fn graceful_shutdown(&self) -> Option<&Shutter> {
        Some(&self.shutter)
    }
}

/// Log plugin without graceful shutdown support.
pub struct PlainLogPlugin;

impl LogPlugin for PlainLogPlugin {}

/// Readiness manager that idles until the App starts terminating.
#[derive(Default)]
pub struct IdleManager {
    pub launched: AtomicBool,
}

#[async_trait]
impl MetricsAndReadinessManager for IdleManager {
    async fn launch(&self, mut terminating: Terminating) {
        self.launched.store(true, Ordering::SeqCst);
        terminating.notified().await;
    }
}

/// A loopback address nothing is listening on yet.
pub fn free_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Poll `check` until it returns true or `timeout` elapses.
pub async fn eventually<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

/// Start a programmable backend answering every connection with `f()`'s status and body.
pub async fn start_programmable_backend<F, Fut>(addr: SocketAddr, f: F)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await.unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut request = [0u8; 1024];
                        let _ = socket.read(&mut request).await;
                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}
