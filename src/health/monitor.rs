//! Metrics exporter and periodic readiness publication.

use std::net::SocketAddr;

use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::time;

use crate::config::MetricsConfig;
use crate::health::readiness::ReadinessProber;
use crate::lifecycle::Terminating;
use crate::modules::MetricsAndReadinessManager;
use crate::observability::metrics;

/// Polls the operator's readiness and publishes it as `node_manager_ready`.
pub struct ReadinessMonitor {
    prober: ReadinessProber,
    config: MetricsConfig,
}

impl ReadinessMonitor {
    pub fn new(http_address: &str, config: MetricsConfig) -> Self {
        Self {
            prober: ReadinessProber::new(http_address),
            config,
        }
    }

    fn install_exporter(&self) {
        let addr: SocketAddr = match self.config.listen_address.parse() {
            Ok(addr) => addr,
            Err(e) => {
                tracing::error!(
                    listen_address = %self.config.listen_address,
                    error = %e,
                    "Failed to parse metrics address"
                );
                return;
            }
        };

        match PrometheusBuilder::new().with_http_listener(addr).install() {
            Ok(()) => tracing::info!(address = %addr, "Prometheus exporter listening"),
            Err(e) => tracing::error!(
                address = %addr,
                error = %e,
                "Failed to install Prometheus exporter"
            ),
        }
    }
}

#[async_trait]
impl MetricsAndReadinessManager for ReadinessMonitor {
    async fn launch(&self, mut terminating: Terminating) {
        if self.config.enabled {
            self.install_exporter();
        }

        tracing::info!(
            url = %self.prober.url(),
            interval_ms = self.config.readiness_poll_ms,
            "Readiness monitor starting"
        );

        let mut ticker = time::interval(self.config.readiness_poll_interval());
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let ready = self.prober.is_ready().await;
                    metrics::set_ready(ready);
                }
                _ = terminating.notified() => {
                    tracing::info!("Readiness monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }

        metrics::set_ready(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Shutter;
    use std::time::Duration;

    #[tokio::test]
    async fn test_monitor_stops_when_terminating() {
        let config = MetricsConfig {
            readiness_poll_ms: 10,
            ..Default::default()
        };
        let monitor = ReadinessMonitor::new("127.0.0.1:1", config);
        let shutter = Shutter::new();
        let terminating = shutter.terminating();

        let handle = tokio::spawn(async move { monitor.launch(terminating).await });
        tokio::time::sleep(Duration::from_millis(30)).await;
        shutter.shutdown(None);

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("monitor should exit")
            .unwrap();
    }
}
