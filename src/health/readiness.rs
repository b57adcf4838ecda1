//! Readiness probing of the operator's management API.
//!
//! # Responsibilities
//! - GET `/healthz` on the operator with a hard 100ms bound
//! - Report a boolean; every failure is absorbed and logged
//!
//! # Design Decisions
//! - Timeout is fixed and independent of any caller deadline
//! - Only an exact 200 counts as ready
//! - No side effects besides logging and a counter

use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::http::HEALTHZ_PATH;
use crate::observability::metrics;

/// Upper bound for a readiness check.
pub const READINESS_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct ReadinessProber {
    url: String,
    client: Option<Client>,
}

impl ReadinessProber {
    /// Prober for an operator listening on `http_address` (host:port).
    pub fn new(http_address: &str) -> Self {
        let client = match Client::builder()
            .timeout(READINESS_TIMEOUT)
            .pool_max_idle_per_host(0)
            .no_proxy()
            .build()
        {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "Unable to build health check client");
                None
            }
        };

        Self {
            url: format!("http://{}{}", http_address, HEALTHZ_PATH),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// True only when the operator answers 200 within the timeout.
    pub async fn is_ready(&self) -> bool {
        let ready = self.check().await;
        metrics::record_readiness_check(ready);
        ready
    }

    async fn check(&self) -> bool {
        let Some(client) = &self.client else {
            return false;
        };

        let request = match client.get(&self.url).build() {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "Unable to build get health request");
                return false;
            }
        };

        match tokio::time::timeout(READINESS_TIMEOUT, client.execute(request)).await {
            Ok(Ok(response)) => response.status() == StatusCode::OK,
            Ok(Err(e)) => {
                tracing::debug!(
                    url = %self.url,
                    error = %e,
                    "Unable to execute get health request"
                );
                false
            }
            Err(_) => {
                tracing::debug!(url = %self.url, "Health request timed out");
                false
            }
        }
    }
}
