//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and intervals
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ManagerConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ManagerConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("http_address must not be empty")]
    EmptyHttpAddress,

    #[error("invalid {field} '{value}': expected host:port")]
    InvalidAddress { field: &'static str, value: String },

    #[error("metrics.readiness_poll_ms must be greater than zero")]
    ZeroReadinessPoll,
}

pub fn validate_config(config: &ManagerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.http_address.trim().is_empty() {
        errors.push(ValidationError::EmptyHttpAddress);
    } else if !looks_like_host_port(&config.http_address) {
        errors.push(ValidationError::InvalidAddress {
            field: "http_address",
            value: config.http_address.clone(),
        });
    }

    if let Some(grpc) = &config.grpc_address {
        if grpc.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAddress {
                field: "grpc_address",
                value: grpc.clone(),
            });
        }
    }

    if config.metrics.enabled && config.metrics.listen_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "metrics.listen_address",
            value: config.metrics.listen_address.clone(),
        });
    }

    if config.metrics.readiness_poll_ms == 0 {
        errors.push(ValidationError::ZeroReadinessPoll);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// The HTTP address may name a host rather than an IP, so only the shape is checked.
fn looks_like_host_port(address: &str) -> bool {
    match address.rsplit_once(':') {
        Some((_, port)) => port.parse::<u16>().is_ok(),
        None => false,
    }
}
