//! Network plumbing around the orchestrator.
//!
//! # Data Flow
//! ```text
//! hostname.rs: OS host name → job hostname filters (best effort)
//! grpc.rs:     RoutesBuilder (extra services) → bound listener → tonic server task
//! ```

pub mod grpc;
pub mod hostname;
