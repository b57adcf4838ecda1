//! HTTP surface contributed to the operator.
//!
//! # Data Flow
//! ```text
//! Modules (present / absent)
//!     → routes.rs (Features → ordered Vec<HttpOption>)
//!     → Operator::launch(address, options)
//!     → operator applies each option while building its router
//! ```

pub mod routes;

pub use routes::{apply, http_options, Features, HttpOption, HEALTHZ_PATH, RESET_CC_PATH};
