//! Node Manager Library
//!
//! Lifecycle orchestration for a supervised blockchain node: startup
//! sequencing of the operator and its plugins, bidirectional termination
//! between them, conditional route wiring and readiness probing.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────── App ────────────────────────┐
//!   config ─────▶ │ jobs → termination chain → block reader → routes   │
//!                 │      → readiness manager → operator → watchdog      │
//!                 └──────────────┬───────────────────────▲──────────────┘
//!                        shutdown│                       │terminated
//!                                ▼                       │
//!                 ┌── log plugin ◀── Operator (node process, /healthz) ─┐
//!                 └──────────────────────────────────────────────────────┘
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod modules;
pub mod net;
pub mod observability;

pub use app::App;
pub use config::ManagerConfig;
pub use error::AppError;
pub use lifecycle::Shutter;
pub use modules::Modules;
