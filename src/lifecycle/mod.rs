//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Termination signal (shutter.rs):
//!     Running → Terminating → Terminated(cause)
//!     pre-terminate hooks run between the last two phases
//!
//! Termination chain (chain.rs):
//!     app ⇄ operator ⇄ log plugin, expressed as hook edges between shutters
//! ```
//!
//! # Design Decisions
//! - Termination is one-way and monotonic: no resume
//! - Whichever path terminates a component first wins, later requests are no-ops
//! - Causes are shared (`Arc`) so every waiter sees the same error

pub mod chain;
pub mod shutter;

pub use shutter::{cause, BoxError, Cause, Phase, Shutter, Terminating};
