//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Metrics → Node manager (initial probes, sweep task) → Bind → Register
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Broadcast → Server drains, sweep stops → Deregister
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when the pool has been probed)
//! - Registry failures are logged, never fatal

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{run, StartupError};
