//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Sweep scheduler (active.rs):
//!     Periodic timer
//!     → one probe task per endpoint, all joined
//!
//! Prober (probe.rs):
//!     Dial if no client held
//!     → block height under deadline
//!     → record success / failure on the endpoint
//! ```
//!
//! # State machine (per endpoint)
//! ```text
//! Uninitialized → Healthy    (dial + query succeed)
//! Uninitialized → Unhealthy  (error_count += 1)
//! Healthy       → Unhealthy  (error_count = 1)
//! Unhealthy     → Healthy    (error_count = 0)
//! ```
//! No terminal state: unhealthy endpoints are retried every sweep forever.

pub mod active;
pub mod probe;

pub use active::{HealthMonitor, SweepSummary};
pub use probe::{ProbeOutcome, Prober};
