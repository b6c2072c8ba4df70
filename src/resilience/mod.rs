//! Resilience helpers.
//!
//! Only outbound calls with a retry loop (service registration) use these;
//! health probing retries naturally on every sweep.

pub mod backoff;

pub use backoff::Backoff;
