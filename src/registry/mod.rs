//! Service discovery registration.
//!
//! # Data Flow
//! ```text
//! Startup:  HTTP bound → consul.rs register (retry with backoff)
//! Shutdown: server drained → consul.rs deregister (single attempt)
//! ```
//!
//! Registration failure is never fatal; the gateway keeps serving and the
//! operator sees the error in the logs.

pub mod consul;

pub use consul::{ConsulRegistrar, RegistryError, ServiceRegistration};
