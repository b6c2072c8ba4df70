//! Business layer between HTTP handlers and the node manager.

pub mod chain;

pub use chain::ChainService;
